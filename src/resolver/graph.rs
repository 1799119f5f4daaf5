//! Dependency graph collection.
//!
//! A plain breadth-first walk over declared dependencies. There is no
//! version mediation: two versions of the same library are two nodes.

use std::collections::{HashMap, VecDeque};

use anyhow::{Context, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::{Coordinate, RepositorySet, ResolvedArtifact};
use crate::resolver::{DescriptorBuilder, ModelResolver, ResolutionService};

/// The collected dependency graph of one root artifact.
///
/// Nodes are added in discovery order, so node order is breadth-first
/// order from the root.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<Coordinate, ()>,
    nodes: HashMap<Coordinate, NodeIndex>,
    artifacts: HashMap<Coordinate, ResolvedArtifact>,
    root: NodeIndex,
}

impl DependencyGraph {
    pub fn new(root: ResolvedArtifact) -> Self {
        let mut graph = DiGraph::new();
        let coordinate = *root.coordinate();
        let node = graph.add_node(coordinate);

        DependencyGraph {
            graph,
            nodes: HashMap::from([(coordinate, node)]),
            artifacts: HashMap::from([(coordinate, root)]),
            root: node,
        }
    }

    /// Add an artifact node. Returns `false` if its coordinate is already present.
    pub fn add_artifact(&mut self, artifact: ResolvedArtifact) -> bool {
        let coordinate = *artifact.coordinate();
        if self.nodes.contains_key(&coordinate) {
            return false;
        }

        let node = self.graph.add_node(coordinate);
        self.nodes.insert(coordinate, node);
        self.artifacts.insert(coordinate, artifact);
        true
    }

    /// Record that `from` depends on `to`.
    pub fn add_edge(&mut self, from: &Coordinate, to: &Coordinate) {
        if let (Some(&from_node), Some(&to_node)) = (self.nodes.get(from), self.nodes.get(to)) {
            if !self.graph.contains_edge(from_node, to_node) {
                self.graph.add_edge(from_node, to_node, ());
            }
        }
    }

    pub fn root(&self) -> &ResolvedArtifact {
        &self.artifacts[&self.graph[self.root]]
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.nodes.contains_key(coordinate)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of `coordinate`.
    pub fn deps(&self, coordinate: &Coordinate) -> Vec<Coordinate> {
        self.neighbors(coordinate, Direction::Outgoing)
    }

    /// Artifacts that directly depend on `coordinate`.
    pub fn dependents(&self, coordinate: &Coordinate) -> Vec<Coordinate> {
        self.neighbors(coordinate, Direction::Incoming)
    }

    fn neighbors(&self, coordinate: &Coordinate, direction: Direction) -> Vec<Coordinate> {
        match self.nodes.get(coordinate) {
            Some(&node) => {
                let mut found: Vec<NodeIndex> =
                    self.graph.neighbors_directed(node, direction).collect();
                found.sort();
                found.into_iter().map(|n| self.graph[n]).collect()
            }
            None => Vec::new(),
        }
    }

    /// Shortest requirement path from the root to `coordinate`, both ends
    /// included. Empty if `coordinate` is not in the graph.
    pub fn requirement_path(&self, coordinate: &Coordinate) -> Vec<Coordinate> {
        let Some(&start) = self.nodes.get(coordinate) else {
            return Vec::new();
        };

        let mut path = vec![self.graph[start]];
        let mut current = start;
        while current != self.root {
            // The earliest discovered dependent is one BFS level closer to the root
            let Some(prev) = self
                .graph
                .neighbors_directed(current, Direction::Incoming)
                .min()
            else {
                break;
            };
            path.push(self.graph[prev]);
            current = prev;
        }

        path.reverse();
        path
    }

    /// Every dependency in breadth-first order, root excluded.
    pub fn dependencies(&self) -> Vec<ResolvedArtifact> {
        self.graph
            .node_indices()
            .filter(|&n| n != self.root)
            .map(|n| self.artifacts[&self.graph[n]].clone())
            .collect()
    }
}

/// Collect the dependency graph of `root`.
///
/// Each artifact's descriptor is parsed with the repositories visible to
/// the artifact that required it plus those the descriptor declares.
pub fn collect_dependencies(
    service: &dyn ResolutionService,
    builder: &dyn DescriptorBuilder,
    root: &ResolvedArtifact,
    repositories: &RepositorySet,
) -> Result<DependencyGraph> {
    let mut graph = DependencyGraph::new(root.clone());
    let mut queue = VecDeque::new();
    queue.push_back((
        *root.coordinate(),
        ModelResolver::new(service, repositories.clone()),
    ));

    while let Some((coordinate, mut resolver)) = queue.pop_front() {
        let descriptor_artifact = service
            .resolve_artifact(&coordinate.descriptor(), resolver.repositories())
            .with_context(|| {
                format!(
                    "failed to resolve descriptor of `{}` (required by {})",
                    coordinate,
                    format_path(&graph.requirement_path(&coordinate))
                )
            })?;

        let descriptor = builder
            .build(&descriptor_artifact, &mut resolver)
            .with_context(|| format!("failed to read descriptor of `{}`", coordinate))?;

        for declared in descriptor.required_dependencies() {
            let dependency = declared
                .coordinate()
                .with_context(|| format!("invalid dependency declared by `{}`", coordinate))?;

            if !graph.contains(&dependency) {
                let artifact = service
                    .resolve_artifact(&dependency, resolver.repositories())
                    .with_context(|| {
                        format!(
                            "missing dependency `{}` (required by {})",
                            dependency,
                            format_path(&graph.requirement_path(&coordinate))
                        )
                    })?;

                tracing::debug!("Found dependency {} of {}", dependency, coordinate);
                graph.add_artifact(artifact);
                queue.push_back((dependency, resolver.fork()));
            }

            graph.add_edge(&coordinate, &dependency);
        }
    }

    Ok(graph)
}

/// Nearest requirer first: `a` <- `app`.
fn format_path(path: &[Coordinate]) -> String {
    path.iter()
        .rev()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(" <- ")
}
