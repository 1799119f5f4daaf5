//! `ferry transfer` command

use std::io::IsTerminal;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::TransferArgs;
use ferry::core::{Coordinate, RepositoryRef, RepositorySet};
use ferry::ops::{transfer, TransferOptions, TransferReport};
use ferry::resolver::TomlDescriptorBuilder;
use ferry::sources::{LocalCache, RepositorySystem, Transport};
use ferry::util::config::TargetOverrides;
use ferry::util::GlobalContext;

pub fn execute(args: TransferArgs, verbose: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let mut root: Coordinate = args.coordinate.parse()?;
    if let Some(classifier) = args.classifier.as_deref() {
        root = root.try_with_classifier(Some(classifier))?;
    }
    if let Some(extension) = args.extension.as_deref() {
        root = root.try_with_extension(Some(extension))?;
    }

    let sources = source_repositories(&ctx, &args.repos)?;
    let target = ctx.config().target_repository(&TargetOverrides {
        url: args.target.as_deref(),
        username: args.username.as_deref(),
        password: args.password.as_deref(),
    })?;

    let mut net = ctx.config().net.clone();
    net.offline |= args.offline;

    let progress = if !verbose && !args.json && std::io::stderr().is_terminal() {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let system = RepositorySystem::new(Transport::new(&net)?, LocalCache::new(ctx.cache_dir()))
        .offline(net.offline)
        .with_progress(progress);

    tracing::debug!("Using cache {}", system.cache().root().display());
    tracing::debug!("Source repositories: {}", sources.describe());

    let opts = TransferOptions {
        dry_run: args.dry_run,
    };

    let report = transfer(
        &system,
        &TomlDescriptorBuilder,
        &root,
        &sources,
        &target,
        &opts,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

/// Configured repositories first, then `--repo` entries. A repeated id keeps
/// the first definition.
fn source_repositories(ctx: &GlobalContext, specs: &[String]) -> Result<RepositorySet> {
    let mut sources = RepositorySet::new();

    for repository in ctx.config().source_repositories()? {
        sources.insert(repository);
    }

    for spec in specs {
        let repository = RepositoryRef::parse_spec(spec)
            .with_context(|| format!("invalid --repo value `{}`", spec))?;
        let id = repository.id().to_string();
        if !sources.insert(repository) {
            tracing::warn!("Repository `{}` is already configured; ignoring {}", id, spec);
        }
    }

    Ok(sources)
}

fn print_summary(report: &TransferReport) {
    eprintln!(
        "    Resolved {} ({} dependencies, {} parent descriptors)",
        report.root,
        report.dependencies.len(),
        report.ancestors.len()
    );

    if report.deployed {
        eprintln!(
            "    Deployed {} artifacts to {}",
            report.artifacts.len(),
            report.target
        );
    } else {
        eprintln!(
            "Would deploy {} artifacts to {}",
            report.artifacts.len(),
            report.target
        );
        for coordinate in &report.artifacts {
            println!("{}", coordinate);
        }
    }
}
