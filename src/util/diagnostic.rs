//! User-facing diagnostic messages.
//!
//! Every error printed by the CLI states what failed, the chain of causes,
//! and what the user can try next.

use std::fmt;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// The coordinate may be misspelled.
    pub const CHECK_COORDINATE: &str =
        "Check the coordinate; it is written `group:name[:extension[:classifier]]:version`";

    /// The artifact may live in a repository that is not configured.
    pub const ADD_REPOSITORY: &str =
        "Add the repository that hosts it with `--repo ID=URL` or a [[repositories]] entry in the config";

    pub const VERBOSE: &str = "Run again with `--verbose` to see every lookup";

    /// A descriptor names a descendant as its parent.
    pub const FIX_PARENT: &str = "Fix the [parent] section of the descriptors in the cycle";

    /// The target refused or failed an upload.
    pub const CHECK_TARGET: &str =
        "Check the target URL and credentials (`--username`, `FERRY_PASSWORD`)";

    pub const NO_TARGET: &str = "Pass `--target URL` or set [target] url in the config";
    pub const MISSING_USERNAME: &str =
        "Pass `--username` or set [target] username in the config";
}

/// An error message with context lines and suggested fixes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let prefix = if color { "\x1b[1;31merror\x1b[0m" } else { "error" };
        output.push_str(&format!("{}: {}\n", prefix, self.message));

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("failed to resolve root artifact `com.example:app:1.0`")
            .with_context("phase: resolution")
            .with_context("caused by: not found in central")
            .with_suggestion(suggestions::CHECK_COORDINATE)
            .with_suggestion(suggestions::ADD_REPOSITORY);

        let output = diag.format(false);
        assert!(output.starts_with("error: failed to resolve root artifact"));
        assert!(output.contains("  = caused by: not found in central"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("2. Add the repository"));
    }

    #[test]
    fn test_color_only_when_asked() {
        let diag = Diagnostic::error("no target repository given")
            .with_suggestion(suggestions::NO_TARGET);
        assert!(!diag.format(false).contains('\x1b'));
        assert!(diag.format(true).starts_with("\x1b[1;31merror"));
        assert!(diag.format(true).contains("\x1b[1;32mhelp"));
    }
}
