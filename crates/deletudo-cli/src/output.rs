//! Terminal output

use console::{style, Term};

/// Status line printer
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Print a section heading
    pub fn heading(&self, message: &str) {
        if self.quiet {
            return;
        }
        let line = if self.use_color {
            style(message).bold().to_string()
        } else {
            message.to_string()
        };
        let _ = self.term.write_line(&line);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = Term::stderr().write_line(&format!("{prefix} {message}"));
    }

    /// Print an indented detail line
    pub fn detail(&self, label: &str, value: &str) {
        if self.quiet {
            return;
        }
        let label = if self.use_color {
            style(label).dim().to_string()
        } else {
            label.to_string()
        };
        let _ = self.term.write_line(&format!("  {label} {value}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_new() {
        let reporter = Reporter::new(false, true);
        assert!(!reporter.use_color);
        assert!(reporter.quiet);
    }

    #[test]
    fn test_quiet_reporter_prints_nothing() {
        let reporter = Reporter::new(false, true);
        reporter.heading("Packaging chrome");
        reporter.success("done");
        reporter.detail("Archive:", "x.zip");
    }

    #[test]
    fn test_default_reporter() {
        let reporter = Reporter::default();
        assert!(reporter.use_color);
        assert!(!reporter.quiet);
    }
}
