//! `TerminalSink`: Presentation-layer implementation of `OutputSink`.
//!
//! Wraps `&OutputContext` so application services can stream remote output
//! without depending on any presentation type directly.

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::OutputSink;
use crate::output::OutputContext;

/// Writes each line to stdout, above the spinner when one is attached.
///
/// Lines are suppressed when `ctx.quiet`.
pub struct TerminalSink<'a> {
    ctx: &'a OutputContext,
    spinner: Option<ProgressBar>,
}

impl<'a> TerminalSink<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx, spinner: None }
    }

    /// Keep `spinner` pinned below the streamed lines.
    #[must_use]
    pub fn with_spinner(mut self, spinner: ProgressBar) -> Self {
        self.spinner = Some(spinner);
        self
    }

    #[must_use]
    pub fn spinner(&self) -> Option<&ProgressBar> {
        self.spinner.as_ref()
    }

    fn format(&self, line: &str) -> String {
        match line.strip_prefix("running command: ") {
            Some(command) => format!(
                "  {} {}",
                "→".style(self.ctx.styles.header),
                command.style(self.ctx.styles.header)
            ),
            None => format!("    {}", line.style(self.ctx.styles.dim)),
        }
    }
}

impl OutputSink for TerminalSink<'_> {
    fn output(&self, line: &str) {
        if self.ctx.quiet {
            return;
        }
        let formatted = self.format(line);
        match &self.spinner {
            Some(pb) => pb.println(formatted),
            None => println!("{formatted}"),
        }
    }
}
