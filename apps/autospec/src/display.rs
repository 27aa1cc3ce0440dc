//! Output rendering and formatting

use autospec_ops::{DraftReport, LogReport, OperationResult};
use autospec_types::ColorChoice;
use console::{Style, Term};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Whether styled output should be emitted
    pub fn colors_enabled(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            return self.term.write_line(&json);
        }

        match result {
            OperationResult::Draft(report) => self.render_draft(report),
            OperationResult::LogCheck(report) => self.render_logcheck(report),
        }
    }

    fn render_draft(&self, report: &DraftReport) -> io::Result<()> {
        let heading = self.style(Style::new().bold());
        self.term.write_line(&format!(
            "{} {} {}",
            heading.apply_to(&report.name),
            report.version,
            self.style(Style::new().cyan()).apply_to(report.pattern)
        ))?;
        self.term
            .write_line(&format!("  spec:    {}", report.spec_path.display()))?;
        self.term
            .write_line(&format!("  options: {}", report.options_path.display()))?;

        if let Some(build) = &report.build {
            let status = if build.success {
                self.style(Style::new().green()).apply_to("succeeded")
            } else {
                self.style(Style::new().red()).apply_to("failed")
            };
            self.term.write_line(&format!(
                "  build:   {status} (log: {})",
                build.log_path.display()
            ))?;
            self.render_misses(&report.misses)?;
        }
        Ok(())
    }

    fn render_logcheck(&self, report: &LogReport) -> io::Result<()> {
        self.render_misses(&report.misses)?;
        if !report.etc_files.is_empty() {
            self.term
                .write_line(&format!("{} files installed under /etc", report.etc_files.len()))?;
        }
        Ok(())
    }

    fn render_misses(&self, misses: &[String]) -> io::Result<()> {
        if misses.is_empty() {
            return self.term.write_line("No configure misses");
        }
        let label = if misses.len() == 1 { "miss" } else { "misses" };
        self.term.write_line(&format!(
            "{} configure {label}:",
            self.style(Style::new().yellow().bold()).apply_to(misses.len())
        ))?;
        for miss in misses {
            self.term.write_line(&format!("  {miss}"))?;
        }
        Ok(())
    }

    fn style(&self, style: Style) -> Style {
        if self.colors_enabled() {
            style.force_styling(true)
        } else {
            Style::new().force_styling(false)
        }
    }
}
