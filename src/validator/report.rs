//! Validation report
//!
//! Checks are recorded in the order the pipeline ran them. Content checks
//! keep every problem they found; the rendered report lists them under the
//! check that found them, one per line.

use std::fmt;

/// Problems listed per check before the rest are summarized as a count
const LISTED_PROBLEMS: usize = 20;

/// Problems quoted in a failed check's status message
const QUOTED_PROBLEMS: usize = 3;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Check passed, with a note worth reading
    Warning(String),
    /// Check failed; the document must not be parsed
    Failed(String),
}

impl CheckStatus {
    fn tag(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Warning(_) => "warn",
            CheckStatus::Failed(_) => "FAIL",
        }
    }

    fn tone(&self) -> Tone {
        match self {
            CheckStatus::Ok => Tone::Good,
            CheckStatus::Warning(_) => Tone::Caution,
            CheckStatus::Failed(_) => Tone::Bad,
        }
    }
}

/// One named step of catalog validation
#[derive(Debug, Clone)]
pub struct ValidationCheck {
    /// Name of the check, e.g. "Numeric values"
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
    /// Every problem found, for checks that walk the whole document
    pub problems: Vec<String>,
}

impl ValidationCheck {
    fn with_status(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            name: name.into(),
            status,
            problems: Vec::new(),
        }
    }

    pub(crate) fn ok(name: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Ok)
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Warning(message.into()))
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Failed(message.into()))
    }

    /// Passed when `problems` is empty; failed otherwise, quoting the first few
    pub(crate) fn from_problems(name: impl Into<String>, problems: &[String]) -> Self {
        let status = match problems.len() {
            0 => CheckStatus::Ok,
            n if n <= QUOTED_PROBLEMS => CheckStatus::Failed(problems.join("; ")),
            n => CheckStatus::Failed(format!(
                "{}; and {} more",
                problems[..QUOTED_PROBLEMS].join("; "),
                n - QUOTED_PROBLEMS
            )),
        };
        Self {
            problems: problems.to_vec(),
            ..Self::with_status(name, status)
        }
    }
}

/// Every check run against one catalog document
#[derive(Debug)]
pub struct ValidationReport {
    /// Checks in the order they ran
    pub checks: Vec<ValidationCheck>,
    /// Path of the document that was validated
    pub file_path: String,
    /// Path of the schema it was validated against
    pub schema_path: String,
}

impl ValidationReport {
    /// Empty report for a document and its schema
    pub fn new(file_path: impl Into<String>, schema_path: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            file_path: file_path.into(),
            schema_path: schema_path.into(),
        }
    }

    /// Record a check; failures are also logged
    pub fn add_check(&mut self, check: ValidationCheck) {
        if let CheckStatus::Failed(message) = &check.status {
            log::error!("Validation check '{}' failed: {}", check.name, message);
        }
        self.checks.push(check);
    }

    fn count(&self, wanted: fn(&CheckStatus) -> bool) -> usize {
        self.checks.iter().filter(|c| wanted(&c.status)).count()
    }

    /// Number of checks that passed cleanly
    pub fn success_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Ok))
    }

    /// Number of checks that passed with a warning
    pub fn warning_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Warning(_)))
    }

    /// Number of failed checks
    pub fn failure_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Failed(_)))
    }

    /// True when at least one check failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// True when at least one check warned
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// True when the document may be handed to the parsers
    pub fn passed(&self) -> bool {
        !self.has_failures()
    }

    /// Look up a check by name
    pub fn check(&self, name: &str) -> Option<&ValidationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    fn verdict(&self) -> (&'static str, Tone) {
        if self.has_failures() {
            ("catalog is invalid", Tone::Bad)
        } else if self.has_warnings() {
            ("catalog is valid, with warnings", Tone::Caution)
        } else {
            ("catalog is valid", Tone::Good)
        }
    }

    fn render(&self, out: &mut impl fmt::Write, paint: impl Fn(Tone, &str) -> String) -> fmt::Result {
        writeln!(
            out,
            "{} {} against {}",
            paint(Tone::Heading, "Validating"),
            self.file_path,
            self.schema_path
        )?;

        for check in &self.checks {
            let tag = paint(check.status.tone(), &format!("{:<4}", check.status.tag()));
            match (&check.status, check.problems.len()) {
                (CheckStatus::Ok, _) => writeln!(out, "  {tag}  {}", check.name)?,
                (CheckStatus::Failed(_), n) if n > 0 => {
                    writeln!(out, "  {tag}  {} ({n} problem{})", check.name, if n == 1 { "" } else { "s" })?;
                    for problem in check.problems.iter().take(LISTED_PROBLEMS) {
                        writeln!(out, "          - {problem}")?;
                    }
                    if n > LISTED_PROBLEMS {
                        writeln!(out, "          ... {} more", n - LISTED_PROBLEMS)?;
                    }
                }
                (CheckStatus::Warning(message) | CheckStatus::Failed(message), _) => {
                    writeln!(out, "  {tag}  {}: {message}", check.name)?
                }
            }
        }

        let (verdict, tone) = self.verdict();
        writeln!(
            out,
            "{} checks: {} ok, {} warning(s), {} failed; {}",
            self.checks.len(),
            self.success_count(),
            self.warning_count(),
            self.failure_count(),
            paint(tone, verdict)
        )
    }

    /// The report with terminal colors when the `colorized_output` feature is on
    pub fn format_colored(&self) -> String {
        let mut output = String::new();

        #[cfg(feature = "colorized_output")]
        let rendered = self.render(&mut output, |tone, text| {
            let styled = console::style(text);
            match tone {
                Tone::Heading => styled.bold().cyan(),
                Tone::Good => styled.green(),
                Tone::Caution => styled.yellow(),
                Tone::Bad => styled.red().bold(),
            }
            .to_string()
        });

        #[cfg(not(feature = "colorized_output"))]
        let rendered = self.render(&mut output, |_, text| text.to_string());

        // Writing into a String cannot fail
        debug_assert!(rendered.is_ok());
        output
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Heading,
    Good,
    Caution,
    Bad,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = String::new();
        self.render(&mut output, |_, text| text.to_string())?;
        f.write_str(&output)
    }
}
