use std::fmt;

/// Severity tag attached to every diagnostic, rendered as the leading
/// word of its `Display` output.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

/// A single line-tagged message produced by the preprocessor or either
/// assembly pass.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: Option<u32>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Critical,
            line: None,
            message: message.into(),
        }
    }

    pub fn warning(line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            line: Some(line),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (Line {}) {}", self.severity, line, self.message),
            None => write!(f, "{} {}", self.severity, self.message),
        }
    }
}

/// Aggregate of every diagnostic collected while processing one file.
/// Returned by the library entry points when at least one error-or-worse
/// diagnostic was recorded.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct AssembleError {
    pub diagnostics: Vec<Diagnostic>,
}

impl AssembleError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        AssembleError { diagnostics }
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, d) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl std::error::Error for AssembleError {}

pub type Result<T> = std::result::Result<T, AssembleError>;
