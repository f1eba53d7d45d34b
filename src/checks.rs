//! The contract for automatic checks and the diagnostics they produce
use super::submission::path_to_slash;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Warning,
    Error,
}

/// A diagnostic produced by a check, optionally pointing at a file position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultMessage {
    pub check_name: String,
    pub message_type: MessageType,
    pub message: String,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

/// What a single run of a check reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckOutcome {
    pub passed: bool,
    pub messages: Vec<ResultMessage>,
}

/// An automatic check run over a candidate submission written out to `submission_dir`.
///
/// Implementations may be run many times, concurrently, over different submissions.
pub trait Check: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self, submission_dir: &Path) -> CheckOutcome;
}

/// The public form of a [`ResultMessage`], with the file as a `/`-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckMessage {
    pub check_name: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ResultMessage {
    pub fn new(
        check_name: impl Into<String>,
        message_type: MessageType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check_name: check_name.into(),
            message_type,
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }
}

// absent file, line and column sort before present ones
impl Ord for ResultMessage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.check_name
            .cmp(&other.check_name)
            .then_with(|| self.file.cmp(&other.file))
            .then_with(|| self.line.cmp(&other.line))
            .then_with(|| self.column.cmp(&other.column))
            .then_with(|| self.message_type.cmp(&other.message_type))
            .then_with(|| self.message.cmp(&other.message))
    }
}

impl PartialOrd for ResultMessage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ResultMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message_type = match self.message_type {
            MessageType::Warning => "warning",
            MessageType::Error => "error",
        };
        write!(f, "{} {message_type}", self.check_name)?;

        if let Some(file) = &self.file {
            write!(f, " in {}", path_to_slash(file))?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
                if let Some(column) = self.column {
                    write!(f, ":{column}")?;
                }
            }
        }

        write!(f, " \"{}\"", self.message)
    }
}

impl CheckOutcome {
    pub fn passed() -> Self {
        Self {
            passed: true,
            messages: vec![],
        }
    }
    pub fn failed(messages: Vec<ResultMessage>) -> Self {
        Self {
            passed: false,
            messages,
        }
    }
    pub fn with_message(mut self, message: ResultMessage) -> Self {
        self.messages.push(message);
        self
    }
}

impl From<ResultMessage> for CheckMessage {
    fn from(message: ResultMessage) -> Self {
        Self {
            check_name: message.check_name,
            message_type: message.message_type,
            message: message.message,
            file: message.file.as_deref().map(path_to_slash),
            line: message.line,
            column: message.column,
        }
    }
}
