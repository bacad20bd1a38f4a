//! Status enumerations for tasks and test steps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Common behavior shared by the stored status enums of both document
/// kinds.
///
/// Conversions from text are total: an unrecognized token or checkbox
/// character falls back to the default member rather than failing, so
/// the parser never rejects a file over a single bad status marker.
pub trait Status:
    Copy + Clone + fmt::Debug + fmt::Display + PartialEq + Eq + Default + Send + Sync + 'static
{
    /// Parses a bracketed status token, falling back to the default
    /// member on unrecognized input.
    fn from_token(token: &str) -> Self;

    /// The canonical lowercase token written between brackets.
    fn as_str(&self) -> &'static str;

    /// The single character written inside the `[ ]` checkbox.
    fn checkbox_char(&self) -> char;

    /// Parses a checkbox character, falling back to the default member
    /// on unrecognized input.
    fn from_checkbox(c: char) -> Self;

    /// Whether this status satisfies a dependency on the item holding
    /// it. Only meaningful for the task variant.
    fn satisfies_dependency(&self) -> bool {
        false
    }

    /// Whether an attached note line belongs next to an item in this
    /// status. Only the test-step `failed` state carries one.
    fn carries_note(&self) -> bool {
        false
    }

    /// Status with a consistent icon prefix for display.
    fn with_icon(&self) -> &'static str;
}

/// Type-safe enumeration of stored task statuses.
///
/// The derived `blocked` display state is deliberately absent: it is a
/// transient overlay computed from the dependency graph (see
/// [`crate::models::Item::blocked`]) and is never parsed from or
/// written back to text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not been started
    #[default]
    Pending,

    /// Task is being worked on
    InProgress,

    /// Task is finished but waiting on review
    AwaitingReview,

    /// Task has been completed
    Complete,

    /// Task was deliberately skipped
    Skipped,
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "inprogress" | "in_progress" => Ok(TaskStatus::InProgress),
            "awaitingreview" | "awaiting_review" => Ok(TaskStatus::AwaitingReview),
            "complete" => Ok(TaskStatus::Complete),
            "skipped" => Ok(TaskStatus::Skipped),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Status for TaskStatus {
    fn from_token(token: &str) -> Self {
        Self::from_str(token).unwrap_or_default()
    }

    fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::AwaitingReview => "awaiting_review",
            TaskStatus::Complete => "complete",
            TaskStatus::Skipped => "skipped",
        }
    }

    fn checkbox_char(&self) -> char {
        match self {
            TaskStatus::Pending => ' ',
            TaskStatus::InProgress => '~',
            TaskStatus::AwaitingReview => '?',
            TaskStatus::Complete => 'x',
            TaskStatus::Skipped => '-',
        }
    }

    fn from_checkbox(c: char) -> Self {
        match c {
            '~' => TaskStatus::InProgress,
            '?' => TaskStatus::AwaitingReview,
            'x' | 'X' => TaskStatus::Complete,
            '-' => TaskStatus::Skipped,
            _ => TaskStatus::Pending,
        }
    }

    fn satisfies_dependency(&self) -> bool {
        matches!(self, TaskStatus::Complete | TaskStatus::Skipped)
    }

    fn with_icon(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "○ Pending",
            TaskStatus::InProgress => "➤ In Progress",
            TaskStatus::AwaitingReview => "◈ Awaiting Review",
            TaskStatus::Complete => "✓ Complete",
            TaskStatus::Skipped => "⊘ Skipped",
        }
    }
}

/// Type-safe enumeration of stored test step statuses.
///
/// Unlike task lines, a test step line has no bracketed token: the
/// checkbox character alone encodes the status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TestStepStatus {
    /// Step has not been run
    #[default]
    Pending,

    /// Step is being executed
    InProgress,

    /// Step passed
    Passed,

    /// Step failed (may carry an attached note)
    Failed,
}

impl FromStr for TestStepStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TestStepStatus::Pending),
            "inprogress" | "in_progress" => Ok(TestStepStatus::InProgress),
            "passed" => Ok(TestStepStatus::Passed),
            "failed" => Ok(TestStepStatus::Failed),
            _ => Err(format!("Invalid test step status: {s}")),
        }
    }
}

impl fmt::Display for TestStepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Status for TestStepStatus {
    fn from_token(token: &str) -> Self {
        Self::from_str(token).unwrap_or_default()
    }

    fn as_str(&self) -> &'static str {
        match self {
            TestStepStatus::Pending => "pending",
            TestStepStatus::InProgress => "in_progress",
            TestStepStatus::Passed => "passed",
            TestStepStatus::Failed => "failed",
        }
    }

    fn checkbox_char(&self) -> char {
        match self {
            TestStepStatus::Pending => ' ',
            TestStepStatus::InProgress => '~',
            TestStepStatus::Passed => 'x',
            TestStepStatus::Failed => '!',
        }
    }

    fn from_checkbox(c: char) -> Self {
        match c {
            '~' => TestStepStatus::InProgress,
            'x' | 'X' => TestStepStatus::Passed,
            '!' => TestStepStatus::Failed,
            _ => TestStepStatus::Pending,
        }
    }

    fn carries_note(&self) -> bool {
        matches!(self, TestStepStatus::Failed)
    }

    fn with_icon(&self) -> &'static str {
        match self {
            TestStepStatus::Pending => "○ Pending",
            TestStepStatus::InProgress => "➤ In Progress",
            TestStepStatus::Passed => "✓ Passed",
            TestStepStatus::Failed => "✗ Failed",
        }
    }
}
