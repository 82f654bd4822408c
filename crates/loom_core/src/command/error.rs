//! Command error kinds.
//!
//! All errors are synchronous contract violations. A failed `execute` or
//! `undo` never alters the input snapshot, so the caller still holds a valid
//! prior state.

use crate::model::column::{CellType, ColumnId};
use crate::model::error::NotFoundError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CommandResult<T> = Result<T, CommandError>;

/// A command was constructed from an incomplete or contradictory argument
/// record. Raised before any state is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentsError {
    /// A required field was not provided.
    Missing {
        command: &'static str,
        field: &'static str,
    },
    /// Mutually exclusive fields were provided together.
    Conflict {
        command: &'static str,
        fields: &'static str,
    },
    /// A required text or list field was provided but empty.
    Empty {
        command: &'static str,
        field: &'static str,
    },
}

impl Display for ArgumentsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { command, field } => {
                write!(f, "{command}: missing required argument `{field}`")
            }
            Self::Conflict { command, fields } => {
                write!(f, "{command}: arguments `{fields}` are mutually exclusive")
            }
            Self::Empty { command, field } => {
                write!(f, "{command}: argument `{field}` must not be empty")
            }
        }
    }
}

impl Error for ArgumentsError {}

/// `undo` was called on a command that is not in the applied state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoError {
    pub command: &'static str,
}

impl UndoError {
    pub fn new(command: &'static str) -> Self {
        Self { command }
    }
}

impl Display for UndoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: undo called before execute", self.command)
    }
}

impl Error for UndoError {}

/// Error returned by command construction, execution and undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Arguments(ArgumentsError),
    Undo(UndoError),
    NotFound(NotFoundError),
    /// A payload or tag operation does not fit the column's declared type.
    TypeMismatch {
        column_id: ColumnId,
        expected: CellType,
        actual: CellType,
    },
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arguments(err) => write!(f, "{err}"),
            Self::Undo(err) => write!(f, "{err}"),
            Self::NotFound(err) => write!(f, "{err}"),
            Self::TypeMismatch {
                column_id,
                expected,
                actual,
            } => write!(
                f,
                "column {column_id} expects `{}` values, got `{}`",
                expected.as_str(),
                actual.as_str()
            ),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arguments(err) => Some(err),
            Self::Undo(err) => Some(err),
            Self::NotFound(err) => Some(err),
            Self::TypeMismatch { .. } => None,
        }
    }
}

impl From<ArgumentsError> for CommandError {
    fn from(value: ArgumentsError) -> Self {
        Self::Arguments(value)
    }
}

impl From<UndoError> for CommandError {
    fn from(value: UndoError) -> Self {
        Self::Undo(value)
    }
}

impl From<NotFoundError> for CommandError {
    fn from(value: NotFoundError) -> Self {
        Self::NotFound(value)
    }
}

/// Unwraps a required argument or reports it as missing.
pub(crate) fn required<T>(
    value: Option<T>,
    command: &'static str,
    field: &'static str,
) -> Result<T, ArgumentsError> {
    value.ok_or(ArgumentsError::Missing { command, field })
}

/// Unwraps a required text argument, rejecting blank values.
pub(crate) fn required_text(
    value: Option<String>,
    command: &'static str,
    field: &'static str,
) -> Result<String, ArgumentsError> {
    let text = required(value, command, field)?;
    if text.trim().is_empty() {
        return Err(ArgumentsError::Empty { command, field });
    }
    Ok(text)
}
