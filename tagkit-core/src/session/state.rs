use strum::{Display, EnumString};

use crate::error::SessionError;

/// Lifecycle of the tag session owned by a `TagSession`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    /// No session has run yet, or the last one was cancelled.
    #[default]
    Idle,
    /// The technology request is outstanding; waiting for a tag.
    AwaitingTag,
    /// A tag is held and being read or written.
    InProgress,
    /// The last session completed.
    Success,
    /// The last session failed.
    Failed,
}

/// Operation performed by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    /// Read the URI stored on a tag.
    Read,
    /// Write a URI to a tag.
    Write,
}

/// Result of a session, as reported to the UI.
///
/// The UI needs to tell "no data" apart from hard failures to pick the right
/// message, so failures are values here and never thrown.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum SessionOutcome {
    /// A URI was read from the tag.
    Read {
        /// Decoded URI with its scheme prefix.
        uri: String,
    },
    /// A URI was written to the tag.
    Written {
        /// The normalized URI that was written.
        uri: String,
    },
    /// The session failed.
    Failed {
        /// What went wrong.
        error: SessionError,
    },
    /// A cancel or a newer session ended this one before it finished.
    Cancelled,
}

impl SessionOutcome {
    pub(crate) fn from_result(mode: Mode, result: Result<String, SessionError>) -> Self {
        match (mode, result) {
            (Mode::Read, Ok(uri)) => Self::Read { uri },
            (Mode::Write, Ok(uri)) => Self::Written { uri },
            (_, Err(error)) => Self::Failed { error },
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&SessionError> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Read { .. } | Self::Written { .. } | Self::Cancelled => None,
        }
    }

    /// Returns the URI read or written, if any.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Read { uri } | Self::Written { uri } => Some(uri),
            Self::Failed { .. } | Self::Cancelled => None,
        }
    }
}
