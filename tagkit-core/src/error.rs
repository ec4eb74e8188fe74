use thiserror::Error;

/// Error outputs from `TagKit` outside of a tag session.
#[derive(Debug, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum TagKitError {
    /// The presented input is not valid for the requested operation
    #[error("invalid_input: {error}")]
    InvalidInput {
        /// Description of the offending input.
        error: String,
    },
    /// Unexpected error serializing or deserializing information
    #[error("serialization_error: {error}")]
    SerializationError {
        /// Underlying serializer message.
        error: String,
    },
}

/// Errors raised by the platform NFC stack through the foreign provider.
#[derive(Debug, Error, uniffi::Error)]
pub enum NfcProviderError {
    /// The radio refused the request or is held elsewhere.
    #[error("nfc busy: {0}")]
    Busy(String),

    /// The user dismissed the system NFC sheet.
    #[error("nfc request cancelled by user")]
    UserCancelled,

    /// The tag left the field or an I/O error happened while talking to it.
    #[error("tag i/o error: {0}")]
    Io(String),

    /// The tag is read-only or too small for the message.
    #[error("tag not writable: {0}")]
    NotWritable(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for NfcProviderError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

/// Failure kinds surfaced by a tag session.
///
/// Only acquisition during a write is retried; every other kind is terminal for
/// the session that produced it. Carried inside `SessionOutcome` rather than
/// thrown across the FFI boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Enum)]
pub enum SessionError {
    /// The radio is busy or unavailable, or the user declined the request.
    #[error("acquisition_failed: {attempts} attempt(s)")]
    AcquisitionFailed {
        /// Number of technology requests issued before giving up.
        attempts: u32,
    },
    /// A tag was presented but carries no usable URI record.
    #[error("no_data_on_tag: {reason:?}")]
    NoDataOnTag {
        /// Why the tag yielded no URI.
        reason: NoDataReason,
    },
    /// The URL could not be turned into an NDEF message.
    #[error("encoding_failed: {error}")]
    EncodingFailed {
        /// Codec message.
        error: String,
    },
    /// The provider failed while writing the message to the tag.
    #[error("write_failed: {error}")]
    WriteFailed {
        /// Provider message.
        error: String,
    },
    /// Any other provider failure.
    #[error("unknown_io_failure: {error}")]
    UnknownIoFailure {
        /// Provider message.
        error: String,
    },
}

/// Why a read produced no URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum NoDataReason {
    /// The tag has no NDEF message, or the message is empty.
    EmptyOrUnsupportedTag,
    /// The first record is not a well-known URI record.
    NoUriRecord,
}
