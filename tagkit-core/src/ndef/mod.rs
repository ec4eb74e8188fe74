//! NFC Data Exchange Format, limited to what a URI tag needs.
//!
//! Tags carry a single NDEF message made of records. `TagKit` only writes
//! messages with one well-known URI record (`TNF_WELL_KNOWN`, type `U`) and
//! only reads the first record of a message. The wire format of a record is:
//!
//! ```text
//! +----+----+----+----+----+-----+
//! | MB | ME | CF | SR | IL | TNF |   header byte
//! +----+----+----+----+----+-----+
//! | type length                  |   1 byte
//! | payload length               |   1 byte (SR) or 4 bytes big-endian
//! | id length                    |   1 byte, only when IL is set
//! | type | id | payload          |
//! ```

use thiserror::Error;

mod message;
mod record;
mod uri;

pub use message::{decode_message, encode_message};
pub use record::{is_type, NdefRecord};
pub use uri::{decode_uri_payload, uri_record, UriRecord, URI_PREFIXES};

/// Empty record.
pub const TNF_EMPTY: u8 = 0x00;
/// NFC Forum well-known type.
pub const TNF_WELL_KNOWN: u8 = 0x01;
/// Media type as defined in RFC 2046.
pub const TNF_MIME_MEDIA: u8 = 0x02;
/// Absolute URI as defined in RFC 3986.
pub const TNF_ABSOLUTE_URI: u8 = 0x03;
/// NFC Forum external type.
pub const TNF_EXTERNAL_TYPE: u8 = 0x04;
/// Unknown payload type.
pub const TNF_UNKNOWN: u8 = 0x05;
/// Continuation of a chunked payload.
pub const TNF_UNCHANGED: u8 = 0x06;

/// Well-known record type for URIs.
pub const RTD_URI: &[u8] = b"U";
/// Well-known record type for text.
pub const RTD_TEXT: &[u8] = b"T";

/// Errors raised while encoding or decoding NDEF data.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum NdefError {
    /// A message must contain at least one record.
    #[error("ndef message has no records")]
    EmptyMessage,
    /// The buffer ended in the middle of a record.
    #[error("ndef message truncated at byte {offset}")]
    Truncated {
        /// Offset at which more bytes were expected.
        offset: u64,
    },
    /// The first record does not carry the message-begin flag.
    #[error("first ndef record is missing the message-begin flag")]
    MissingMessageBegin,
    /// Chunked records are not supported.
    #[error("chunked ndef records are not supported")]
    ChunkedRecord,
    /// Bytes follow the record flagged as message end.
    #[error("{count} trailing byte(s) after the last ndef record")]
    TrailingBytes {
        /// Number of unexpected bytes.
        count: u64,
    },
    /// TNF values are three bits wide.
    #[error("invalid type name format {0:#04x}")]
    InvalidTnf(u8),
    /// A type or id field is longer than its one-byte length prefix allows.
    #[error("ndef record {field} is {len} bytes, limit is 255")]
    FieldTooLong {
        /// Name of the offending field.
        field: String,
        /// Actual length.
        len: u64,
    },
    /// The payload does not fit the four-byte length field.
    #[error("ndef payload of {0} bytes is too large")]
    PayloadTooLarge(u64),
    /// A URI payload needs at least the identifier code byte.
    #[error("uri record payload is empty")]
    EmptyUriPayload,
    /// The identifier code is outside of the URI prefix table.
    #[error("unknown uri identifier code {0:#04x}")]
    UnknownUriPrefix(u8),
    /// The URI field is not valid UTF-8.
    #[error("uri record is not valid utf-8: {0}")]
    InvalidUtf8(String),
}
