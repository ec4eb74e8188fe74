use serde::{Deserialize, Serialize};

/// A single NDEF record as exchanged with the platform NFC stack.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Record)]
pub struct NdefRecord {
    /// Type name format, the low three bits of the record header.
    pub tnf: u8,
    /// Record type, e.g. `U` for a well-known URI record.
    pub record_type: Vec<u8>,
    /// Optional record identifier, empty when absent.
    #[serde(default)]
    pub id: Vec<u8>,
    /// Record payload.
    pub payload: Vec<u8>,
}

/// Returns `true` if `record` has the given type name format and record type.
#[must_use]
pub fn is_type(record: &NdefRecord, tnf: u8, record_type: &[u8]) -> bool {
    record.tnf == tnf && record.record_type == record_type
}
