use super::{NdefError, NdefRecord, RTD_URI, TNF_WELL_KNOWN};

/// URI identifier codes from the NFC Forum URI record type definition.
///
/// The index is the code stored in the first payload byte.
pub const URI_PREFIXES: [&str; 36] = [
    "",
    "http://www.",
    "https://www.",
    "http://",
    "https://",
    "tel:",
    "mailto:",
    "ftp://anonymous:anonymous@",
    "ftp://ftp.",
    "ftps://",
    "sftp://",
    "smb://",
    "nfs://",
    "ftp://",
    "dav://",
    "news:",
    "telnet://",
    "imap:",
    "rtsp://",
    "urn:",
    "pop:",
    "sip:",
    "sips:",
    "tftp:",
    "btspp://",
    "btl2cap://",
    "btgoep://",
    "tcpobex://",
    "irdaobex://",
    "file://",
    "urn:epc:id:",
    "urn:epc:tag:",
    "urn:epc:pat:",
    "urn:epc:raw:",
    "urn:epc:",
    "urn:nfc:",
];

/// A decoded URI record payload.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct UriRecord {
    /// Identifier code, an index into [`URI_PREFIXES`].
    pub prefix_code: u8,
    /// The URI with the abbreviated prefix removed.
    pub remainder: String,
}

impl UriRecord {
    /// Returns the prefix abbreviated by `prefix_code`.
    ///
    /// Codes outside of the table abbreviate nothing.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        URI_PREFIXES
            .get(usize::from(self.prefix_code))
            .copied()
            .unwrap_or_default()
    }

    /// Returns the full URI with the prefix re-applied.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{}{}", self.prefix(), self.remainder)
    }

    /// Parses a URI record payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is empty, the identifier code is not in the
    /// prefix table, or the remainder is not UTF-8.
    pub fn from_payload(payload: &[u8]) -> Result<Self, NdefError> {
        let (&prefix_code, rest) =
            payload.split_first().ok_or(NdefError::EmptyUriPayload)?;
        if usize::from(prefix_code) >= URI_PREFIXES.len() {
            return Err(NdefError::UnknownUriPrefix(prefix_code));
        }
        let remainder = std::str::from_utf8(rest)
            .map_err(|e| NdefError::InvalidUtf8(e.to_string()))?
            .to_string();
        Ok(Self {
            prefix_code,
            remainder,
        })
    }

    /// Abbreviates `uri` with the longest matching prefix.
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        let (prefix_code, prefix) = (0u8..)
            .zip(URI_PREFIXES)
            .skip(1)
            .filter(|(_, prefix)| uri.starts_with(prefix))
            .max_by_key(|(_, prefix)| prefix.len())
            .unwrap_or((0, ""));

        Self {
            prefix_code,
            remainder: uri[prefix.len()..].to_string(),
        }
    }

    /// Serializes the record back into a payload.
    #[must_use]
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(1 + self.remainder.len());
        payload.push(self.prefix_code);
        payload.extend_from_slice(self.remainder.as_bytes());
        payload
    }
}

/// Builds a well-known URI record for `uri`.
#[uniffi::export]
#[must_use]
pub fn uri_record(uri: &str) -> NdefRecord {
    NdefRecord {
        tnf: TNF_WELL_KNOWN,
        record_type: RTD_URI.to_vec(),
        id: Vec::new(),
        payload: UriRecord::from_uri(uri).to_payload(),
    }
}

/// Decodes a URI record payload into the full URI.
///
/// # Errors
///
/// See [`UriRecord::from_payload`].
#[uniffi::export]
#[allow(clippy::needless_pass_by_value)]
pub fn decode_uri_payload(payload: Vec<u8>) -> Result<String, NdefError> {
    UriRecord::from_payload(&payload).map(|record| record.uri())
}
