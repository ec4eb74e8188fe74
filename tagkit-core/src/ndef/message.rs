use super::{NdefError, NdefRecord};

const FLAG_MB: u8 = 0x80;
const FLAG_ME: u8 = 0x40;
const FLAG_CF: u8 = 0x20;
const FLAG_SR: u8 = 0x10;
const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

/// Encodes `records` as one NDEF message.
///
/// Records with payloads shorter than 256 bytes use the short-record form.
///
/// # Errors
///
/// Returns an error if there are no records, a TNF does not fit in three bits,
/// or a field exceeds its length prefix.
pub fn encode_message(records: &[NdefRecord]) -> Result<Vec<u8>, NdefError> {
    if records.is_empty() {
        return Err(NdefError::EmptyMessage);
    }

    let mut bytes = Vec::new();
    let last = records.len() - 1;
    for (index, record) in records.iter().enumerate() {
        if record.tnf > TNF_MASK {
            return Err(NdefError::InvalidTnf(record.tnf));
        }
        let type_len = short_len("type", &record.record_type)?;
        let id_len = if record.id.is_empty() {
            None
        } else {
            Some(short_len("id", &record.id)?)
        };
        let payload_len = u32::try_from(record.payload.len())
            .map_err(|_| NdefError::PayloadTooLarge(record.payload.len() as u64))?;

        let mut header = record.tnf;
        if index == 0 {
            header |= FLAG_MB;
        }
        if index == last {
            header |= FLAG_ME;
        }
        let short = payload_len < 256;
        if short {
            header |= FLAG_SR;
        }
        if id_len.is_some() {
            header |= FLAG_IL;
        }

        bytes.push(header);
        bytes.push(type_len);
        if short {
            bytes.extend_from_slice(&payload_len.to_be_bytes()[3..]);
        } else {
            bytes.extend_from_slice(&payload_len.to_be_bytes());
        }
        if let Some(id_len) = id_len {
            bytes.push(id_len);
        }
        bytes.extend_from_slice(&record.record_type);
        bytes.extend_from_slice(&record.id);
        bytes.extend_from_slice(&record.payload);
    }

    Ok(bytes)
}

/// Decodes one NDEF message.
///
/// # Errors
///
/// Returns an error on truncated input, a missing message-begin flag, chunked
/// records, or bytes after the message-end record.
pub fn decode_message(bytes: &[u8]) -> Result<Vec<NdefRecord>, NdefError> {
    let mut reader = Reader { bytes, offset: 0 };
    let mut records = Vec::new();

    loop {
        let header = reader.u8()?;
        if records.is_empty() && header & FLAG_MB == 0 {
            return Err(NdefError::MissingMessageBegin);
        }
        if header & FLAG_CF != 0 {
            return Err(NdefError::ChunkedRecord);
        }

        let type_len = usize::from(reader.u8()?);
        let payload_len = if header & FLAG_SR == 0 {
            let raw = reader.take(4)?;
            u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize
        } else {
            usize::from(reader.u8()?)
        };
        let id_len = if header & FLAG_IL == 0 {
            0
        } else {
            usize::from(reader.u8()?)
        };

        records.push(NdefRecord {
            tnf: header & TNF_MASK,
            record_type: reader.take(type_len)?.to_vec(),
            id: reader.take(id_len)?.to_vec(),
            payload: reader.take(payload_len)?.to_vec(),
        });

        if header & FLAG_ME != 0 {
            break;
        }
    }

    let trailing = reader.remaining();
    if trailing > 0 {
        return Err(NdefError::TrailingBytes {
            count: trailing as u64,
        });
    }

    Ok(records)
}

fn short_len(field: &str, value: &[u8]) -> Result<u8, NdefError> {
    u8::try_from(value.len()).map_err(|_| NdefError::FieldTooLong {
        field: field.to_string(),
        len: value.len() as u64,
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], NdefError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(NdefError::Truncated {
                offset: self.bytes.len() as u64,
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, NdefError> {
        Ok(self.take(1)?[0])
    }

    const fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndef::{uri_record, UriRecord, RTD_TEXT, TNF_MIME_MEDIA, TNF_WELL_KNOWN};

    #[test]
    fn test_encode_single_uri_record() {
        let bytes = encode_message(&[uri_record("https://example.com")]).unwrap();

        // MB | ME | SR | well-known, type length 1, payload length 12, "U", 0x04, "example.com"
        let mut expected = vec![0xD1, 0x01, 0x0C, b'U', 0x04];
        expected.extend_from_slice(b"example.com");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_uri_survives_encode_and_decode() {
        let url = "https://example.com";
        let bytes = encode_message(&[uri_record(url)]).unwrap();
        let records = decode_message(&bytes).unwrap();

        assert_eq!(records.len(), 1);
        let decoded = UriRecord::from_payload(&records[0].payload).unwrap();
        assert_eq!(decoded.uri(), url);
    }

    #[test]
    fn test_long_payload_uses_four_byte_length() {
        let record = NdefRecord {
            tnf: TNF_MIME_MEDIA,
            record_type: b"text/plain".to_vec(),
            id: b"a".to_vec(),
            payload: vec![b'x'; 300],
        };
        let bytes = encode_message(std::slice::from_ref(&record)).unwrap();

        assert_eq!(bytes[0], FLAG_MB | FLAG_ME | FLAG_IL | TNF_MIME_MEDIA);
        assert_eq!(&bytes[2..6], &300u32.to_be_bytes());
        assert_eq!(decode_message(&bytes).unwrap(), vec![record]);
    }

    #[test]
    fn test_multiple_records_flags() {
        let text = NdefRecord {
            tnf: TNF_WELL_KNOWN,
            record_type: RTD_TEXT.to_vec(),
            id: Vec::new(),
            payload: b"\x02enhi".to_vec(),
        };
        let records = vec![uri_record("https://a.b"), text];
        let bytes = encode_message(&records).unwrap();

        assert_eq!(bytes[0] & (FLAG_MB | FLAG_ME), FLAG_MB);
        assert_eq!(decode_message(&bytes).unwrap(), records);
    }

    #[test]
    fn test_empty_message_rejected() {
        assert_eq!(encode_message(&[]).unwrap_err(), NdefError::EmptyMessage);
    }

    #[test]
    fn test_invalid_tnf_rejected() {
        let record = NdefRecord {
            tnf: 9,
            ..Default::default()
        };
        assert_eq!(encode_message(&[record]).unwrap_err(), NdefError::InvalidTnf(9));
    }

    #[test]
    fn test_truncated_message() {
        let bytes = encode_message(&[uri_record("https://example.com")]).unwrap();
        let err = decode_message(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, NdefError::Truncated { .. }));
        assert!(matches!(
            decode_message(&[]).unwrap_err(),
            NdefError::Truncated { .. }
        ));
    }

    #[test]
    fn test_missing_message_begin() {
        assert_eq!(
            decode_message(&[0x51, 0x01, 0x00, b'U']).unwrap_err(),
            NdefError::MissingMessageBegin
        );
    }

    #[test]
    fn test_chunked_record_rejected() {
        assert_eq!(
            decode_message(&[0xB1, 0x01, 0x00, b'U']).unwrap_err(),
            NdefError::ChunkedRecord
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode_message(&[uri_record("https://example.com")]).unwrap();
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(
            decode_message(&bytes).unwrap_err(),
            NdefError::TrailingBytes { count: 2 }
        );
    }
}
