use crate::Error;

/// A decoded RLP header: whether the item is a list or a byte string, and
/// the declared length of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// `true` if this is a list header.
    pub list: bool,
    /// Declared payload length, in bytes.
    pub payload_length: usize,
}

impl Header {
    /// Writes this header's prefix bytes to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        let (short_base, long_base) = if self.list { (0xc0u8, 0xf7u8) } else { (0x80u8, 0xb7u8) };
        if self.payload_length <= 55 {
            out.push(short_base + self.payload_length as u8);
        } else {
            let len_bytes = minimal_be_bytes(self.payload_length);
            out.push(long_base + len_bytes.len() as u8);
            out.extend_from_slice(&len_bytes);
        }
    }

    /// Length, in bytes, of this header's own encoding (not including the
    /// payload).
    pub fn length(&self) -> usize {
        if self.payload_length <= 55 {
            1
        } else {
            1 + minimal_be_bytes(self.payload_length).len()
        }
    }

    /// Decodes a list header from the front of `buf`, advancing `buf` past
    /// the header bytes. Intended for implementors of [`crate::Decodable`]
    /// that have their own fixed field layout (rather than a homogeneous
    /// item sequence, which should use `Vec<T>`'s impl instead).
    pub fn decode(buf: &mut &[u8]) -> Result<Self, Error> {
        let (header, _consumed) = Self::decode_with_consumed(buf)?;
        Ok(header)
    }

    /// Decodes a header from the front of `buf`, advancing `buf` past the
    /// header bytes. Returns the header and the number of bytes consumed
    /// for the header itself.
    ///
    /// The single-byte special case (`[0x00, 0x7f]`) is reported as a
    /// 1-byte string payload *without* advancing `buf`, since the payload
    /// byte and the "header" are the same byte.
    pub(crate) fn decode_with_consumed(buf: &mut &[u8]) -> Result<(Self, usize), Error> {
        if buf.is_empty() {
            return Err(Error::InvalidEncoding { offset: 0, required: 1, available: 0 });
        }
        let prefix = buf[0];
        match prefix {
            0x00..=0x7f => Ok((Self { list: false, payload_length: 1 }, 0)),
            0x80..=0xb7 => {
                *buf = &buf[1..];
                let len = (prefix - 0x80) as usize;
                if len == 1 {
                    // A single byte in [0x00, 0x7f] must use the bare
                    // single-byte form, not a length-1 string header.
                    if let Some(&b) = buf.first() {
                        if b < 0x80 {
                            return Err(Error::NonMinimal { prefix });
                        }
                    }
                }
                Ok((Self { list: false, payload_length: len }, 1))
            }
            0xb8..=0xbf => {
                *buf = &buf[1..];
                let len_of_len = (prefix - 0xb7) as usize;
                let len = decode_length_of_length(buf, len_of_len, prefix)?;
                Ok((Self { list: false, payload_length: len }, 1 + len_of_len))
            }
            0xc0..=0xf7 => {
                *buf = &buf[1..];
                let len = (prefix - 0xc0) as usize;
                Ok((Self { list: true, payload_length: len }, 1))
            }
            0xf8..=0xff => {
                *buf = &buf[1..];
                let len_of_len = (prefix - 0xf7) as usize;
                let len = decode_length_of_length(buf, len_of_len, prefix)?;
                Ok((Self { list: true, payload_length: len }, 1 + len_of_len))
            }
        }
    }
}

/// Decodes the `len_of_len`-byte big-endian length field following a
/// long-form prefix, advancing `buf` past it, and enforces minimality:
/// the field must not carry a leading zero byte and must encode a value
/// greater than 55 (otherwise the short form should have been used).
fn decode_length_of_length(buf: &mut &[u8], len_of_len: usize, prefix: u8) -> Result<usize, Error> {
    if buf.len() < len_of_len {
        return Err(Error::InvalidEncoding { offset: 1, required: len_of_len, available: buf.len() });
    }
    let (len_bytes, rest) = buf.split_at(len_of_len);
    if len_bytes.first() == Some(&0) {
        return Err(Error::NonMinimal { prefix });
    }
    if len_bytes.len() > core::mem::size_of::<usize>() {
        return Err(Error::IntegerOverflow { type_name: "usize", payload_len: len_bytes.len() });
    }
    let mut padded = [0u8; core::mem::size_of::<usize>()];
    padded[core::mem::size_of::<usize>() - len_bytes.len()..].copy_from_slice(len_bytes);
    let len = usize::from_be_bytes(padded);
    if len <= 55 {
        return Err(Error::NonMinimal { prefix });
    }
    *buf = rest;
    Ok(len)
}

/// Minimal big-endian byte representation of `value` (no leading zero
/// bytes; zero itself is never passed here since callers only use this
/// for payload lengths > 55).
pub(crate) fn minimal_be_bytes(value: usize) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[first_nonzero..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_minimal_long_string_form() {
        // 0xB8 0x01 0x00: long-form string header for length 1, which
        // must use the short form instead.
        let mut buf: &[u8] = &[0xB8, 0x01, 0x00];
        let err = Header::decode_with_consumed(&mut buf).unwrap_err();
        assert_eq!(err, Error::NonMinimal { prefix: 0xB8 });
    }

    #[test]
    fn short_list_header_roundtrip() {
        let header = Header { list: true, payload_length: 2 };
        let mut out = Vec::new();
        header.encode(&mut out);
        assert_eq!(out, vec![0xc2]);
        let mut buf: &[u8] = &out;
        let (decoded, consumed) = Header::decode_with_consumed(&mut buf).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn long_list_header_roundtrip() {
        let header = Header { list: true, payload_length: 100 };
        let mut out = Vec::new();
        header.encode(&mut out);
        assert_eq!(out, vec![0xf8, 100]);
    }
}
