use crate::{header::Header, Error};

/// A type that can be read back from its RLP representation.
pub trait Decodable: Sized {
    /// Decodes a value from the front of `buf`, advancing `buf` past the
    /// bytes consumed.
    fn decode(buf: &mut &[u8]) -> Result<Self, Error>;
}

/// Decodes a single top-level item from `bytes`, requiring the entire
/// slice to be consumed.
pub fn decode<T: Decodable>(bytes: &[u8]) -> Result<T, Error> {
    let mut buf = bytes;
    let item = T::decode(&mut buf)?;
    if !buf.is_empty() {
        return Err(Error::TrailingBytes { remaining: buf.len() });
    }
    Ok(item)
}

/// Decodes a list's items, enforcing that the sum of each item's
/// consumption matches the list header's declared payload length
/// exactly.
///
/// Items are decoded directly against `buf` rather than a sub-slice
/// bounded to the declared payload: this is what lets an item whose own
/// header claims more bytes than the list allotted it be caught as a
/// [`Error::ListLengthMismatch`] (declared vs. actual end offset) instead
/// of an opaque short read.
pub(crate) fn decode_list_items<T: Decodable>(buf: &mut &[u8]) -> Result<Vec<T>, Error> {
    let (header, header_len) = Header::decode_with_consumed(buf)?;
    if !header.list {
        return Err(Error::UnexpectedString);
    }
    let declared_end = header_len + header.payload_length;
    let mut items = Vec::new();
    let mut consumed = header_len;
    while consumed < declared_end {
        let before = buf.len();
        let item = T::decode(buf)?;
        let item_consumed = before - buf.len();
        consumed += item_consumed;
        items.push(item);
        if consumed > declared_end {
            return Err(Error::ListLengthMismatch { declared_end, actual_end: consumed });
        }
    }
    Ok(items)
}

/// Decodes the header for a string (non-list) item and returns its
/// payload, advancing `buf` past both the header and the payload.
///
/// Public so downstream crates can implement [`Decodable`] for their own
/// fixed-size byte-string newtypes (an address, a hash, a 48-byte KZG
/// commitment) without re-deriving header parsing.
pub fn decode_str_payload<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], Error> {
    let (header, header_len) = Header::decode_with_consumed(buf)?;
    if header.list {
        return Err(Error::UnexpectedList);
    }
    if header_len == 0 {
        // The bare single-byte form ([0x00, 0x7f]): the byte itself is
        // the one-byte payload and has not been consumed yet.
        let (payload, rest) = buf.split_at(1);
        *buf = rest;
        return Ok(payload);
    }
    if buf.len() < header.payload_length {
        return Err(Error::InvalidEncoding {
            offset: 0,
            required: header.payload_length,
            available: buf.len(),
        });
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    Ok(payload)
}
