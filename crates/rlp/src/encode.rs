use crate::header::Header;

/// A type that can be written to its RLP representation.
///
/// Implementors report their encoded [`Encodable::length`] up front so
/// that container types (lists, transaction envelopes) can compute their
/// own header's payload length without a throwaway encode pass.
pub trait Encodable {
    /// Appends this value's RLP encoding to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    /// The exact number of bytes [`Encodable::encode`] will append.
    fn length(&self) -> usize;
}

/// Encodes `item` into a freshly allocated buffer.
pub fn encode<T: Encodable + ?Sized>(item: &T) -> Vec<u8> {
    let mut out = Vec::with_capacity(item.length());
    item.encode(&mut out);
    out
}

/// Writes a string (non-list) header for a payload of `payload_length`
/// bytes, for implementors encoding raw byte strings directly.
pub fn encode_str_header(payload_length: usize, out: &mut Vec<u8>) {
    Header { list: false, payload_length }.encode(out);
}

/// Writes a list header for a payload of `payload_length` bytes. Callers
/// compute `payload_length` as the sum of each field's
/// [`Encodable::length`].
pub fn encode_list_header(payload_length: usize, out: &mut Vec<u8>) {
    Header { list: true, payload_length }.encode(out);
}

/// Length of the header that would precede a string payload of
/// `payload_length` bytes.
pub fn str_header_length(payload_length: usize) -> usize {
    Header { list: false, payload_length }.length()
}

/// Length of the header that would precede a list payload of
/// `payload_length` bytes.
pub fn list_header_length(payload_length: usize) -> usize {
    Header { list: true, payload_length }.length()
}

/// Encodes a raw byte slice as an RLP string.
pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        out.push(bytes[0]);
    } else {
        encode_str_header(bytes.len(), out);
        out.extend_from_slice(bytes);
    }
}

/// Length of the RLP string encoding of `bytes`.
pub fn bytes_length(bytes: &[u8]) -> usize {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        1
    } else {
        str_header_length(bytes.len()) + bytes.len()
    }
}
