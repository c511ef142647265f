//! Tree-level BER decoding. Strict: non-minimal length forms, indefinite length,
//! truncated content, and trailing bytes inside a constructed element are all rejected
//! as `MalformedBer` with the byte offset at which the problem was found.

use crate::ber::element::{Body, Element};
use crate::ber::tag::Tag;
use crate::error::{ClientError, ClientResult};

/// Decode one BER element from the front of `input`, returning it along with whatever
/// bytes follow it.
pub fn decode(input: &[u8]) -> ClientResult<(Element, &[u8])> {
    decode_one(input, input)
}

fn offset_of(base: &[u8], cursor: &[u8]) -> usize {
    cursor.as_ptr() as usize - base.as_ptr() as usize
}

fn decode_one<'a>(base: &[u8], input: &'a [u8]) -> ClientResult<(Element, &'a [u8])> {
    let (tag, after_tag) = Tag::decode(input).map_err(|e| ClientError::malformed_ber(offset_of(base, input), e))?;
    let (len, after_len) = decode_length(base, after_tag)?;

    if after_len.len() < len {
        return Err(ClientError::malformed_ber(
            offset_of(base, after_len),
            "length exceeds remaining buffer",
        ));
    }
    let (content, rest) = after_len.split_at(len);

    let body = if tag.constructed {
        let mut children = Vec::new();
        let mut cursor = content;
        while !cursor.is_empty() {
            let (child, remaining) = decode_one(base, cursor)?;
            children.push(child);
            cursor = remaining;
        }
        Body::Constructed(children)
    } else {
        Body::Primitive(content.to_vec())
    };

    Ok((Element { tag, body }, rest))
}

fn decode_length<'a>(base: &[u8], input: &'a [u8]) -> ClientResult<(usize, &'a [u8])> {
    let first = *input
        .first()
        .ok_or_else(|| ClientError::malformed_ber(offset_of(base, input), "unexpected end of input in length"))?;

    if first & 0x80 == 0 {
        return Ok((first as usize, &input[1..]));
    }

    let num_len_bytes = (first & 0x7F) as usize;
    if num_len_bytes == 0 {
        return Err(ClientError::malformed_ber(
            offset_of(base, input),
            "indefinite length form is not supported",
        ));
    }
    if num_len_bytes > 8 {
        return Err(ClientError::malformed_ber(offset_of(base, input), "length field too wide"));
    }
    if input.len() < 1 + num_len_bytes {
        return Err(ClientError::malformed_ber(
            offset_of(base, input),
            "truncated long-form length octets",
        ));
    }

    let bytes = &input[1..1 + num_len_bytes];
    if bytes[0] == 0 && num_len_bytes > 1 {
        return Err(ClientError::malformed_ber(
            offset_of(base, input),
            "non-minimal length encoding (leading zero byte)",
        ));
    }

    let mut len: usize = 0;
    for &b in bytes {
        len = (len << 8) | b as usize;
    }
    if len < 128 {
        return Err(ClientError::malformed_ber(
            offset_of(base, input),
            "long-form length encodes a value that fits the short form",
        ));
    }

    Ok((len, &input[1 + num_len_bytes..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::encode::encode;

    #[test]
    fn rejects_indefinite_length() {
        let bytes = vec![0x30, 0x80];
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, ClientError::MalformedBer { .. }));
    }

    #[test]
    fn rejects_non_minimal_length() {
        // SEQUENCE, long-form length of 1 byte encoding 0x05 (should be short form).
        let bytes = vec![0x30, 0x81, 0x05, 0, 0, 0, 0, 0];
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, ClientError::MalformedBer { .. }));
    }

    #[test]
    fn rejects_truncated_content() {
        let bytes = vec![0x02, 0x04, 0x01, 0x02]; // INTEGER claims 4 bytes, has 2
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, ClientError::MalformedBer { .. }));
    }

    #[test]
    fn decode_encode_round_trips_nested_structure() {
        let el = Element::sequence(vec![
            Element::integer(42),
            Element::octet_string(b"hello".to_vec()),
            Element::sequence(vec![Element::null()]),
        ]);
        let bytes = encode(&el);
        let (decoded, remaining) = decode(&bytes).unwrap();
        assert_eq!(decoded, el);
        assert!(remaining.is_empty());
    }

    #[test]
    fn decode_leaves_trailing_bytes_for_caller() {
        let el = Element::null();
        let mut bytes = encode(&el);
        bytes.extend_from_slice(&[0xDE, 0xAD]);
        let (decoded, remaining) = decode(&bytes).unwrap();
        assert_eq!(decoded, el);
        assert_eq!(remaining, &[0xDE, 0xAD]);
    }
}
