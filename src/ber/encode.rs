//! Tree-level BER encoding: identifier octets, length octets, content.

use crate::ber::element::{Body, Element};

/// Encode `element` to its full BER byte representation.
pub fn encode(element: &Element) -> Vec<u8> {
    let content = match &element.body {
        Body::Primitive(bytes) => bytes.clone(),
        Body::Constructed(children) => {
            let mut buf = Vec::new();
            for child in children {
                buf.extend_from_slice(&encode(child));
            }
            buf
        }
    };

    let mut out = Vec::with_capacity(content.len() + 8);
    element.tag.encode(&mut out);
    encode_length(&mut out, content.len());
    out.extend_from_slice(&content);
    out
}

/// Minimal-length BER length octets: short form under 128, long form with the fewest
/// bytes necessary otherwise.
pub fn encode_length(out: &mut Vec<u8>, len: usize) {
    if len < 128 {
        out.push(len as u8);
        return;
    }
    let mut digits = Vec::new();
    let mut n = len;
    while n > 0 {
        digits.push((n & 0xFF) as u8);
        n >>= 8;
    }
    digits.reverse();
    out.push(0x80 | digits.len() as u8);
    out.extend_from_slice(&digits);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::decode::decode;

    #[test]
    fn short_length_form() {
        let mut buf = Vec::new();
        encode_length(&mut buf, 5);
        assert_eq!(buf, vec![0x05]);
    }

    #[test]
    fn long_length_form_minimal() {
        let mut buf = Vec::new();
        encode_length(&mut buf, 300);
        assert_eq!(buf, vec![0x82, 0x01, 0x2C]);
    }

    #[test]
    fn sequence_of_integers_round_trips() {
        let el = Element::sequence(vec![Element::integer(1), Element::integer(-1), Element::null()]);
        let bytes = encode(&el);
        let (decoded, rest) = decode(&bytes).unwrap();
        assert_eq!(decoded, el);
        assert!(rest.is_empty());
    }
}
