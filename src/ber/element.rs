//! The dynamic BER value tree: a tagged sum of raw bytes or child elements, shared by
//! every PDU field instead of a distinct type per ASN.1 construct.

use crate::ber::tag::{self, Tag};
use crate::error::{ClientError, ClientResult};
use crate::oid::Oid;

/// The payload of a BER element: either the raw content octets (primitive) or an
/// ordered list of child elements (constructed).
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Primitive(Vec<u8>),
    Constructed(Vec<Element>),
}

/// A single tagged BER value.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub body: Body,
}

/// The three "exception" values a GETNEXT/GETBULK response can carry in place of a
/// varbind's value (RFC 3416 §2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl Element {
    pub fn null() -> Element {
        Element {
            tag: Tag::universal(tag::UNIV_NULL, false),
            body: Body::Primitive(Vec::new()),
        }
    }

    pub fn boolean(v: bool) -> Element {
        Element {
            tag: Tag::universal(tag::UNIV_BOOLEAN, false),
            body: Body::Primitive(vec![if v { 0xFF } else { 0x00 }]),
        }
    }

    pub fn integer(v: i64) -> Element {
        Element {
            tag: Tag::universal(tag::UNIV_INTEGER, false),
            body: Body::Primitive(encode_signed_minimal(v)),
        }
    }

    pub fn octet_string(bytes: impl Into<Vec<u8>>) -> Element {
        Element {
            tag: Tag::universal(tag::UNIV_OCTET_STRING, false),
            body: Body::Primitive(bytes.into()),
        }
    }

    pub fn oid(oid: &Oid) -> Element {
        Element {
            tag: Tag::universal(tag::UNIV_OID, false),
            body: Body::Primitive(encode_oid_content(oid)),
        }
    }

    pub fn sequence(children: Vec<Element>) -> Element {
        Element {
            tag: Tag::sequence(),
            body: Body::Constructed(children),
        }
    }

    pub fn ip_address(octets: [u8; 4]) -> Element {
        Element {
            tag: Tag::application(tag::APP_IP_ADDRESS),
            body: Body::Primitive(octets.to_vec()),
        }
    }

    /// COUNTER32 / GAUGE32 / TIMETICKS / COUNTER64: INTEGER content under an
    /// APPLICATION-class tag. Always non-negative: encoders must not emit a leading
    /// sign-extension byte.
    pub fn application_integer(app_tag: u32, v: u64) -> Element {
        Element {
            tag: Tag::application(app_tag),
            body: Body::Primitive(encode_unsigned_minimal(v)),
        }
    }

    pub fn counter32(v: u32) -> Element {
        Element::application_integer(tag::APP_COUNTER32, v as u64)
    }

    pub fn gauge32(v: u32) -> Element {
        Element::application_integer(tag::APP_GAUGE32, v as u64)
    }

    pub fn timeticks(v: u32) -> Element {
        Element::application_integer(tag::APP_TIMETICKS, v as u64)
    }

    pub fn counter64(v: u64) -> Element {
        Element::application_integer(tag::APP_COUNTER64, v)
    }

    pub fn opaque(bytes: impl Into<Vec<u8>>) -> Element {
        Element {
            tag: Tag::application(tag::APP_OPAQUE),
            body: Body::Primitive(bytes.into()),
        }
    }

    pub fn exception(kind: Exception) -> Element {
        let number = match kind {
            Exception::NoSuchObject => tag::CTX_NO_SUCH_OBJECT,
            Exception::NoSuchInstance => tag::CTX_NO_SUCH_INSTANCE,
            Exception::EndOfMibView => tag::CTX_END_OF_MIB_VIEW,
        };
        Element {
            tag: Tag::context(number, false),
            body: Body::Primitive(Vec::new()),
        }
    }

    /// Context-class constructed wrapper used for PDU bodies (e.g. `0xA0` GetRequest).
    pub fn context(number: u32, children: Vec<Element>) -> Element {
        Element {
            tag: Tag::context(number, true),
            body: Body::Constructed(children),
        }
    }

    pub fn as_exception(&self) -> Option<Exception> {
        if self.tag.class != crate::ber::tag::Class::Context || self.tag.constructed {
            return None;
        }
        match self.tag.number {
            tag::CTX_NO_SUCH_OBJECT => Some(Exception::NoSuchObject),
            tag::CTX_NO_SUCH_INSTANCE => Some(Exception::NoSuchInstance),
            tag::CTX_END_OF_MIB_VIEW => Some(Exception::EndOfMibView),
            _ => None,
        }
    }

    fn primitive_bytes(&self) -> ClientResult<&[u8]> {
        match &self.body {
            Body::Primitive(b) => Ok(b),
            Body::Constructed(_) => Err(ClientError::malformed_ber(0, "expected primitive content")),
        }
    }

    pub fn as_integer(&self) -> ClientResult<i64> {
        decode_signed(self.primitive_bytes()?)
    }

    pub fn as_unsigned(&self) -> ClientResult<u64> {
        decode_unsigned(self.primitive_bytes()?)
    }

    pub fn as_octet_string(&self) -> ClientResult<&[u8]> {
        self.primitive_bytes()
    }

    pub fn as_oid(&self) -> ClientResult<Oid> {
        decode_oid_content(self.primitive_bytes()?)
    }

    pub fn as_ip_address(&self) -> ClientResult<[u8; 4]> {
        let bytes = self.primitive_bytes()?;
        bytes
            .try_into()
            .map_err(|_| ClientError::malformed_ber(0, "IpAddress must be 4 octets"))
    }

    pub fn as_sequence(&self) -> ClientResult<&[Element]> {
        match &self.body {
            Body::Constructed(children) => Ok(children),
            Body::Primitive(_) => Err(ClientError::malformed_ber(0, "expected constructed content")),
        }
    }
}

/// Minimum-length two's-complement encoding: no redundant leading 0x00/0xFF byte.
pub(crate) fn encode_signed_minimal(v: i64) -> Vec<u8> {
    let mut bytes = v.to_be_bytes().to_vec();
    while bytes.len() > 1 {
        let keep_byte0 = bytes[0] == 0x00 && bytes[1] & 0x80 == 0;
        let keep_byte1 = bytes[0] == 0xFF && bytes[1] & 0x80 != 0;
        if keep_byte0 || keep_byte1 {
            bytes.remove(0);
        } else {
            break;
        }
    }
    bytes
}

/// Same trimming, but the value is always non-negative (application-class integers):
/// a leading 0x00 is stripped only when doing so would not flip the sign bit on, and a
/// leading 0x00 is *kept* (not re-added) since the value is never negative to begin with.
pub(crate) fn encode_unsigned_minimal(v: u64) -> Vec<u8> {
    let mut bytes = v.to_be_bytes().to_vec();
    while bytes.len() > 1 && bytes[0] == 0x00 && bytes[1] & 0x80 == 0 {
        bytes.remove(0);
    }
    // If the high bit of the first remaining byte is set, BER INTEGER encoding would
    // read it as negative; application integers are never negative, so a 0x00 pad must
    // be kept in that case (we only removed 0x00 padding bytes whose *next* byte's high
    // bit was clear, so this can't currently happen, but keep the guard explicit).
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0x00);
    }
    bytes
}

fn decode_signed(bytes: &[u8]) -> ClientResult<i64> {
    if bytes.is_empty() {
        return Err(ClientError::malformed_ber(0, "empty INTEGER content"));
    }
    if bytes.len() > 8 {
        return Err(ClientError::malformed_ber(0, "INTEGER too wide for i64"));
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut buf = [if negative { 0xFF } else { 0x00 }; 8];
    let start = 8 - bytes.len();
    buf[start..].copy_from_slice(bytes);
    Ok(i64::from_be_bytes(buf))
}

fn decode_unsigned(bytes: &[u8]) -> ClientResult<u64> {
    if bytes.is_empty() {
        return Err(ClientError::malformed_ber(0, "empty INTEGER content"));
    }
    if bytes.len() > 9 || (bytes.len() == 9 && bytes[0] != 0x00) {
        return Err(ClientError::malformed_ber(0, "application integer too wide for u64"));
    }
    let mut v: u64 = 0;
    for &b in bytes {
        v = (v << 8) | b as u64;
    }
    Ok(v)
}

pub(crate) fn encode_oid_content(oid: &Oid) -> Vec<u8> {
    let subs = oid.as_slice();
    let mut out = Vec::new();
    if subs.len() >= 2 {
        out.push((subs[0] * 40 + subs[1]) as u8);
    } else if subs.len() == 1 {
        out.push((subs[0] * 40) as u8);
    }
    let tail = if subs.len() >= 2 { &subs[2..] } else { &[] };
    for &sub_id in tail {
        encode_base128(sub_id, &mut out);
    }
    out
}

fn encode_base128(value: u32, out: &mut Vec<u8>) {
    if value < 0x80 {
        out.push(value as u8);
        return;
    }
    let mut digits = Vec::new();
    let mut n = value;
    digits.push((n & 0x7F) as u8);
    n >>= 7;
    while n > 0 {
        digits.push((n & 0x7F) as u8 | 0x80);
        n >>= 7;
    }
    digits.reverse();
    out.extend_from_slice(&digits);
}

fn decode_oid_content(bytes: &[u8]) -> ClientResult<Oid> {
    if bytes.is_empty() {
        return Err(ClientError::malformed_ber(0, "empty OID content"));
    }
    let first = bytes[0];
    let mut subs = vec![(first / 40) as u32, (first % 40) as u32];

    let mut cursor = &bytes[1..];
    while !cursor.is_empty() {
        let mut value: u32 = 0;
        let mut consumed = 0;
        loop {
            let b = *cursor
                .get(consumed)
                .ok_or_else(|| ClientError::malformed_ber(0, "truncated OID sub-identifier"))?;
            value = value
                .checked_shl(7)
                .ok_or_else(|| ClientError::malformed_ber(0, "OID sub-identifier overflow"))?
                | (b & 0x7F) as u32;
            consumed += 1;
            if b & 0x80 == 0 {
                break;
            }
        }
        subs.push(value);
        cursor = &cursor[consumed..];
    }
    Oid::new(subs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_minimal_encoding_length() {
        assert_eq!(encode_signed_minimal(0), vec![0x00]);
        assert_eq!(encode_signed_minimal(127), vec![0x7F]);
        assert_eq!(encode_signed_minimal(128), vec![0x00, 0x80]);
        assert_eq!(encode_signed_minimal(-1), vec![0xFF]);
        assert_eq!(encode_signed_minimal(-128), vec![0x80]);
        assert_eq!(encode_signed_minimal(-129), vec![0xFF, 0x7F]);
    }

    #[test]
    fn integer_round_trips() {
        for v in [-129i64, -128, -1, 0, 1, 127, 128, 65535, i64::MAX, i64::MIN] {
            let enc = Element::integer(v);
            assert_eq!(enc.as_integer().unwrap(), v);
        }
    }

    #[test]
    fn application_integer_never_sign_extends() {
        // 0x80000000 would look negative as a bare INTEGER; application encoding must
        // prefix a 0x00 so the content is unambiguously non-negative.
        let el = Element::counter32(0x8000_0000);
        let Body::Primitive(bytes) = &el.body else { unreachable!() };
        assert_eq!(bytes[0] & 0x80, 0);
        assert_eq!(el.as_unsigned().unwrap(), 0x8000_0000);
    }

    #[test]
    fn oid_round_trips() {
        let oid = Oid::new(vec![1, 3, 6, 1, 2, 1, 1, 1, 0]).unwrap();
        let el = Element::oid(&oid);
        assert_eq!(el.as_oid().unwrap(), oid);
    }

    #[test]
    fn oid_with_large_sub_id_round_trips() {
        let oid = Oid::new(vec![1, 3, 6, 1, 4, 1, 12345, 99999]).unwrap();
        let el = Element::oid(&oid);
        assert_eq!(el.as_oid().unwrap(), oid);
    }
}
