//! SNMP message envelope and PDU: the BER-level structures that sit on top of the
//! generic codec in [`crate::ber`].

use crate::ber::{self, Element};
use crate::error::{ClientError, ClientResult};
use crate::oid::Oid;

/// SNMP protocol version. SNMPv3 (USM/VACM) is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnmpVersion {
    V1,
    V2c,
}

impl SnmpVersion {
    fn wire_value(self) -> i64 {
        match self {
            SnmpVersion::V1 => 0,
            SnmpVersion::V2c => 1,
        }
    }

    fn from_wire(v: i64) -> ClientResult<SnmpVersion> {
        match v {
            0 => Ok(SnmpVersion::V1),
            1 => Ok(SnmpVersion::V2c),
            other => Err(ClientError::malformed_ber(0, format!("unsupported SNMP version {other}"))),
        }
    }
}

/// The context-class PDU type tag (RFC 1157 §4.1, RFC 3416 §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduKind {
    GetRequest,
    GetNextRequest,
    GetResponse,
    SetRequest,
    TrapV1,
    GetBulkRequest,
    InformRequest,
    SnmpV2Trap,
}

impl PduKind {
    fn tag_number(self) -> u32 {
        use ber::tag::*;
        match self {
            PduKind::GetRequest => PDU_GET_REQUEST,
            PduKind::GetNextRequest => PDU_GET_NEXT_REQUEST,
            PduKind::GetResponse => PDU_GET_RESPONSE,
            PduKind::SetRequest => PDU_SET_REQUEST,
            PduKind::TrapV1 => PDU_TRAP_V1,
            PduKind::GetBulkRequest => PDU_GET_BULK_REQUEST,
            PduKind::InformRequest => PDU_INFORM_REQUEST,
            PduKind::SnmpV2Trap => PDU_SNMPV2_TRAP,
        }
    }

    fn from_tag_number(n: u32) -> ClientResult<PduKind> {
        use ber::tag::*;
        Ok(match n {
            PDU_GET_REQUEST => PduKind::GetRequest,
            PDU_GET_NEXT_REQUEST => PduKind::GetNextRequest,
            PDU_GET_RESPONSE => PduKind::GetResponse,
            PDU_SET_REQUEST => PduKind::SetRequest,
            PDU_TRAP_V1 => PduKind::TrapV1,
            PDU_GET_BULK_REQUEST => PduKind::GetBulkRequest,
            PDU_INFORM_REQUEST => PduKind::InformRequest,
            PDU_SNMPV2_TRAP => PduKind::SnmpV2Trap,
            other => return Err(ClientError::malformed_ber(0, format!("unknown PDU tag {other}"))),
        })
    }
}

/// `{ type, request-id, error-status, error-index, varbinds }`. For GetBulk, the third
/// and fourth fields are reinterpreted as `non-repeaters`/`max-repetitions`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub kind: PduKind,
    pub request_id: i32,
    pub error_status: i32,
    pub error_index: i32,
    pub varbinds: Vec<(Oid, Element)>,
}

impl Pdu {
    pub fn non_repeaters(&self) -> i32 {
        self.error_status
    }

    pub fn max_repetitions(&self) -> i32 {
        self.error_index
    }

    fn to_element(&self) -> Element {
        let varbind_list = ber::build_varbind_list(&self.varbinds);
        Element::context(
            self.kind.tag_number(),
            vec![
                Element::integer(self.request_id as i64),
                Element::integer(self.error_status as i64),
                Element::integer(self.error_index as i64),
                varbind_list,
            ],
        )
    }

    fn from_element(el: &Element) -> ClientResult<Pdu> {
        if el.tag.class != ber::Class::Context {
            return Err(ClientError::malformed_ber(0, "PDU must be context-tagged"));
        }
        let kind = PduKind::from_tag_number(el.tag.number)?;
        let fields = el.as_sequence()?;
        let [request_id, error_status, error_index, varbind_list] = fields else {
            return Err(ClientError::malformed_ber(0, "PDU must have exactly 4 fields"));
        };
        Ok(Pdu {
            kind,
            request_id: request_id.as_integer()? as i32,
            error_status: error_status.as_integer()? as i32,
            error_index: error_index.as_integer()? as i32,
            varbinds: ber::scan_varbind_list(varbind_list)?,
        })
    }
}

/// `SEQUENCE { version, community, pdu }` (RFC 1157 §3, RFC 3416 §2).
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub version: SnmpVersion,
    pub community: String,
    pub pdu: Pdu,
}

impl Message {
    pub fn encode(&self) -> Vec<u8> {
        let el = Element::sequence(vec![
            Element::integer(self.version.wire_value()),
            Element::octet_string(self.community.as_bytes().to_vec()),
            self.pdu.to_element(),
        ]);
        ber::encode(&el)
    }

    pub fn decode(bytes: &[u8]) -> ClientResult<Message> {
        let (el, rest) = ber::decode(bytes)?;
        if !rest.is_empty() {
            return Err(ClientError::malformed_ber(bytes.len() - rest.len(), "trailing bytes after message"));
        }
        let fields = el.as_sequence()?;
        let [version, community, pdu] = fields else {
            return Err(ClientError::malformed_ber(0, "message must have exactly 3 fields"));
        };
        Ok(Message {
            version: SnmpVersion::from_wire(version.as_integer()?)?,
            community: String::from_utf8_lossy(community.as_octet_string()?).into_owned(),
            pdu: Pdu::from_element(pdu)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pdu() -> Pdu {
        let oid = Oid::new(vec![1, 3, 6, 1, 2, 1, 1, 1, 0]).unwrap();
        Pdu {
            kind: PduKind::GetRequest,
            request_id: 12345,
            error_status: 0,
            error_index: 0,
            varbinds: vec![(oid, Element::null())],
        }
    }

    #[test]
    fn message_round_trips() {
        let msg = Message {
            version: SnmpVersion::V2c,
            community: "public".to_string(),
            pdu: sample_pdu(),
        };
        let bytes = msg.encode();
        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn v1_wire_value_is_zero() {
        let msg = Message {
            version: SnmpVersion::V1,
            community: "public".to_string(),
            pdu: sample_pdu(),
        };
        let bytes = msg.encode();
        // version INTEGER content byte sits right after community-length-prefixed OCTET
        // STRING tag/len/bytes at a fixed early offset; simplest to just decode back.
        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded.version, SnmpVersion::V1);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let el = Element::sequence(vec![
            Element::integer(3),
            Element::octet_string(b"public".to_vec()),
            sample_pdu().to_element(),
        ]);
        let bytes = ber::encode(&el);
        assert!(Message::decode(&bytes).is_err());
    }

    #[test]
    fn get_bulk_overloads_status_and_index_fields() {
        let oid = Oid::new(vec![1, 3, 6, 1, 2, 1, 2, 2]).unwrap();
        let pdu = Pdu {
            kind: PduKind::GetBulkRequest,
            request_id: 7,
            error_status: 0, // non-repeaters
            error_index: 10, // max-repetitions
            varbinds: vec![(oid, Element::null())],
        };
        assert_eq!(pdu.non_repeaters(), 0);
        assert_eq!(pdu.max_repetitions(), 10);
    }
}
