//! GET/GETNEXT/GETBULK/TRAP builders on top of [`crate::session`], plus the typed-value
//! grammar user-supplied trap varbinds are parsed from.

use crate::ber::Element;
use crate::error::{ClientError, ClientResult, SnmpError};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduKind, SnmpVersion};
use crate::session::AgentSession;

/// `GET`: request the current value of each named OID.
pub fn get(session: &mut AgentSession, oids: &[Oid]) -> ClientResult<Pdu> {
    request(session, PduKind::GetRequest, oids, 0, 0, None)
}

/// `GETNEXT`: request the lexicographically-next object after each named OID.
pub fn getnext(session: &mut AgentSession, oids: &[Oid]) -> ClientResult<Pdu> {
    request(session, PduKind::GetNextRequest, oids, 0, 0, None)
}

/// `GETBULK`: v2c only. `non_repeaters` must not exceed `oids.len()`.
pub fn getbulk(
    session: &mut AgentSession,
    oids: &[Oid],
    non_repeaters: u32,
    max_repetitions: u32,
) -> ClientResult<Pdu> {
    getbulk_with_error_fallback(session, oids, non_repeaters, max_repetitions, None)
}

/// `GETNEXT`, tagging an out-of-range `error-index` with `fallback_oid` instead of the
/// first varbind. The walk engine passes its own cursor so a malformed `error-index`
/// reports the last OID it actually walked past, not an arbitrary response varbind.
pub fn getnext_with_error_fallback(
    session: &mut AgentSession,
    oids: &[Oid],
    fallback_oid: &Oid,
) -> ClientResult<Pdu> {
    request(session, PduKind::GetNextRequest, oids, 0, 0, Some(fallback_oid))
}

/// `GETBULK`, tagging an out-of-range `error-index` with `fallback_oid` (see
/// [`getnext_with_error_fallback`]).
pub fn getbulk_with_error_fallback(
    session: &mut AgentSession,
    oids: &[Oid],
    non_repeaters: u32,
    max_repetitions: u32,
    fallback_oid: Option<&Oid>,
) -> ClientResult<Pdu> {
    if session.version() != SnmpVersion::V2c {
        return Err(ClientError::VersionError);
    }
    if non_repeaters as usize > oids.len() {
        return Err(ClientError::ArgumentError(format!(
            "non_repeaters ({non_repeaters}) exceeds number of OIDs ({})",
            oids.len()
        )));
    }
    request(
        session,
        PduKind::GetBulkRequest,
        oids,
        non_repeaters as i32,
        max_repetitions as i32,
        fallback_oid,
    )
}

fn request(
    session: &mut AgentSession,
    kind: PduKind,
    oids: &[Oid],
    error_status: i32,
    error_index: i32,
    fallback_oid: Option<&Oid>,
) -> ClientResult<Pdu> {
    let varbinds = oids.iter().map(|o| (o.clone(), Element::null())).collect();
    let pdu = Pdu {
        kind,
        request_id: 0, // assigned by the session
        error_status,
        error_index,
        varbinds,
    };
    let response = session.send_receive(pdu)?;
    check_error_status(&response, fallback_oid)?;
    Ok(response)
}

/// Translate a non-zero `error-status` into a [`ClientError::ProtocolError`], tagging
/// the offending OID via `error-index` (1-based). When the index is out of range, falls
/// back to `fallback_oid` if the caller supplied one (the walk engine's own cursor),
/// then to the response's first varbind, then to a placeholder OID if the response
/// carries no varbinds at all.
fn check_error_status(pdu: &Pdu, fallback_oid: Option<&Oid>) -> ClientResult<()> {
    let Some(snmp_err) = SnmpError::from_status(pdu.error_status as i64) else {
        return Ok(());
    };
    let oid = pdu
        .varbinds
        .get((pdu.error_index as usize).saturating_sub(1))
        .map(|(oid, _)| oid.clone())
        .or_else(|| fallback_oid.cloned())
        .or_else(|| pdu.varbinds.first().map(|(oid, _)| oid.clone()))
        .unwrap_or_else(|| Oid::new(vec![0]).unwrap());
    Err(ClientError::ProtocolError { oid, source: snmp_err })
}

/// `SNMPv2-Trap`: prepends the two mandatory synthetic varbinds (`sysUpTime.0`,
/// `snmpTrapOID.0`) and fires without waiting for a reply (traps are unconfirmed).
pub fn trap_v2(
    session: &mut AgentSession,
    sys_up_time_hundredths: u32,
    trap_oid: &Oid,
    varbinds: &[(Oid, Element)],
) -> ClientResult<()> {
    let sys_up_time_oid = Oid::new(vec![1, 3, 6, 1, 2, 1, 1, 3, 0])?;
    let snmp_trap_oid_oid = Oid::new(vec![1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0])?;

    let mut all_varbinds = vec![
        (sys_up_time_oid, Element::timeticks(sys_up_time_hundredths)),
        (snmp_trap_oid_oid, Element::oid(trap_oid)),
    ];
    all_varbinds.extend(varbinds.iter().cloned());

    let pdu = Pdu {
        kind: PduKind::SnmpV2Trap,
        request_id: 0,
        error_status: 0,
        error_index: 0,
        varbinds: all_varbinds,
    };
    session.send_unconfirmed(pdu)
}

/// Parse one `tag:literal` pair from the CLI's trap varbind grammar (the net-snmp-style
/// `a`/`b`/`c`/`d`/`i`/`n`/`o`/`s`/`t`/`x` type tags). `tag` is a single character;
/// `literal` is whatever follows (already split
/// from `tag` by the caller, e.g. a `clap` multi-value argument).
pub fn parse_trap_value(tag: char, literal: &str, mib: &dyn crate::mib::MibSource) -> ClientResult<Element> {
    let bad = || ClientError::ArgumentError(format!("badValue: tag {tag:?}, literal {literal:?}"));
    match tag {
        'a' => {
            let octets = parse_ipv4(literal).ok_or_else(bad)?;
            Ok(Element::ip_address(octets))
        }
        'b' => {
            let mut bytes = Vec::new();
            for tok in literal.split([',', ' ', '\t']).filter(|t| !t.is_empty()) {
                let bit: u32 = tok.parse().map_err(|_| bad())?;
                let byte_index = (bit / 8) as usize;
                if bytes.len() <= byte_index {
                    bytes.resize(byte_index + 1, 0u8);
                }
                bytes[byte_index] |= 0x80 >> (bit % 8);
            }
            Ok(Element::octet_string(bytes))
        }
        'c' => {
            let v: i32 = literal.parse().map_err(|_| bad())?;
            Ok(Element::counter32(v as u32))
        }
        'd' => {
            let bytes: Result<Vec<u8>, _> = literal
                .split_whitespace()
                .map(|tok| tok.parse::<u8>())
                .collect();
            Ok(Element::octet_string(bytes.map_err(|_| bad())?))
        }
        'i' | 'u' => {
            let v: i64 = literal.parse().map_err(|_| bad())?;
            Ok(Element::integer(v))
        }
        'n' => Ok(Element::null()),
        'o' => {
            let oid = Oid::parse(literal, mib).map_err(|_| bad())?;
            Ok(Element::oid(&oid))
        }
        's' => Ok(Element::octet_string(literal.as_bytes().to_vec())),
        't' => {
            let v: u32 = literal.parse().map_err(|_| bad())?;
            Ok(Element::timeticks(v))
        }
        'x' => {
            let bytes: Result<Vec<u8>, _> = literal
                .split_whitespace()
                .map(|tok| u8::from_str_radix(tok, 16))
                .collect();
            Ok(Element::octet_string(bytes.map_err(|_| bad())?))
        }
        _ => Err(bad()),
    }
}

fn parse_ipv4(s: &str) -> Option<[u8; 4]> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    let mut octets = [0u8; 4];
    for (i, p) in parts.iter().enumerate() {
        octets[i] = p.parse().ok()?;
    }
    Some(octets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mib::builtin::builtin_mib;

    #[test]
    fn getbulk_rejects_non_repeaters_exceeding_oid_count() {
        let mib = builtin_mib();
        let oid = Oid::parse("sysDescr.0", &mib).unwrap();
        let socket = crate::transport::parse_address("udp:127.0.0.1:1", 161).unwrap();
        let mut session = AgentSession::new(
            socket,
            SnmpVersion::V2c,
            "public",
            std::time::Duration::from_millis(10),
            0,
        );
        let err = getbulk(&mut session, &[oid], 2, 10).unwrap_err();
        assert!(matches!(err, ClientError::ArgumentError(_)));
    }

    #[test]
    fn getbulk_on_v1_session_is_version_error() {
        let mib = builtin_mib();
        let oid = Oid::parse("sysDescr.0", &mib).unwrap();
        let socket = crate::transport::parse_address("udp:127.0.0.1:1", 161).unwrap();
        let mut session = AgentSession::new(
            socket,
            SnmpVersion::V1,
            "public",
            std::time::Duration::from_millis(10),
            0,
        );
        let err = getbulk(&mut session, &[oid], 0, 10).unwrap_err();
        assert!(matches!(err, ClientError::VersionError));
    }

    #[test]
    fn parse_trap_value_ipaddress() {
        let mib = builtin_mib();
        let el = parse_trap_value('a', "192.168.1.1", &mib).unwrap();
        assert_eq!(el.as_ip_address().unwrap(), [192, 168, 1, 1]);
    }

    #[test]
    fn parse_trap_value_hex_bytes() {
        let mib = builtin_mib();
        let el = parse_trap_value('x', "DE AD BE EF", &mib).unwrap();
        assert_eq!(el.as_octet_string().unwrap(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn parse_trap_value_bits_sets_high_bit_first() {
        let mib = builtin_mib();
        let el = parse_trap_value('b', "0,8", &mib).unwrap();
        assert_eq!(el.as_octet_string().unwrap(), &[0x80, 0x80]);
    }

    #[test]
    fn parse_trap_value_bad_literal_is_argument_error() {
        let mib = builtin_mib();
        let err = parse_trap_value('i', "not-a-number", &mib).unwrap_err();
        assert!(matches!(err, ClientError::ArgumentError(_)));
    }

    #[test]
    fn parse_trap_value_unknown_tag_is_argument_error() {
        let mib = builtin_mib();
        let err = parse_trap_value('z', "x", &mib).unwrap_err();
        assert!(matches!(err, ClientError::ArgumentError(_)));
    }
}
