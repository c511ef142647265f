//! Composite builder/scanner helpers for the one structure every SNMP PDU repeats: an
//! ordered list of (OID, value) varbinds. Built on top of the generic [`Element`] tree
//! rather than one hardcoded per-PDU shape, so the same pair of functions serves GET,
//! GETBULK, and TRAP varbind lists alike.

use crate::ber::element::Element;
use crate::error::{ClientError, ClientResult};
use crate::oid::Oid;

/// `SEQUENCE { name OID, value ANY }`.
pub fn build_varbind(name: &Oid, value: Element) -> Element {
    Element::sequence(vec![Element::oid(name), value])
}

/// `SEQUENCE OF VarBind`.
pub fn build_varbind_list(varbinds: &[(Oid, Element)]) -> Element {
    Element::sequence(
        varbinds
            .iter()
            .map(|(name, value)| build_varbind(name, value.clone()))
            .collect(),
    )
}

/// Read a single varbind `SEQUENCE { name, value }`.
pub fn scan_varbind(el: &Element) -> ClientResult<(Oid, Element)> {
    let children = el.as_sequence()?;
    let [name, value] = children else {
        return Err(ClientError::malformed_ber(0, "varbind must have exactly 2 fields"));
    };
    Ok((name.as_oid()?, value.clone()))
}

/// Read a varbind list `SEQUENCE OF VarBind`.
pub fn scan_varbind_list(el: &Element) -> ClientResult<Vec<(Oid, Element)>> {
    el.as_sequence()?.iter().map(scan_varbind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::{decode::decode, encode::encode};

    #[test]
    fn varbind_list_round_trips() {
        let a = Oid::new(vec![1, 3, 6, 1, 2, 1, 1, 1, 0]).unwrap();
        let b = Oid::new(vec![1, 3, 6, 1, 2, 1, 1, 5, 0]).unwrap();
        let list = build_varbind_list(&[
            (a.clone(), Element::octet_string(b"hi".to_vec())),
            (b.clone(), Element::null()),
        ]);
        let bytes = encode(&list);
        let (decoded, _) = decode(&bytes).unwrap();
        let scanned = scan_varbind_list(&decoded).unwrap();
        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[0].0, a);
        assert_eq!(scanned[1].0, b);
    }

    #[test]
    fn malformed_varbind_shape_is_rejected() {
        let bad = Element::sequence(vec![Element::sequence(vec![Element::null()])]);
        assert!(scan_varbind_list(&bad).is_err());
    }
}
