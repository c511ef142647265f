//! BER/ASN.1 codec: a subset sufficient to build and parse SNMPv1/v2c PDUs, including
//! the SNMP application-class tags (IPADDRESS, COUNTER32, GAUGE32, TIMETICKS, OPAQUE,
//! COUNTER64).

pub mod builder;
pub mod decode;
pub mod element;
pub mod encode;
pub mod tag;

pub use builder::{build_varbind, build_varbind_list, scan_varbind, scan_varbind_list};
pub use decode::decode;
pub use element::{Body, Element, Exception};
pub use encode::encode;
pub use tag::{Class, Tag};
