//! rsnmp - SNMP command-line client core
//!
//! The BER/ASN.1 codec, OID model, MIB symbol table, transport, agent session,
//! operation layer, walk engine, and varbind printer that back the `snmp` binary.

pub mod ber;
pub mod config;
pub mod error;
pub mod mib;
pub mod oid;
pub mod ops;
pub mod pdu;
pub mod printer;
pub mod session;
pub mod transport;
pub mod walk;

/// Crate version, as reported by `snmp --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default agent port for GET/GETNEXT/GETBULK/WALK.
pub const DEFAULT_AGENT_PORT: u16 = 161;

/// Default agent port for TRAP.
pub const DEFAULT_TRAP_PORT: u16 = 162;
