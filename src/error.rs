//! Error types for the SNMP protocol core.
//!
//! [`ClientError`] is the typed, match-on-kind error returned by every fallible
//! operation from the BER codec up through the walk engine; the CLI binary maps its
//! variants to exit codes and messages. Boundary glue that doesn't need to be matched
//! on (config file I/O, argument plumbing) uses `anyhow::Result` the way the rest of
//! this lineage's binaries do.

use thiserror::Error;

use crate::oid::Oid;

/// Errors the protocol core can raise.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("argument error: {0}")]
    ArgumentError(String),

    #[error("unknown name: {0}")]
    UnknownName(String),

    #[error("malformed BER at offset {offset}: {reason}")]
    MalformedBer { offset: usize, reason: String },

    #[error("Cannot send V2 PDU on V1 session")]
    VersionError,

    #[error("failed to parse agent address {spec:?}: {reason}")]
    AddressParseError { spec: String, reason: String },

    #[error("failed to resolve {host:?}: {reason}")]
    ResolveError { host: String, reason: String },

    #[error("failed to connect to {addr}: {reason}")]
    ConnectError { addr: String, reason: String },

    #[error("Timeout: no response after {retries} retries")]
    Timeout { retries: u32 },

    #[error("{oid}: {source}")]
    ProtocolError { oid: Oid, source: SnmpError },

    #[error("OID not increasing: {previous} -> {next}")]
    WalkMonotonicityError { previous: Oid, next: Oid },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn malformed_ber(offset: usize, reason: impl Into<String>) -> Self {
        ClientError::MalformedBer {
            offset,
            reason: reason.into(),
        }
    }
}

/// The full SNMP `error-status` set (RFC 1157 §4.1.1, RFC 3416 §3 extensions).
///
/// Each variant renders as a distinct human-readable message; `ClientError::ProtocolError`
/// tags the offending OID separately so callers get both the status and the location.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnmpError {
    #[error("tooBig")]
    TooBig,
    #[error("noSuchName")]
    NoSuchName,
    #[error("badValue")]
    BadValue,
    #[error("readOnly")]
    ReadOnly,
    #[error("genErr")]
    GenErr,
    #[error("noAccess")]
    NoAccess,
    #[error("wrongType")]
    WrongType,
    #[error("wrongLength")]
    WrongLength,
    #[error("wrongEncoding")]
    WrongEncoding,
    #[error("wrongValue")]
    WrongValue,
    #[error("noCreation")]
    NoCreation,
    #[error("inconsistentValue")]
    InconsistentValue,
    #[error("resourceUnavailable")]
    ResourceUnavailable,
    #[error("commitFailed")]
    CommitFailed,
    #[error("undoFailed")]
    UndoFailed,
    #[error("authorizationError")]
    AuthorizationError,
    #[error("notWritable")]
    NotWritable,
    #[error("inconsistentName")]
    InconsistentName,
}

impl SnmpError {
    /// Map a wire `error-status` value to its variant. `None` for `noError` (0) or any
    /// value outside the defined range, since those aren't errors at all.
    pub fn from_status(status: i64) -> Option<Self> {
        use SnmpError::*;
        Some(match status {
            1 => TooBig,
            2 => NoSuchName,
            3 => BadValue,
            4 => ReadOnly,
            5 => GenErr,
            6 => NoAccess,
            7 => WrongType,
            8 => WrongLength,
            9 => WrongEncoding,
            10 => WrongValue,
            11 => NoCreation,
            12 => InconsistentValue,
            13 => ResourceUnavailable,
            14 => CommitFailed,
            15 => UndoFailed,
            16 => AuthorizationError,
            17 => NotWritable,
            18 => InconsistentName,
            _ => return None,
        })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_error_status_maps_to_none() {
        assert_eq!(SnmpError::from_status(0), None);
    }

    #[test]
    fn known_statuses_roundtrip_a_distinct_message() {
        assert_eq!(SnmpError::from_status(2), Some(SnmpError::NoSuchName));
        assert_eq!(format!("{}", SnmpError::NoSuchName), "noSuchName");
        assert_eq!(format!("{}", SnmpError::InconsistentName), "inconsistentName");
    }

    #[test]
    fn out_of_range_status_is_none() {
        assert_eq!(SnmpError::from_status(19), None);
        assert_eq!(SnmpError::from_status(-1), None);
    }
}
