//! Request/response plumbing on top of [`crate::transport`]: request-id allocation,
//! the retransmit loop, and response matching.

use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::pdu::{Message, Pdu, SnmpVersion};
use crate::transport::ConnectedSocket;

/// Wraps a connected socket with the bookkeeping an SNMP request/response exchange
/// needs: a monotonic request-id counter, the community string, and timeout/retry
/// policy.
pub struct AgentSession {
    socket: ConnectedSocket,
    version: SnmpVersion,
    community: String,
    timeout: Duration,
    retries: u32,
    next_request_id: i32,
}

impl AgentSession {
    pub fn new(
        socket: ConnectedSocket,
        version: SnmpVersion,
        community: impl Into<String>,
        timeout: Duration,
        retries: u32,
    ) -> Self {
        AgentSession {
            socket,
            version,
            community: community.into(),
            timeout,
            retries,
            next_request_id: 1,
        }
    }

    pub fn version(&self) -> SnmpVersion {
        self.version
    }

    /// Allocate the next request-id, wrapping from `i32::MAX` back to 1 rather than
    /// through zero or negative (request-ids are conventionally positive).
    fn allocate_request_id(&mut self) -> i32 {
        let id = self.next_request_id;
        self.next_request_id = if id == i32::MAX { 1 } else { id + 1 };
        id
    }

    /// Send `pdu` and wait for the matching reply, retrying up to `self.retries` times
    /// on timeout. A reply matches when its request-id, version, and community equal
    /// the request's; anything else (including responses to a long-dead earlier
    /// request) is silently discarded and the wait continues within the same attempt's
    /// deadline.
    pub fn send_receive(&mut self, mut pdu: Pdu) -> ClientResult<Pdu> {
        pdu.request_id = self.allocate_request_id();
        let request = Message {
            version: self.version,
            community: self.community.clone(),
            pdu,
        };
        let encoded = request.encode();

        self.socket.set_timeout(self.timeout)?;

        let mut last_err = None;
        for _attempt in 0..=self.retries {
            self.socket.send_message(&encoded)?;
            match self.await_matching_reply(&request) {
                Ok(pdu) => return Ok(pdu),
                Err(ClientError::Io(e)) if is_timeout(&e) => {
                    last_err = Some(ClientError::Io(e));
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        let _ = last_err;
        Err(ClientError::Timeout { retries: self.retries })
    }

    /// Send a PDU without awaiting a reply (traps and informs that don't need one —
    /// `trap_v2` uses this; unlike `send_receive` there is no retry, since there is
    /// nothing to retry against).
    pub fn send_unconfirmed(&mut self, mut pdu: Pdu) -> ClientResult<()> {
        pdu.request_id = self.allocate_request_id();
        let message = Message {
            version: self.version,
            community: self.community.clone(),
            pdu,
        };
        self.socket.send_message(&message.encode())
    }

    fn await_matching_reply(&mut self, request: &Message) -> ClientResult<Pdu> {
        loop {
            let bytes = self.socket.recv_message()?;
            let reply = match Message::decode(&bytes) {
                Ok(m) => m,
                Err(_) => continue, // garbage on the wire, keep waiting within this attempt
            };
            if reply.version == request.version
                && reply.community == request.community
                && reply.pdu.request_id == request.pdu.request_id
            {
                return Ok(reply.pdu);
            }
        }
    }
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_wraps_past_i32_max() {
        let socket = crate::transport::parse_address("udp:127.0.0.1:1", 161).unwrap();
        let mut session = AgentSession::new(socket, SnmpVersion::V2c, "public", Duration::from_millis(10), 0);
        session.next_request_id = i32::MAX;
        assert_eq!(session.allocate_request_id(), i32::MAX);
        assert_eq!(session.allocate_request_id(), 1);
    }

    #[test]
    fn timeout_is_returned_after_exhausting_retries() {
        // Bind to a port nobody is listening on; the agent never replies.
        let socket = crate::transport::parse_address("udp:127.0.0.1:1", 161).unwrap();
        let mut session = AgentSession::new(socket, SnmpVersion::V2c, "public", Duration::from_millis(20), 1);
        let pdu = Pdu {
            kind: crate::pdu::PduKind::GetRequest,
            request_id: 0,
            error_status: 0,
            error_index: 0,
            varbinds: vec![],
        };
        let err = session.send_receive(pdu).unwrap_err();
        assert!(matches!(err, ClientError::Timeout { retries: 1 }));
    }
}
