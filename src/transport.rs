//! Agent address parsing and connected sockets across UDP, TCP, and UNIX-domain
//! transports.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs, UdpSocket};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Udp,
    Tcp,
    Unix,
}

/// A socket already connected to its single peer. UDP uses `connect()` so a later
/// `send`/`recv` pair always talks to that peer; TCP and UNIX are already
/// connection-oriented and additionally frame each message with a 2-byte big-endian
/// length prefix.
pub enum ConnectedSocket {
    Udp(UdpSocket),
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ConnectedSocket {
    pub fn kind(&self) -> TransportKind {
        match self {
            ConnectedSocket::Udp(_) => TransportKind::Udp,
            ConnectedSocket::Tcp(_) => TransportKind::Tcp,
            #[cfg(unix)]
            ConnectedSocket::Unix(_) => TransportKind::Unix,
        }
    }

    pub fn set_timeout(&self, timeout: Duration) -> ClientResult<()> {
        match self {
            ConnectedSocket::Udp(s) => {
                s.set_read_timeout(Some(timeout))?;
                s.set_write_timeout(Some(timeout))?;
            }
            ConnectedSocket::Tcp(s) => {
                s.set_read_timeout(Some(timeout))?;
                s.set_write_timeout(Some(timeout))?;
            }
            #[cfg(unix)]
            ConnectedSocket::Unix(s) => {
                s.set_read_timeout(Some(timeout))?;
                s.set_write_timeout(Some(timeout))?;
            }
        }
        Ok(())
    }

    /// Send one BER message, framing it with a length prefix on stream transports.
    pub fn send_message(&mut self, bytes: &[u8]) -> ClientResult<()> {
        match self {
            ConnectedSocket::Udp(s) => {
                s.send(bytes)?;
            }
            ConnectedSocket::Tcp(s) => write_framed(s, bytes)?,
            #[cfg(unix)]
            ConnectedSocket::Unix(s) => write_framed(s, bytes)?,
        }
        Ok(())
    }

    /// Receive one BER message, stripping the length prefix on stream transports.
    pub fn recv_message(&mut self) -> ClientResult<Vec<u8>> {
        match self {
            ConnectedSocket::Udp(s) => {
                let mut buf = vec![0u8; 65535];
                let len = s.recv(&mut buf)?;
                buf.truncate(len);
                Ok(buf)
            }
            ConnectedSocket::Tcp(s) => read_framed(s),
            #[cfg(unix)]
            ConnectedSocket::Unix(s) => read_framed(s),
        }
    }
}

fn write_framed(stream: &mut impl Write, bytes: &[u8]) -> ClientResult<()> {
    let len = u16::try_from(bytes.len())
        .map_err(|_| ClientError::ArgumentError("message too large for 2-byte length prefix".to_string()))?;
    stream.write_all(&len.to_be_bytes())?;
    stream.write_all(bytes)?;
    Ok(())
}

fn read_framed(stream: &mut impl Read) -> ClientResult<Vec<u8>> {
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf)?;
    let len = u16::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}

struct ParsedSpec<'a> {
    kind: TransportKind,
    prefer_v6: bool,
    host_port: &'a str,
}

fn split_prefix(spec: &str) -> ParsedSpec<'_> {
    const PREFIXES: &[(&str, TransportKind, bool)] = &[
        ("udp6:", TransportKind::Udp, true),
        ("udpv6:", TransportKind::Udp, true),
        ("udpipv6:", TransportKind::Udp, true),
        ("tcp6:", TransportKind::Tcp, true),
        ("tcpv6:", TransportKind::Tcp, true),
        ("tcpipv6:", TransportKind::Tcp, true),
        ("udp:", TransportKind::Udp, false),
        ("tcp:", TransportKind::Tcp, false),
    ];
    for &(prefix, kind, v6) in PREFIXES {
        if let Some(rest) = spec.strip_prefix(prefix) {
            return ParsedSpec {
                kind,
                prefer_v6: v6,
                host_port: rest,
            };
        }
    }
    ParsedSpec {
        kind: TransportKind::Udp,
        prefer_v6: false,
        host_port: spec,
    }
}

/// Split `host[:port]` or the IPv6 bracket form `[addr]:port` into a host and optional
/// port. A bare IPv6 literal with no brackets and no port is also accepted.
fn split_host_port(s: &str) -> ClientResult<(String, Option<u16>)> {
    if let Some(rest) = s.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| ClientError::AddressParseError {
                spec: s.to_string(),
                reason: "unterminated '[' in IPv6 address".to_string(),
            })?;
        let host = &rest[..end];
        let after = &rest[end + 1..];
        let port = match after.strip_prefix(':') {
            Some(p) => Some(p.parse::<u16>().map_err(|e| ClientError::AddressParseError {
                spec: s.to_string(),
                reason: format!("invalid port {p:?}: {e}"),
            })?),
            None if after.is_empty() => None,
            None => {
                return Err(ClientError::AddressParseError {
                    spec: s.to_string(),
                    reason: "expected ':' after ']'".to_string(),
                })
            }
        };
        return Ok((host.to_string(), port));
    }

    // Bare IPv6 literal (more than one colon, no brackets): no port possible.
    if s.matches(':').count() > 1 {
        return Ok((s.to_string(), None));
    }

    match s.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|e| ClientError::AddressParseError {
                spec: s.to_string(),
                reason: format!("invalid port {port:?}: {e}"),
            })?;
            Ok((host.to_string(), Some(port)))
        }
        None => Ok((s.to_string(), None)),
    }
}

/// Parse an agent address spec (`host[:port]`, `udp:`/`tcp:`/`udp6:`/`tcp6:`/`unix:`
/// prefixed) and return a connected socket. `default_port` is used when `spec` doesn't
/// carry one (161 for GET/WALK, 162 for TRAP).
pub fn parse_address(spec: &str, default_port: u16) -> ClientResult<ConnectedSocket> {
    if let Some(path) = spec.strip_prefix("unix:") {
        return connect_unix(spec, path);
    }

    let parsed = split_prefix(spec);
    let (host, port) = split_host_port(parsed.host_port)?;
    if host.is_empty() {
        return Err(ClientError::AddressParseError {
            spec: spec.to_string(),
            reason: "empty host".to_string(),
        });
    }
    let port = port.unwrap_or(default_port);

    let candidates = resolve(spec, &host, port)?;
    let candidates: Vec<_> = if parsed.prefer_v6 {
        candidates.into_iter().filter(|a| a.is_ipv6()).collect()
    } else {
        candidates
    };
    if candidates.is_empty() {
        return Err(ClientError::ResolveError {
            host: host.clone(),
            reason: "no matching address family".to_string(),
        });
    }

    match parsed.kind {
        TransportKind::Udp => connect_udp(spec, &candidates),
        TransportKind::Tcp => connect_tcp(spec, &candidates),
        TransportKind::Unix => unreachable!("unix: handled above"),
    }
}

fn resolve(spec: &str, host: &str, port: u16) -> ClientResult<Vec<std::net::SocketAddr>> {
    (host, port)
        .to_socket_addrs()
        .map(|it| it.collect())
        .map_err(|e| ClientError::ResolveError {
            host: format!("{host} (from {spec:?})"),
            reason: e.to_string(),
        })
}

fn connect_udp(spec: &str, candidates: &[std::net::SocketAddr]) -> ClientResult<ConnectedSocket> {
    let mut last_err = None;
    for addr in candidates {
        let bind_addr = if addr.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        match UdpSocket::bind(bind_addr).and_then(|s| s.connect(addr).map(|_| s)) {
            Ok(socket) => return Ok(ConnectedSocket::Udp(socket)),
            Err(e) => last_err = Some(e),
        }
    }
    Err(ClientError::ConnectError {
        addr: spec.to_string(),
        reason: last_err.map(|e| e.to_string()).unwrap_or_else(|| "no candidates".to_string()),
    })
}

fn connect_tcp(spec: &str, candidates: &[std::net::SocketAddr]) -> ClientResult<ConnectedSocket> {
    let mut last_err = None;
    for addr in candidates {
        match TcpStream::connect(addr) {
            Ok(stream) => return Ok(ConnectedSocket::Tcp(stream)),
            Err(e) => last_err = Some(e),
        }
    }
    Err(ClientError::ConnectError {
        addr: spec.to_string(),
        reason: last_err.map(|e| e.to_string()).unwrap_or_else(|| "no candidates".to_string()),
    })
}

#[cfg(unix)]
fn connect_unix(spec: &str, path: &str) -> ClientResult<ConnectedSocket> {
    if path.is_empty() {
        return Err(ClientError::AddressParseError {
            spec: spec.to_string(),
            reason: "empty UNIX socket path".to_string(),
        });
    }
    UnixStream::connect(path)
        .map(ConnectedSocket::Unix)
        .map_err(|e| ClientError::ConnectError {
            addr: spec.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(not(unix))]
fn connect_unix(spec: &str, _path: &str) -> ClientResult<ConnectedSocket> {
    Err(ClientError::ConnectError {
        addr: spec.to_string(),
        reason: "UNIX-domain sockets are not supported on this platform".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_host_defaults_to_udp_and_default_port() {
        let parsed = split_prefix("127.0.0.1");
        assert_eq!(parsed.kind, TransportKind::Udp);
        assert!(!parsed.prefer_v6);
        assert_eq!(parsed.host_port, "127.0.0.1");
    }

    #[test]
    fn udp_prefix_is_recognized() {
        let parsed = split_prefix("udp:127.0.0.1:1161");
        assert_eq!(parsed.kind, TransportKind::Udp);
        assert_eq!(parsed.host_port, "127.0.0.1:1161");
    }

    #[test]
    fn tcp6_alias_prefers_v6() {
        let parsed = split_prefix("tcpipv6:::1:1161");
        assert_eq!(parsed.kind, TransportKind::Tcp);
        assert!(parsed.prefer_v6);
    }

    #[test]
    fn split_host_port_plain() {
        let (host, port) = split_host_port("127.0.0.1:1161").unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, Some(1161));
    }

    #[test]
    fn split_host_port_no_port() {
        let (host, port) = split_host_port("127.0.0.1").unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, None);
    }

    #[test]
    fn split_host_port_bracket_form() {
        let (host, port) = split_host_port("[::1]:1161").unwrap();
        assert_eq!(host, "::1");
        assert_eq!(port, Some(1161));
    }

    #[test]
    fn connect_udp_to_loopback_succeeds() {
        let socket = parse_address("udp:127.0.0.1:1161", 161).unwrap();
        assert_eq!(socket.kind(), TransportKind::Udp);
    }

    #[test]
    fn unix_with_empty_path_is_argument_error() {
        let err = parse_address("unix:", 161).unwrap_err();
        assert!(matches!(err, ClientError::AddressParseError { .. }));
    }
}
