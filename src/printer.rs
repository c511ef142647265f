//! Varbind rendering: hint-aware OCTET STRING formatting, OID-mode-aware names, and
//! enumeration labels from MIB textual conventions — the DISPLAY-HINT-driven renderer
//! net-snmp-style tools use.

use crate::ber::{Element, Exception};
use crate::mib::MibSource;
use crate::oid::{Oid, OidMode};

/// How to render an OCTET STRING that carries no usable DISPLAY-HINT (or when the hint
/// is disabled via `-OQ`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringMode {
    /// Printable ASCII if every byte qualifies, hex dump otherwise.
    Default,
    Ascii,
    Hex,
}

pub struct PrintOptions {
    pub print_equals: bool,
    pub varbind_only: bool,
    pub hint: bool,
    pub oid_mode: OidMode,
    pub string_mode: StringMode,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            print_equals: true,
            varbind_only: false,
            hint: true,
            oid_mode: OidMode::Short,
            string_mode: StringMode::Default,
        }
    }
}

/// Render one varbind as a line of output.
pub fn format_varbind(oid: &Oid, value: &Element, opts: &PrintOptions, mib: &dyn MibSource) -> String {
    let value_str = format_value(oid, value, opts, mib);

    if opts.varbind_only {
        return value_str;
    }
    let oid_str = oid.format(opts.oid_mode, mib);
    if opts.print_equals {
        format!("{oid_str} = {value_str}")
    } else {
        format!("{oid_str} {value_str}")
    }
}

fn format_value(oid: &Oid, value: &Element, opts: &PrintOptions, mib: &dyn MibSource) -> String {
    if let Some(exception) = value.as_exception() {
        return match exception {
            Exception::NoSuchObject => "No Such Object available on this agent at this OID".to_string(),
            Exception::NoSuchInstance => "No Such Instance currently exists at this OID".to_string(),
            Exception::EndOfMibView => "No More Variables left in this MIB View".to_string(),
        };
    }

    use crate::ber::tag;
    let t = &value.tag;
    if t.class == tag::Class::Universal {
        match t.number {
            tag::UNIV_NULL => return "NULL".to_string(),
            tag::UNIV_INTEGER => {
                let n = value.as_integer().unwrap_or_default();
                if opts.hint {
                    if let Some(label) = enum_label(oid, n, mib) {
                        return format!("INTEGER: {label}({n})");
                    }
                }
                return format!("INTEGER: {n}");
            }
            tag::UNIV_OCTET_STRING => {
                let bytes = value.as_octet_string().unwrap_or_default();
                return format_octet_string(oid, bytes, opts, mib);
            }
            tag::UNIV_OID => {
                let inner = value.as_oid().unwrap_or_else(|_| oid.clone());
                return format!("OID: {}", inner.format(opts.oid_mode, mib));
            }
            _ => {}
        }
    }
    if t.class == tag::Class::Application {
        match t.number {
            tag::APP_IP_ADDRESS => {
                let octets = value.as_ip_address().unwrap_or([0, 0, 0, 0]);
                return format!(
                    "IpAddress: {}.{}.{}.{}",
                    octets[0], octets[1], octets[2], octets[3]
                );
            }
            tag::APP_COUNTER32 => return format!("Counter32: {}", value.as_unsigned().unwrap_or_default()),
            tag::APP_GAUGE32 => return format!("Gauge32: {}", value.as_unsigned().unwrap_or_default()),
            tag::APP_COUNTER64 => return format!("Counter64: {}", value.as_unsigned().unwrap_or_default()),
            tag::APP_TIMETICKS => {
                let ticks = value.as_unsigned().unwrap_or_default();
                return if opts.hint {
                    format!("Timeticks: {}", format_timeticks(ticks))
                } else {
                    format!("Timeticks: {ticks}")
                };
            }
            tag::APP_OPAQUE => {
                let bytes = value.as_octet_string().unwrap_or_default();
                return format!("Opaque: {}", hex::encode_upper(bytes));
            }
            _ => {}
        }
    }

    format!("{:?}", value.body)
}

/// `(N) d:hh:mm:ss.cc`, the net-snmp rendering of TIMETICKS.
fn format_timeticks(ticks: u64) -> String {
    let centiseconds = ticks % 100;
    let total_seconds = ticks / 100;
    let days = total_seconds / 86400;
    let hours = (total_seconds % 86400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("({ticks}) {days}:{hours:02}:{minutes:02}:{seconds:02}.{centiseconds:02}")
}

fn enum_label(oid: &Oid, value: i64, mib: &dyn MibSource) -> Option<String> {
    let (_, node) = mib.longest_prefix(oid)?;
    let tc = node.textual_convention.as_deref()?;
    for entry in tc.split(',') {
        let (num, label) = entry.split_once('=')?;
        if num.trim().parse::<i64>().ok()? == value {
            return Some(label.trim().to_string());
        }
    }
    None
}

fn format_octet_string(oid: &Oid, bytes: &[u8], opts: &PrintOptions, mib: &dyn MibSource) -> String {
    if opts.hint {
        if let Some(hint) = mib.hint_for(oid) {
            if let Some(rendered) = apply_display_hint(hint, bytes) {
                return rendered;
            }
        }
    }

    match opts.string_mode {
        StringMode::Ascii => format!("STRING: \"{}\"", ascii_lossy(bytes)),
        StringMode::Hex => format!("Hex-STRING: {}", hex_spaced(bytes)),
        StringMode::Default => {
            if bytes.iter().all(|&b| (0x20..0x7F).contains(&b) || b == b'\t') {
                format!("STRING: \"{}\"", ascii_lossy(bytes))
            } else {
                format!("Hex-STRING: {}", hex_spaced(bytes))
            }
        }
    }
}

/// DISPLAY-HINT interpreter: `1x:` (hex, colon-separated, repeated per byte — the MAC
/// address case), `d-N` (decimal, scaled by 10^-N), `a` (ASCII), `o` (octal), `x` (hex,
/// no separator), `t` (UTC timestamp octets per RFC 2579 §2).
fn apply_display_hint(hint: &str, bytes: &[u8]) -> Option<String> {
    if hint == "1x:" {
        return Some(format!("STRING: {}", hex_colon(bytes)));
    }
    if hint == "ticks" {
        return None; // handled by the TIMETICKS application-tag path, not OCTET STRING
    }
    if let Some(rest) = hint.strip_prefix("d-") {
        let scale: u32 = rest.trim_end_matches('a').parse().ok()?;
        return Some(format!("STRING: {}", decimal_scaled(bytes, scale)));
    }
    match hint {
        "a" => Some(format!("STRING: \"{}\"", ascii_lossy(bytes))),
        "x" => Some(format!("Hex-STRING: {}", hex_spaced(bytes))),
        "o" => Some(format!("STRING: {}", octal(bytes))),
        "t" => utc_timestamp(bytes).map(|s| format!("STRING: {s}")),
        "255a" => Some(format!("STRING: \"{}\"", ascii_lossy(bytes))),
        _ => None,
    }
}

fn ascii_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn hex_spaced(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ")
}

fn hex_colon(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(":")
}

fn octal(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:03o}")).collect::<Vec<_>>().join(" ")
}

fn decimal_scaled(bytes: &[u8], scale: u32) -> String {
    let mut value: i64 = 0;
    for &b in bytes {
        value = (value << 8) | b as i64;
    }
    if scale == 0 {
        return value.to_string();
    }
    let divisor = 10i64.pow(scale);
    format!("{}.{:0width$}", value / divisor, (value % divisor).abs(), width = scale as usize)
}

/// RFC 2579 §2 DateAndTime: `year(2) year(2) month day hour minute second deci-second
/// [direction hours minutes]`.
fn utc_timestamp(bytes: &[u8]) -> Option<String> {
    if bytes.len() != 8 && bytes.len() != 11 {
        return None;
    }
    let year = u16::from_be_bytes([bytes[0], bytes[1]]);
    let (month, day, hour, minute, second, deci) = (bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]);
    Some(format!(
        "{year}-{month:02}-{day:02},{hour:02}:{minute:02}:{second:02}.{deci}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mib::builtin::builtin_mib;

    fn oid(s: &str) -> Oid {
        Oid::new(s.split('.').map(|n| n.parse().unwrap()).collect()).unwrap()
    }

    #[test]
    fn formats_octet_string_as_quoted_ascii_by_default() {
        let mib = builtin_mib();
        let o = oid("1.3.6.1.2.1.1.6.0"); // sysLocation, no special hint beyond 255a
        let el = Element::octet_string(b"datacenter-1".to_vec());
        let opts = PrintOptions::default();
        let s = format_varbind(&o, &el, &opts, &mib);
        assert!(s.contains("STRING: \"datacenter-1\""));
    }

    #[test]
    fn mac_address_hint_renders_colon_separated_hex() {
        let mib = builtin_mib();
        let o = oid("1.3.6.1.2.1.2.2.1.6.1"); // ifPhysAddress.1
        let el = Element::octet_string(vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let opts = PrintOptions::default();
        let s = format_varbind(&o, &el, &opts, &mib);
        assert!(s.contains("00:11:22:33:44:55"), "got {s}");
    }

    #[test]
    fn timeticks_renders_days_hms_centiseconds() {
        let el = Element::timeticks(12345678);
        let opts = PrintOptions::default();
        let o = oid("1.3.6.1.2.1.1.3.0");
        let mib = builtin_mib();
        let s = format_varbind(&o, &el, &opts, &mib);
        assert!(s.contains("Timeticks: (12345678)"), "got {s}");
    }

    #[test]
    fn enum_textual_convention_renders_label() {
        let mib = builtin_mib();
        let o = oid("1.3.6.1.2.1.2.2.1.8.1"); // ifOperStatus.1
        let el = Element::integer(1);
        let opts = PrintOptions::default();
        let s = format_varbind(&o, &el, &opts, &mib);
        assert!(s.contains("up(1)"), "got {s}");
    }

    #[test]
    fn exception_markers_render_placeholder_text() {
        let mib = builtin_mib();
        let o = oid("1.3.6.1.2.1.1.1.0");
        let el = Element::exception(Exception::EndOfMibView);
        let opts = PrintOptions::default();
        let s = format_varbind(&o, &el, &opts, &mib);
        assert!(s.contains("No More Variables"));
    }

    #[test]
    fn varbind_only_suppresses_oid_and_equals() {
        let mib = builtin_mib();
        let o = oid("1.3.6.1.2.1.1.1.0");
        let el = Element::integer(42);
        let mut opts = PrintOptions::default();
        opts.varbind_only = true;
        let s = format_varbind(&o, &el, &opts, &mib);
        assert_eq!(s, "INTEGER: 42");
    }
}
