//! Object Identifier type: construction, comparison, and string <-> numeric translation.

use std::fmt;

use crate::error::{ClientError, ClientResult};
use crate::mib::MibSource;

/// How an [`Oid`] should be rendered by the printer and by `oid mibtree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidMode {
    /// Dot-separated sub-identifiers, e.g. `1.3.6.1.2.1.1.1.0`.
    Numeric,
    /// Shortest unambiguous symbolic prefix plus any numeric suffix, e.g.
    /// `SNMPv2-MIB::sysDescr.0`. This is also the default when no `-O` flag is given.
    Short,
    /// Complete symbolic path from the MIB root, e.g. `iso.org.dod.internet.mgmt.mib-2.system.sysDescr.0`.
    Full,
}

/// Result of comparing two OIDs lexicographically, extended with the ancestor/descendant
/// relationship the walk engine (§4.7) depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidOrdering {
    /// `a < b` and `a` is not a prefix of `b`.
    Less,
    /// `a == b`.
    Equal,
    /// `a > b` and `b` is not a prefix of `a`.
    Greater,
    /// `a` is a strict prefix of `b` (`b` lies under the subtree rooted at `a`).
    Descendant,
    /// `b` is a strict prefix of `a`.
    Ancestor,
}

impl OidOrdering {
    /// The `-1 | 0 | 1 | 2 | -2` integer encoding of this ordering, used when printing debug traces.
    pub fn as_i8(self) -> i8 {
        match self {
            OidOrdering::Less => -1,
            OidOrdering::Equal => 0,
            OidOrdering::Greater => 1,
            OidOrdering::Descendant => 2,
            OidOrdering::Ancestor => -2,
        }
    }

    /// `compare(a, b) == -compare(b, a)`, with `Descendant` <-> `Ancestor`.
    pub fn reversed(self) -> OidOrdering {
        match self {
            OidOrdering::Less => OidOrdering::Greater,
            OidOrdering::Greater => OidOrdering::Less,
            OidOrdering::Equal => OidOrdering::Equal,
            OidOrdering::Descendant => OidOrdering::Ancestor,
            OidOrdering::Ancestor => OidOrdering::Descendant,
        }
    }
}

/// An ordered sequence of 1..128 non-negative 32-bit sub-identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    /// Build an `Oid` from sub-identifiers, validating its length.
    pub fn new(sub_ids: Vec<u32>) -> ClientResult<Self> {
        if sub_ids.is_empty() || sub_ids.len() > 128 {
            return Err(ClientError::ArgumentError(format!(
                "OID must have 1..128 sub-identifiers, got {}",
                sub_ids.len()
            )));
        }
        Ok(Oid(sub_ids))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append sub-identifiers, producing a new descendant OID (e.g. appending an
    /// instance index to a column OID).
    pub fn child(&self, suffix: &[u32]) -> ClientResult<Oid> {
        let mut v = self.0.clone();
        v.extend_from_slice(suffix);
        Oid::new(v)
    }

    /// Parse pure-numeric (`1.3.6.1.2.1`), fully symbolic (`system.sysDescr.0`), or mixed
    /// (`sysDescr.0`) text, resolving symbolic segments via `mib`. A leading `.` is
    /// permitted and ignored.
    pub fn parse(s: &str, mib: &dyn MibSource) -> ClientResult<Oid> {
        let s = s.strip_prefix('.').unwrap_or(s);
        if s.is_empty() {
            return Err(ClientError::ArgumentError("empty OID".to_string()));
        }

        // Fast path: every segment is numeric.
        if s.split('.').all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit())) {
            let sub_ids: Result<Vec<u32>, _> =
                s.split('.').map(|seg| seg.parse::<u32>()).collect();
            let sub_ids = sub_ids.map_err(|e| {
                ClientError::ArgumentError(format!("invalid sub-identifier in {s:?}: {e}"))
            })?;
            return Oid::new(sub_ids);
        }

        // Symbolic or mixed: the first segment names a MIB node, any remaining segments
        // are numeric instance indices appended to it.
        let mut segments = s.split('.');
        let first = segments.next().unwrap();
        let base = mib
            .lookup_name(first)
            .ok_or_else(|| ClientError::UnknownName(first.to_string()))?;

        let mut sub_ids = base.as_slice().to_vec();
        for seg in segments {
            let n: u32 = seg
                .parse()
                .map_err(|_| ClientError::UnknownName(format!("{first}.{seg}")))?;
            sub_ids.push(n);
        }
        Oid::new(sub_ids)
    }

    /// Render per `mode`, consulting `mib` for symbolic forms.
    pub fn format(&self, mode: OidMode, mib: &dyn MibSource) -> String {
        match mode {
            OidMode::Numeric => self.numeric_string(),
            OidMode::Short => self.module_qualified_string(mib),
            OidMode::Full => self.full_ancestor_string(mib),
        }
    }

    pub fn numeric_string(&self) -> String {
        self.0
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The shortest unambiguous symbolic form: `MODULE::name` for the longest
    /// registered prefix, plus any numeric instance suffix (e.g.
    /// `SNMPv2-MIB::sysDescr.0`). A bare leaf name can collide across MIB modules;
    /// qualifying it with the module is what makes this "unambiguous".
    fn module_qualified_string(&self, mib: &dyn MibSource) -> String {
        match mib.longest_prefix(self) {
            Some((prefix_oid, node)) => {
                let suffix = &self.0[prefix_oid.len()..];
                if suffix.is_empty() {
                    node.full_path.clone()
                } else {
                    let tail = suffix
                        .iter()
                        .map(|n| n.to_string())
                        .collect::<Vec<_>>()
                        .join(".");
                    format!("{}.{tail}", node.full_path)
                }
            }
            None => self.numeric_string(),
        }
    }

    /// The complete symbolic path from the MIB root, e.g.
    /// `iso.org.dod.internet.mgmt.mib-2.system.sysDescr.0`. Each sub-identifier that
    /// has a registered node along the way is rendered by name; any trailing
    /// sub-identifiers with no node (instance indices, or an unregistered subtree)
    /// fall back to their numeric form.
    fn full_ancestor_string(&self, mib: &dyn MibSource) -> String {
        let mut segments = Vec::with_capacity(self.0.len());
        for depth in 1..=self.0.len() {
            let prefix = Oid::from(&self.0[..depth]);
            match mib.lookup_oid(&prefix) {
                Some(node) => segments.push(node.name.clone()),
                None => segments.push(self.0[depth - 1].to_string()),
            }
        }
        segments.join(".")
    }

    /// The five-way comparison the walk engine relies on to detect subtree membership.
    pub fn compare(&self, other: &Oid) -> OidOrdering {
        let a = &self.0;
        let b = &other.0;
        let common = a.len().min(b.len());

        for i in 0..common {
            if a[i] != b[i] {
                return if a[i] < b[i] {
                    OidOrdering::Less
                } else {
                    OidOrdering::Greater
                };
            }
        }

        match a.len().cmp(&b.len()) {
            std::cmp::Ordering::Equal => OidOrdering::Equal,
            std::cmp::Ordering::Less => OidOrdering::Descendant,
            std::cmp::Ordering::Greater => OidOrdering::Ancestor,
        }
    }

    /// `true` if `self` is `other`, or a strict ancestor of it (`other` lies under the
    /// subtree rooted at `self`).
    pub fn is_prefix_of(&self, other: &Oid) -> bool {
        matches!(self.compare(other), OidOrdering::Equal | OidOrdering::Descendant)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.numeric_string())
    }
}

impl From<&[u32]> for Oid {
    fn from(v: &[u32]) -> Self {
        Oid(v.to_vec())
    }
}

impl From<Vec<u32>> for Oid {
    fn from(v: Vec<u32>) -> Self {
        Oid(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mib::builtin::builtin_mib;

    fn oid(v: &[u32]) -> Oid {
        Oid::new(v.to_vec()).unwrap()
    }

    #[test]
    fn compare_equal() {
        assert_eq!(oid(&[1, 3, 6]).compare(&oid(&[1, 3, 6])), OidOrdering::Equal);
    }

    #[test]
    fn compare_is_anti_symmetric() {
        let a = oid(&[1, 3, 6, 1]);
        let b = oid(&[1, 3, 6, 2]);
        assert_eq!(a.compare(&b).as_i8(), -b.compare(&a).as_i8());
    }

    #[test]
    fn compare_descendant_and_ancestor() {
        let a = oid(&[1, 3, 6]);
        let b = oid(&[1, 3, 6, 1, 0]);
        assert_eq!(a.compare(&b), OidOrdering::Descendant);
        assert_eq!(b.compare(&a), OidOrdering::Ancestor);
    }

    #[test]
    fn compare_shorter_prefix_is_less_only_when_not_a_prefix() {
        let a = oid(&[1, 3, 6, 2]);
        let b = oid(&[1, 3, 6, 1, 0]);
        // a is not a prefix of b (diverges at index 3), so ordinary less-than applies.
        assert_eq!(a.compare(&b), OidOrdering::Greater);
    }

    #[test]
    fn parse_numeric_with_leading_dot() {
        let mib = builtin_mib();
        let o = Oid::parse(".1.3.6.1.2.1.1.1.0", &mib).unwrap();
        assert_eq!(o.as_slice(), &[1, 3, 6, 1, 2, 1, 1, 1, 0]);
    }

    #[test]
    fn parse_symbolic_with_instance_suffix() {
        let mib = builtin_mib();
        let o = Oid::parse("sysDescr.0", &mib).unwrap();
        assert_eq!(o.as_slice(), &[1, 3, 6, 1, 2, 1, 1, 1, 0]);
    }

    #[test]
    fn parse_fully_symbolic() {
        let mib = builtin_mib();
        let o = Oid::parse("system.sysDescr.0", &mib).unwrap();
        assert_eq!(o.as_slice(), &[1, 3, 6, 1, 2, 1, 1, 1, 0]);
    }

    #[test]
    fn parse_unknown_symbol_fails() {
        let mib = builtin_mib();
        let err = Oid::parse("notAThing.0", &mib).unwrap_err();
        assert!(matches!(err, ClientError::UnknownName(_)));
    }

    #[test]
    fn short_mode_is_module_qualified_by_default() {
        // The default render (no -O flag, i.e. Short) is module-qualified, not a
        // bare leaf name.
        let mib = builtin_mib();
        let o = Oid::parse("sysDescr.0", &mib).unwrap();
        assert_eq!(o.format(OidMode::Short, &mib), "SNMPv2-MIB::sysDescr.0");
    }

    #[test]
    fn full_mode_walks_every_ancestor_from_the_root() {
        let mib = builtin_mib();
        let o = Oid::parse("sysDescr.0", &mib).unwrap();
        assert_eq!(
            o.format(OidMode::Full, &mib),
            "iso.org.dod.internet.mgmt.mib-2.system.sysDescr.0"
        );
    }

    #[test]
    fn parse_then_format_numeric_round_trips() {
        let mib = builtin_mib();
        let o = Oid::parse("1.3.6.1.2.1.1.1.0", &mib).unwrap();
        let s = o.format(OidMode::Numeric, &mib);
        let back = Oid::parse(&s, &mib).unwrap();
        assert_eq!(o, back);
    }
}
