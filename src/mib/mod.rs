//! MIB symbol table: name <-> OID resolution, longest-prefix lookup, and per-node
//! display hints. A small built-in MIB-II table ([`builtin::builtin_mib`]) is always
//! available; a full external `.mib`/`.txt` file loader is out of scope, and would
//! implement [`MibSource`] the same way [`MibTree`] does.

pub mod builtin;

use std::collections::BTreeMap;

use crate::oid::Oid;

/// A single resolved MIB object: its canonical OID, short and fully-qualified names,
/// and any rendering metadata the printer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MibNode {
    pub oid: Oid,
    pub name: String,
    pub full_path: String,
    pub display_hint: Option<String>,
    pub textual_convention: Option<String>,
}

/// Read-only interface to a symbol table, so a full external MIB-file loader can be
/// substituted for [`MibTree`] without the OID module, walk engine, or printer caring
/// which is backing them.
pub trait MibSource {
    /// Exact-match lookup.
    fn lookup_oid(&self, oid: &Oid) -> Option<&MibNode>;

    /// Resolve a bare symbolic name (e.g. `sysDescr`) to its OID.
    fn lookup_name(&self, name: &str) -> Option<Oid>;

    /// The node whose OID is the longest prefix of `oid`, along with that prefix.
    fn longest_prefix(&self, oid: &Oid) -> Option<(Oid, &MibNode)>;

    /// In-order traversal of every registered node (used by `snmp mibtree`).
    fn iter(&self) -> Box<dyn Iterator<Item = &MibNode> + '_>;

    /// DISPLAY-HINT string for the object that owns `oid`, if any.
    fn hint_for(&self, oid: &Oid) -> Option<&str> {
        self.longest_prefix(oid)
            .and_then(|(_, node)| node.display_hint.as_deref())
    }
}

#[derive(Debug, Default)]
struct TreeNode {
    children: BTreeMap<u32, TreeNode>,
    data: Option<MibNode>,
}

/// Prefix tree keyed by sub-identifier: O(depth) longest-prefix match, and an in-order
/// traversal that visits nodes in the same order as a numeric OID sort.
#[derive(Debug, Default)]
pub struct MibTree {
    root: TreeNode,
    by_name: BTreeMap<String, Oid>,
}

impl MibTree {
    pub fn new() -> Self {
        MibTree::default()
    }

    /// Register a node. Later registrations at the same OID overwrite earlier ones.
    pub fn insert(&mut self, node: MibNode) {
        let mut cursor = &mut self.root;
        for &sub_id in node.oid.as_slice() {
            cursor = cursor.children.entry(sub_id).or_default();
        }
        self.by_name.insert(node.name.clone(), node.oid.clone());
        cursor.data = Some(node);
    }

    fn find(&self, oid: &Oid) -> Option<&TreeNode> {
        let mut cursor = &self.root;
        for &sub_id in oid.as_slice() {
            cursor = cursor.children.get(&sub_id)?;
        }
        Some(cursor)
    }

    fn collect_in_order<'a>(node: &'a TreeNode, out: &mut Vec<&'a MibNode>) {
        if let Some(data) = &node.data {
            out.push(data);
        }
        for child in node.children.values() {
            Self::collect_in_order(child, out);
        }
    }
}

impl MibSource for MibTree {
    fn lookup_oid(&self, oid: &Oid) -> Option<&MibNode> {
        self.find(oid).and_then(|n| n.data.as_ref())
    }

    fn lookup_name(&self, name: &str) -> Option<Oid> {
        self.by_name.get(name).cloned()
    }

    fn longest_prefix(&self, oid: &Oid) -> Option<(Oid, &MibNode)> {
        let mut cursor = &self.root;
        let mut best: Option<(usize, &MibNode)> = None;

        if let Some(data) = &cursor.data {
            best = Some((0, data));
        }
        for (depth, &sub_id) in oid.as_slice().iter().enumerate() {
            cursor = match cursor.children.get(&sub_id) {
                Some(c) => c,
                None => break,
            };
            if let Some(data) = &cursor.data {
                best = Some((depth + 1, data));
            }
        }

        best.map(|(depth, data)| (Oid::from(&oid.as_slice()[..depth]), data))
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &MibNode> + '_> {
        let mut out = Vec::new();
        Self::collect_in_order(&self.root, &mut out);
        Box::new(out.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mib::builtin::builtin_mib;

    #[test]
    fn exact_lookup_by_oid() {
        let mib = builtin_mib();
        let oid = Oid::new(vec![1, 3, 6, 1, 2, 1, 1, 1]).unwrap();
        let node = mib.lookup_oid(&oid).expect("sysDescr registered");
        assert_eq!(node.name, "sysDescr");
    }

    #[test]
    fn longest_prefix_finds_instance_parent() {
        let mib = builtin_mib();
        let instance = Oid::new(vec![1, 3, 6, 1, 2, 1, 1, 1, 0]).unwrap();
        let (prefix, node) = mib.longest_prefix(&instance).expect("prefix found");
        assert_eq!(node.name, "sysDescr");
        assert_eq!(prefix.as_slice(), &[1, 3, 6, 1, 2, 1, 1, 1]);
    }

    #[test]
    fn longest_prefix_none_outside_tree() {
        let mib = builtin_mib();
        let oid = Oid::new(vec![2, 1, 1]).unwrap();
        assert!(mib.longest_prefix(&oid).is_none());
    }

    #[test]
    fn in_order_traversal_is_numerically_sorted() {
        let mib = builtin_mib();
        let nodes: Vec<_> = mib.iter().collect();
        for pair in nodes.windows(2) {
            assert!(pair[0].oid.compare(&pair[1].oid).as_i8() < 0);
        }
    }
}
