//! Built-in MIB-II symbol table: the system, interfaces, bridge, entity, and LLDP/CDP
//! OID groups as named, DISPLAY-HINTed tree nodes. A full external MIB-file loader is
//! out of scope; this is the fallback that makes `snmp get`/`walk`/`mibtree` useful with
//! zero configuration.

use crate::mib::{MibNode, MibTree};
use crate::oid::Oid;

struct Def {
    oid: &'static [u32],
    name: &'static str,
    module: &'static str,
    hint: Option<&'static str>,
    tc: Option<&'static str>,
}

const DEFS: &[Def] = &[
    // iso.org.dod.internet path, down to mgmt.mib-2 (so Full rendering has a root).
    Def { oid: &[1], name: "iso", module: "iso", hint: None, tc: None },
    Def { oid: &[1, 3], name: "org", module: "org", hint: None, tc: None },
    Def { oid: &[1, 3, 6], name: "dod", module: "dod", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1], name: "internet", module: "internet", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2], name: "mgmt", module: "mgmt", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1], name: "mib-2", module: "mib-2", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 4], name: "private", module: "private", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 4, 1], name: "enterprises", module: "enterprises", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 6], name: "snmpV2", module: "snmpV2", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 6, 3], name: "snmpModules", module: "snmpModules", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 6, 3, 1], name: "snmpMIBObjects", module: "snmpModules", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 6, 3, 1, 1], name: "snmpTrap", module: "snmpModules", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 6, 3, 1, 1, 4], name: "snmpTrapOID", module: "SNMPv2-MIB", hint: None, tc: None },
    Def {
        oid: &[1, 3, 6, 1, 6, 3, 1, 1, 4, 1],
        name: "snmpTrapOID",
        module: "SNMPv2-MIB",
        hint: None,
        tc: None,
    },

    // System group (RFC 1213 / SNMPv2-MIB).
    Def { oid: &[1, 3, 6, 1, 2, 1, 1], name: "system", module: "SNMPv2-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 1, 1], name: "sysDescr", module: "SNMPv2-MIB", hint: Some("255a"), tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 1, 2], name: "sysObjectID", module: "SNMPv2-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 1, 3], name: "sysUpTime", module: "SNMPv2-MIB", hint: Some("ticks"), tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 1, 4], name: "sysContact", module: "SNMPv2-MIB", hint: Some("255a"), tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 1, 5], name: "sysName", module: "SNMPv2-MIB", hint: Some("255a"), tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 1, 6], name: "sysLocation", module: "SNMPv2-MIB", hint: Some("255a"), tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 1, 7], name: "sysServices", module: "SNMPv2-MIB", hint: None, tc: None },

    // Interfaces group (IF-MIB / RFC 1213 ifTable).
    Def { oid: &[1, 3, 6, 1, 2, 1, 2], name: "interfaces", module: "IF-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 2, 1], name: "ifNumber", module: "IF-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 2, 2], name: "ifTable", module: "IF-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1], name: "ifEntry", module: "IF-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1, 1], name: "ifIndex", module: "IF-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2], name: "ifDescr", module: "IF-MIB", hint: Some("255a"), tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1, 3], name: "ifType", module: "IF-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1, 4], name: "ifMtu", module: "IF-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5], name: "ifSpeed", module: "IF-MIB", hint: None, tc: None },
    Def {
        oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1, 6],
        name: "ifPhysAddress",
        module: "IF-MIB",
        hint: Some("1x:"),
        tc: None,
    },
    Def {
        oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1, 7],
        name: "ifAdminStatus",
        module: "IF-MIB",
        hint: None,
        tc: Some("1=up,2=down,3=testing"),
    },
    Def {
        oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8],
        name: "ifOperStatus",
        module: "IF-MIB",
        hint: None,
        tc: Some("1=up,2=down,3=testing,4=unknown,5=dormant,6=notPresent,7=lowerLayerDown"),
    },
    Def { oid: &[1, 3, 6, 1, 2, 1, 2, 2, 1, 9], name: "ifLastChange", module: "IF-MIB", hint: Some("ticks"), tc: None },

    // IP / ARP (ipNetToMediaTable).
    Def { oid: &[1, 3, 6, 1, 2, 1, 4], name: "ip", module: "IP-MIB", hint: None, tc: None },
    Def {
        oid: &[1, 3, 6, 1, 2, 1, 4, 22, 1, 2],
        name: "ipNetToMediaPhysAddress",
        module: "IP-MIB",
        hint: Some("1x:"),
        tc: None,
    },

    // Bridge MIB (MAC address table).
    Def { oid: &[1, 3, 6, 1, 2, 1, 17], name: "dot1dBridge", module: "BRIDGE-MIB", hint: None, tc: None },
    Def {
        oid: &[1, 3, 6, 1, 2, 1, 17, 4, 3, 1, 1],
        name: "dot1dTpFdbAddress",
        module: "BRIDGE-MIB",
        hint: Some("1x:"),
        tc: None,
    },
    Def {
        oid: &[1, 3, 6, 1, 2, 1, 17, 4, 3, 1, 2],
        name: "dot1dTpFdbPort",
        module: "BRIDGE-MIB",
        hint: None,
        tc: None,
    },

    // Well-known trap OIDs (SNMPv2-MIB / RFC 3418).
    Def { oid: &[1, 3, 6, 1, 6, 3, 1, 1, 5], name: "snmpTraps", module: "SNMPv2-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 6, 3, 1, 1, 5, 1], name: "coldStart", module: "SNMPv2-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 6, 3, 1, 1, 5, 2], name: "warmStart", module: "SNMPv2-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 6, 3, 1, 1, 5, 3], name: "linkDown", module: "IF-MIB", hint: None, tc: None },
    Def { oid: &[1, 3, 6, 1, 6, 3, 1, 1, 5, 4], name: "linkUp", module: "IF-MIB", hint: None, tc: None },
    Def {
        oid: &[1, 3, 6, 1, 6, 3, 1, 1, 5, 5],
        name: "authenticationFailure",
        module: "SNMPv2-MIB",
        hint: None,
        tc: None,
    },
];

/// Build the always-available built-in MIB-II table.
pub fn builtin_mib() -> MibTree {
    let mut tree = MibTree::new();
    for def in DEFS {
        let oid = Oid::new(def.oid.to_vec()).expect("built-in OID is well-formed");
        tree.insert(MibNode {
            oid,
            name: def.name.to_string(),
            full_path: format!("{}::{}", def.module, def.name),
            display_hint: def.hint.map(str::to_string),
            textual_convention: def.tc.map(str::to_string),
        });
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mib::MibSource;

    #[test]
    fn sys_descr_is_registered_under_system() {
        let mib = builtin_mib();
        let oid = mib.lookup_name("sysDescr").expect("sysDescr registered");
        assert_eq!(oid.as_slice(), &[1, 3, 6, 1, 2, 1, 1, 1]);
    }

    #[test]
    fn if_phys_address_has_mac_hint() {
        let mib = builtin_mib();
        let oid = Oid::new(vec![1, 3, 6, 1, 2, 1, 2, 2, 1, 6]).unwrap();
        assert_eq!(mib.hint_for(&oid), Some("1x:"));
    }
}
