//! Default binary - shows help text.

fn main() {
    println!("rsnmp {} - SNMP command-line client", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Available commands:");
    println!("  snmp   GET/GETNEXT/GETBULK/WALK/BULKWALK/TRAP against an SNMP agent");
    println!();
    println!("For more information, run `snmp --help`.");
}
