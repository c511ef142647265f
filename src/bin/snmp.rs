//! `snmp`: the CLI binary wiring the protocol core together into the net-snmp-style
//! `get`/`getnext`/`walk`/`bulkget`/`bulkwalk`/`trap`/`mibtree` subcommands, each with
//! its own `-O`/`-C` flag grammar.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rsnmp::ber::Element;
use rsnmp::config::{ClientDefaults, SnmpVersionPref};
use rsnmp::error::ClientError;
use rsnmp::mib::builtin::builtin_mib;
use rsnmp::mib::MibSource;
use rsnmp::oid::{Oid, OidMode};
use rsnmp::ops;
use rsnmp::pdu::SnmpVersion;
use rsnmp::printer::{self, PrintOptions, StringMode};
use rsnmp::session::AgentSession;
use rsnmp::transport;
use rsnmp::walk::{self, WalkOptions};
use rsnmp::{DEFAULT_AGENT_PORT, DEFAULT_TRAP_PORT};

#[derive(Parser)]
#[command(name = "snmp", about = "SNMP command-line client", version = rsnmp::VERSION)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct CommonArgs {
    /// Community string
    #[arg(short = 'c', long)]
    community: Option<String>,
    /// Retransmit count
    #[arg(short = 'r', long)]
    retries: Option<u32>,
    /// Per-attempt timeout, seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,
    /// SNMP version: 1 or 2c
    #[arg(short = 'v', long)]
    version: Option<String>,
    /// Output formatting flags: any of a,f,n,q,v,x,S,Q (may repeat or combine, e.g. -On)
    #[arg(short = 'O', long = "output", action = clap::ArgAction::Append)]
    output: Vec<String>,
    /// Walk/bulk control flags: c,i,p,t,I,E <oid>,n<N>,r<R> (may repeat or combine)
    #[arg(short = 'C', long = "control", action = clap::ArgAction::Append, allow_hyphen_values = true)]
    control: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// GET the named objects
    Get {
        #[command(flatten)]
        common: CommonArgs,
        agent: String,
        oids: Vec<String>,
    },
    /// GETNEXT the named objects
    #[command(name = "getnext")]
    GetNext {
        #[command(flatten)]
        common: CommonArgs,
        agent: String,
        oids: Vec<String>,
    },
    /// Walk a subtree via GETNEXT
    Walk {
        #[command(flatten)]
        common: CommonArgs,
        agent: String,
        oid: Option<String>,
    },
    /// GETBULK the named objects
    #[command(name = "bulkget")]
    BulkGet {
        #[command(flatten)]
        common: CommonArgs,
        agent: String,
        oids: Vec<String>,
    },
    /// Walk a subtree via GETBULK
    #[command(name = "bulkwalk")]
    BulkWalk {
        #[command(flatten)]
        common: CommonArgs,
        agent: String,
        oid: Option<String>,
    },
    /// Send an SNMPv2-Trap
    Trap {
        #[command(flatten)]
        common: CommonArgs,
        agent: String,
        /// Hundredths of a second of uptime, or "" for the system's current uptime
        uptime: String,
        trap_oid: String,
        /// Zero or more (oid, type, value) triples
        rest: Vec<String>,
    },
    /// Print the built-in MIB symbol table
    #[command(name = "mibtree")]
    MibTree {
        #[arg(short = 'O', long = "output", action = clap::ArgAction::Append)]
        output: Vec<String>,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(filter.parse().unwrap()))
        .try_init();

    match run(cli.command) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("snmp: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    let mib = builtin_mib();
    let defaults = ClientDefaults::load().context("loading client defaults")?;

    match command {
        Commands::Get { common, agent, oids } => {
            let (mut session, print_opts, _) = open_session(&common, &defaults, &agent, DEFAULT_AGENT_PORT)?;
            let oids = parse_oids(&oids, &mib)?;
            let resp = ops::get(&mut session, &oids)?;
            print_varbinds(&resp.varbinds, &print_opts, &mib);
        }
        Commands::GetNext { common, agent, oids } => {
            let (mut session, print_opts, _) = open_session(&common, &defaults, &agent, DEFAULT_AGENT_PORT)?;
            let oids = parse_oids(&oids, &mib)?;
            let resp = ops::getnext(&mut session, &oids)?;
            print_varbinds(&resp.varbinds, &print_opts, &mib);
        }
        Commands::BulkGet { common, agent, oids } => {
            let (mut session, print_opts, control) = open_session(&common, &defaults, &agent, DEFAULT_AGENT_PORT)?;
            let oids = parse_oids(&oids, &mib)?;
            let non_repeaters = control.non_repeaters.unwrap_or(defaults.non_repeaters);
            let max_repetitions = control.max_repetitions.unwrap_or(defaults.max_repetitions);
            let resp = ops::getbulk(&mut session, &oids, non_repeaters, max_repetitions)?;
            print_varbinds(&resp.varbinds, &print_opts, &mib);
        }
        Commands::Walk { common, agent, oid } => {
            run_walk(&common, &defaults, &agent, oid, &mib, false)?;
        }
        Commands::BulkWalk { common, agent, oid } => {
            run_walk(&common, &defaults, &agent, oid, &mib, true)?;
        }
        Commands::Trap {
            common,
            agent,
            uptime,
            trap_oid,
            rest,
        } => {
            let (mut session, _, _) = open_session(&common, &defaults, &agent, DEFAULT_TRAP_PORT)?;
            let trap_oid = Oid::parse(&trap_oid, &mib)?;
            let uptime_hundredths = if uptime.is_empty() {
                system_uptime_hundredths()
            } else {
                uptime
                    .parse()
                    .map_err(|_| ClientError::ArgumentError(format!("invalid uptime literal {uptime:?}")))?
            };
            let varbinds = parse_trap_varbinds(&rest, &mib)?;
            ops::trap_v2(&mut session, uptime_hundredths, &trap_oid, &varbinds)?;
        }
        Commands::MibTree { output } => {
            let output = parse_output_tokens(&output)?;
            let oid_mode = output_oid_mode(&output);
            for node in mib.iter() {
                println!("{}", node.oid.format(oid_mode, &mib));
            }
        }
    }
    Ok(())
}

fn run_walk(
    common: &CommonArgs,
    defaults: &ClientDefaults,
    agent: &str,
    oid: Option<String>,
    mib: &dyn MibSource,
    bulk: bool,
) -> Result<()> {
    let (mut session, print_opts, control) = open_session(common, defaults, agent, DEFAULT_AGENT_PORT)?;
    let start = match oid {
        Some(s) => Oid::parse(&s, mib)?,
        None => Oid::new(vec![1])?,
    };

    let opts = WalkOptions {
        end: control
            .end_oid
            .as_deref()
            .map(|s| Oid::parse(s, mib))
            .transpose()?,
        check_increase: control.check_increase,
        include_start: control.include_start,
        fallback_on_empty: control.fallback_on_empty,
        bulk,
        max_repetitions: control.max_repetitions.unwrap_or(defaults.max_repetitions),
    };

    let started = Instant::now();
    let varbinds = walk::walk(&mut session, &start, &opts)?;
    print_varbinds(&varbinds, &print_opts, mib);

    if control.print_summary {
        println!("{} varbinds received", varbinds.len());
    }
    if control.print_elapsed {
        println!("Elapsed: {:.3} seconds", started.elapsed().as_secs_f64());
    }
    Ok(())
}

fn print_varbinds(varbinds: &[(Oid, Element)], opts: &PrintOptions, mib: &dyn MibSource) {
    for (oid, value) in varbinds {
        println!("{}", printer::format_varbind(oid, value, opts, mib));
    }
}

fn open_session(
    common: &CommonArgs,
    defaults: &ClientDefaults,
    agent: &str,
    default_port: u16,
) -> Result<(AgentSession, PrintOptions, ControlFlags)> {
    let version: SnmpVersion = match &common.version {
        Some(v) => v.parse::<SnmpVersionPref>()?.into(),
        None => defaults.version.into(),
    };
    let community = common.community.clone().unwrap_or_else(|| defaults.community.clone());
    let retries = common.retries.unwrap_or(defaults.retries);
    let timeout = std::time::Duration::from_secs(common.timeout.unwrap_or(defaults.timeout_secs));

    let socket = transport::parse_address(agent, default_port)?;
    let session = AgentSession::new(socket, version, community, timeout, retries);

    let output = parse_output_tokens(&common.output)?;
    let control = parse_control_tokens(&common.control)?;
    let print_opts = output_print_options(&output);

    Ok((session, print_opts, control))
}

fn parse_oids(raw: &[String], mib: &dyn MibSource) -> Result<Vec<Oid>> {
    raw.iter()
        .map(|s| Oid::parse(s, mib).map_err(anyhow::Error::from))
        .collect()
}

fn parse_trap_varbinds(rest: &[String], mib: &dyn MibSource) -> Result<Vec<(Oid, Element)>> {
    if rest.len() % 3 != 0 {
        anyhow::bail!("trap varbinds must come in (oid, type, value) triples");
    }
    rest.chunks(3)
        .map(|chunk| {
            let [oid_str, type_str, value_str] = chunk else {
                unreachable!("chunks(3) guarantees length 3")
            };
            let oid = Oid::parse(oid_str, mib)?;
            let tag = type_str
                .chars()
                .next()
                .ok_or_else(|| ClientError::ArgumentError("empty trap varbind type".to_string()))?;
            let value = ops::parse_trap_value(tag, value_str, mib)?;
            Ok((oid, value))
        })
        .collect()
}

fn system_uptime_hundredths() -> u32 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(contents) = std::fs::read_to_string("/proc/uptime") {
            if let Some(seconds) = contents.split_whitespace().next().and_then(|s| s.parse::<f64>().ok()) {
                return (seconds * 100.0) as u32;
            }
        }
    }
    0
}

#[derive(Debug, Default)]
struct OutputFlags {
    ascii_strings: bool,
    full_oid: bool,
    numeric_oid: bool,
    quick: bool,
    varbind_only: bool,
    hex_strings: bool,
    short_oid: bool,
    no_hint: bool,
}

fn parse_output_tokens(tokens: &[String]) -> Result<OutputFlags> {
    let mut flags = OutputFlags::default();
    for tok in tokens {
        for c in tok.chars() {
            match c {
                'a' => flags.ascii_strings = true,
                'f' => flags.full_oid = true,
                'n' => flags.numeric_oid = true,
                'q' => flags.quick = true,
                'v' => flags.varbind_only = true,
                'x' => flags.hex_strings = true,
                'S' => flags.short_oid = true,
                'Q' => flags.no_hint = true,
                other => anyhow::bail!("unknown -O flag {other:?}"),
            }
        }
    }
    Ok(flags)
}

fn output_oid_mode(flags: &OutputFlags) -> OidMode {
    if flags.full_oid {
        OidMode::Full
    } else if flags.numeric_oid {
        OidMode::Numeric
    } else {
        // `-OS` is the default mode made explicit; `Short` is already what a bare
        // invocation renders.
        OidMode::Short
    }
}

fn output_print_options(flags: &OutputFlags) -> PrintOptions {
    PrintOptions {
        print_equals: !flags.quick,
        varbind_only: flags.varbind_only,
        hint: !flags.quick && !flags.no_hint,
        oid_mode: output_oid_mode(flags),
        string_mode: if flags.hex_strings {
            StringMode::Hex
        } else if flags.ascii_strings {
            StringMode::Ascii
        } else {
            StringMode::Default
        },
    }
}

#[derive(Debug)]
struct ControlFlags {
    check_increase: bool,
    include_start: bool,
    print_summary: bool,
    print_elapsed: bool,
    fallback_on_empty: bool,
    end_oid: Option<String>,
    non_repeaters: Option<u32>,
    max_repetitions: Option<u32>,
}

impl Default for ControlFlags {
    fn default() -> Self {
        ControlFlags {
            check_increase: true,
            include_start: false,
            print_summary: false,
            print_elapsed: false,
            fallback_on_empty: true,
            end_oid: None,
            non_repeaters: None,
            max_repetitions: None,
        }
    }
}

fn parse_control_tokens(tokens: &[String]) -> Result<ControlFlags> {
    let mut flags = ControlFlags::default();
    let mut token_iter = tokens.iter();
    while let Some(tok) = token_iter.next() {
        let chars: Vec<char> = tok.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                'c' => {
                    flags.check_increase = false;
                    i += 1;
                }
                'i' => {
                    flags.include_start = true;
                    i += 1;
                }
                'p' => {
                    flags.print_summary = true;
                    i += 1;
                }
                't' => {
                    flags.print_elapsed = true;
                    i += 1;
                }
                'I' => {
                    flags.fallback_on_empty = false;
                    i += 1;
                }
                'E' => {
                    let rest: String = chars[i + 1..].iter().collect();
                    flags.end_oid = Some(if !rest.is_empty() {
                        rest
                    } else {
                        token_iter
                            .next()
                            .cloned()
                            .context("-C E requires an OID argument")?
                    });
                    i = chars.len();
                }
                tag @ ('n' | 'r') => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end].is_ascii_digit() {
                        end += 1;
                    }
                    let digits: String = chars[start..end].iter().collect();
                    let n: u32 = digits
                        .parse()
                        .map_err(|_| anyhow::anyhow!("-C {tag} requires a numeric argument"))?;
                    if tag == 'n' {
                        flags.non_repeaters = Some(n);
                    } else {
                        flags.max_repetitions = Some(n);
                    }
                    i = end;
                }
                other => anyhow::bail!("unknown -C flag {other:?}"),
            }
        }
    }
    Ok(flags)
}
