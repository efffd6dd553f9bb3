//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("xa-harness")
        .about("Run the XA transaction scenario suite")
        .subcommand_required(true)
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_run())
        .subcommand(build_init_config())
}

fn build_run() -> Command {
    Command::new("run")
        .about("Run the scenario suite against the in-process stack")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Config file (default: ./xa-harness.toml if present)"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .help("Run mode")
                .value_parser(["fail-fast", "best-effort"]),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Transaction timeout in seconds (0 = none)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(Arg::new("server-type").short('T').help("Server type"))
        .arg(Arg::new("server-name").short('S').help("Server name"))
        .arg(Arg::new("user").short('U').help("User name"))
        .arg(Arg::new("password").short('P').help("Password"))
        .arg(Arg::new("database").short('B').help("Database name"))
        .arg(Arg::new("properties").short('R').help("Property string"))
}

fn build_init_config() -> Command {
    Command::new("init-config")
        .about("Write a commented default config file")
        .arg(
            Arg::new("path")
                .help("Target path (default: ./xa-harness.toml)")
                .index(1),
        )
}
