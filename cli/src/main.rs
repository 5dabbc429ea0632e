#![allow(clippy::needless_lifetimes)]

use anyhow::{anyhow, Result};
use clap::{App, Arg, SubCommand};

mod config;
mod helpers;
mod liq_bot;

fn main() -> Result<()> {
    let matches = App::new("liquidator-cli")
        .version("0.1.0")
        .about("lending market liquidation bot")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("sets the config file")
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("config")
                .about("configuration management commands")
                .subcommands(vec![
                    SubCommand::with_name("new")
                        .about("generates a new and empty configuration file"),
                    SubCommand::with_name("sanitize")
                        .about("sanitize configuration to make suitable for public storage"),
                    SubCommand::with_name("export-as-json")
                        .about("exports the yaml config file into a json file"),
                ]),
        )
        .subcommand(
            SubCommand::with_name("liquidator")
                .about("liquidator service commands")
                .subcommands(vec![SubCommand::with_name("run")
                    .about("runs the simple liquidator until interrupted")]),
        )
        .get_matches();

    let config_file_path = get_config_or_default(&matches);
    process_matches(&matches, config_file_path)
}

// returns the value of the config file argument or the default
fn get_config_or_default(matches: &clap::ArgMatches) -> String {
    matches
        .value_of("config")
        .unwrap_or("config.yaml")
        .to_string()
}

fn process_matches<'a>(matches: &clap::ArgMatches<'a>, config_file_path: String) -> Result<()> {
    match matches.subcommand() {
        ("config", Some(config_command)) => match config_command.subcommand() {
            ("new", Some(new_config)) => config::new_config(new_config, config_file_path),
            ("sanitize", Some(sanitize_config)) => {
                config::sanitize(sanitize_config, config_file_path)
            }
            ("export-as-json", Some(export_as_json)) => {
                config::export_as_json(export_as_json, config_file_path)
            }
            _ => invalid_subcommand("config"),
        },
        ("liquidator", Some(liquidator_command)) => match liquidator_command.subcommand() {
            ("run", Some(run)) => liq_bot::start_simple(run, config_file_path),
            _ => invalid_subcommand("liquidator"),
        },
        _ => invalid_command(),
    }
}

fn invalid_subcommand(command_group: &str) -> Result<()> {
    Err(anyhow!(
        "invalid command found for group {}, run --help for more information",
        command_group
    ))
}

fn invalid_command() -> Result<()> {
    Err(anyhow!(
        "invalid command found, run --help for more information"
    ))
}
