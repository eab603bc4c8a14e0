use log::{error, info};

use report::ReportFormat;
use validate::{extract_record, validate};

mod error;
mod extract;
mod reconcile;
mod reference;
mod report;
mod types;
mod validate;

const APP_NAME: &str = "cfgval";

const SUB_CMD_VALIDATE: &str = "validate";
const SUB_CMD_EXTRACT: &str = "extract";

fn main() {
    let app = clap::Command::new(APP_NAME)
        .version(clap::crate_version!())
        .about("Validate device running configurations against provisioning templates")
        .subcommand_required(true)
        .subcommand(
            clap::Command::new(SUB_CMD_VALIDATE)
                .about("Compare a device configuration with its reference template and store a report")
                .arg(
                    clap::Arg::new("CONFIG")
                        .required(true)
                        .long("config")
                        .help("Device running configuration (IOS-XE format)"),
                )
                .arg(
                    clap::Arg::new("REFERENCE")
                        .required(true)
                        .long("reference")
                        .help("Reference template in CSV format: variable names row followed by a values row"),
                )
                .arg(
                    clap::Arg::new("OUTPUT-DIR")
                        .long("output-dir")
                        .help("Destination dir storing the report (defaults to the config file dir)"),
                )
                .arg(
                    clap::Arg::new("FORMAT")
                        .long("format")
                        .default_value("csv")
                        .value_parser(ReportFormat::VALUES)
                        .help("Report format"),
                )
                .arg(verbose_arg()),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_EXTRACT)
                .about("Print the fields extracted from a device configuration in YAML format")
                .arg(
                    clap::Arg::new("CONFIG")
                        .required(true)
                        .long("config")
                        .help("Device running configuration (IOS-XE format)"),
                )
                .arg(verbose_arg()),
        );

    let matches = app.get_matches();

    match matches.subcommand() {
        Some((SUB_CMD_VALIDATE, cmd)) => {
            let config_file = cmd
                .get_one::<String>("CONFIG")
                .expect("--config is required");
            let reference_file = cmd
                .get_one::<String>("REFERENCE")
                .expect("--reference is required");
            let output_dir = cmd.get_one::<String>("OUTPUT-DIR").map(String::as_str);
            let format = cmd
                .get_one::<String>("FORMAT")
                .and_then(|name| ReportFormat::from_name(name))
                .expect("--format has a default value");

            setup_logger(cmd);

            match validate(config_file, reference_file, output_dir, format) {
                Ok(path) => {
                    info!("Validation completed. Report saved to: {}", path.display());
                }
                Err(err) => {
                    error!("Validation failed: {err:#}");
                    std::process::exit(1)
                }
            }
        }
        Some((SUB_CMD_EXTRACT, cmd)) => {
            let config_file = cmd
                .get_one::<String>("CONFIG")
                .expect("--config is required");

            setup_logger(cmd);

            match extract_record(config_file) {
                Ok(yaml) => print!("{yaml}"),
                Err(err) => {
                    error!("Extracting config failed: {err:#}");
                    std::process::exit(1)
                }
            }
        }
        _ => unreachable!("Unrecognized subcommand"),
    }
}

fn verbose_arg() -> clap::Arg {
    clap::Arg::new("VERBOSE")
        .long("verbose")
        .action(clap::ArgAction::SetTrue)
        .help("Enables DEBUG log level")
}

fn setup_logger(matches: &clap::ArgMatches) {
    let verbose_arg = "VERBOSE";

    let mut log_builder = env_logger::Builder::new();
    if matches
        .try_get_one::<bool>(verbose_arg)
        .is_ok_and(|arg| arg.is_some_and(|&value| value))
    {
        log_builder.filter(None, log::LevelFilter::Debug);
    } else {
        log_builder.filter(None, log::LevelFilter::Info);
    }
    log_builder.init();
}
