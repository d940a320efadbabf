//! Start-up helpers for the binary: command line arguments and the config file.

use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{bail, ensure, Context, Result};

use crate::config::{self, SimConfig};
use crate::print;

/// What the command line asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// JSON file to read the [SimConfig] from. Defaults are used when absent.
    pub config_path: Option<PathBuf>,
    /// Print the final world view as JSON
    pub json: bool,
    /// `help` was given
    pub help: bool,
}

/// Reads the process arguments, see [parse_arg_list].
///
/// Prints the argument list and exits if `help` was given.
pub fn parse_args() -> Result<CliArgs> {
    let args = parse_arg_list(env::args().skip(1))?;
    if args.help {
        print_help();
        std::process::exit(0);
    }
    Ok(args)
}

/// Parses `key::value` arguments.
///
/// Print toggles take `true` or `false` and are applied to the flags in
/// [config] right away. Unknown arguments are reported and skipped.
pub fn parse_arg_list<I, S>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = CliArgs::default();

    for arg in args {
        let arg = arg.as_ref();
        if let Some((key, value)) = arg.split_once("::") {
            let key = key.to_lowercase();
            if key == "config" {
                parsed.config_path = Some(PathBuf::from(value));
                continue;
            }

            let flag = match key.as_str() {
                "print_status" => &config::PRINT_STATUS_ON,
                "print_err" => &config::PRINT_ERR_ON,
                "print_warn" => &config::PRINT_WARN_ON,
                "print_ok" => &config::PRINT_OK_ON,
                "print_info" => &config::PRINT_INFO_ON,
                "print_else" => &config::PRINT_ELSE_ON,
                "json" => {
                    parsed.json = parse_bool(&key, value)?;
                    continue;
                }
                _ => {
                    print::warn(format!("Unknown argument '{}' ignored", arg));
                    continue;
                }
            };
            *flag.lock().unwrap_or_else(|p| p.into_inner()) = parse_bool(&key, value)?;
        } else {
            match arg.to_lowercase().as_str() {
                "help" => parsed.help = true,
                "debug" => {
                    // only errors
                    for flag in [
                        &config::PRINT_STATUS_ON,
                        &config::PRINT_WARN_ON,
                        &config::PRINT_OK_ON,
                        &config::PRINT_INFO_ON,
                        &config::PRINT_ELSE_ON,
                    ] {
                        *flag.lock().unwrap_or_else(|p| p.into_inner()) = false;
                    }
                }
                _ => print::warn(format!("Unknown argument '{}' ignored", arg)),
            }
        }
    }

    Ok(parsed)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => bail!("argument '{}' expects true or false, got '{}'", key, other),
    }
}

fn print_help() {
    println!("Available arguments:");
    println!("  config::<path>          read the simulation config from a JSON file");
    println!("  json::true/false        print the final world view as JSON");
    println!("  print_status::true/false");
    println!("  print_err::true/false");
    println!("  print_warn::true/false");
    println!("  print_ok::true/false");
    println!("  print_info::true/false");
    println!("  print_else::true/false");
    println!("  debug                   only print errors");
}

/// Reads and checks a [SimConfig] from a JSON file. Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<SimConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read config file {}", path.display()))?;
    let cfg: SimConfig = serde_json::from_str(&text)
        .with_context(|| format!("could not parse config file {}", path.display()))?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Rejects configs no building can be built from.
pub fn validate_config(cfg: &SimConfig) -> Result<()> {
    ensure!(cfg.num_floors > 0, "num_floors must be positive");
    ensure!(cfg.num_elevators > 0, "num_elevators must be positive");
    ensure!(cfg.capacity > 0, "capacity must be positive");
    ensure!(cfg.lowest_floor >= 1, "lowest_floor must be at least 1");
    ensure!(cfg.fits_in_floor_range(), "lowest_floor + num_floors overflows");
    ensure!(cfg.time_unit_ms > 0, "time_unit_ms must be positive");
    Ok(())
}
