use std::path::PathBuf;

use anyhow::{Result, anyhow};

const USAGE: &str = "usage: eligibility-checker [--config <path>] check [--no-validate-affiliation] <id>... | deprovision <id>...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check {
        principal_ids: Vec<String>,
        validate_affiliation: bool,
    },
    Deprovision {
        principal_ids: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: PathBuf,
    pub command: Command,
}

pub fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut command_name = None;
    let mut validate_affiliation = true;
    let mut principal_ids = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                config_path = Some(PathBuf::from(value));
            }
            "--no-validate-affiliation" => validate_affiliation = false,
            flag if flag.starts_with("--") => {
                return Err(anyhow!("unknown argument: {flag}. {USAGE}"));
            }
            _ if command_name.is_none() => command_name = Some(arg),
            _ => principal_ids.push(arg),
        }
    }

    let command_name = command_name.ok_or_else(|| anyhow!("missing command. {USAGE}"))?;
    if principal_ids.is_empty() {
        return Err(anyhow!("{command_name} requires at least one id. {USAGE}"));
    }

    let command = match command_name.as_str() {
        "check" => Command::Check {
            principal_ids,
            validate_affiliation,
        },
        "deprovision" if validate_affiliation => Command::Deprovision { principal_ids },
        "deprovision" => {
            return Err(anyhow!(
                "--no-validate-affiliation is not accepted for deprovision"
            ));
        }
        other => return Err(anyhow!("unknown command: {other}. {USAGE}")),
    };

    Ok(CliArgs {
        config_path: config_path.unwrap_or_else(|| PathBuf::from("./eligibility.jsonc")),
        command,
    })
}

pub fn args_from_env() -> Result<CliArgs> {
    parse_args(std::env::args().skip(1))
}
