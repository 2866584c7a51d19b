//! Command-line arguments.
//!
//! `showroom [--config <path>] [--preloaded <file.json>] [--skip-network] <id>`

use std::path::PathBuf;

use crate::error::CliError;

pub const USAGE: &str =
    "usage: showroom [--config <path>] [--preloaded <file.json>] [--skip-network] <product-id>";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliArgs {
    pub id: String,
    pub config: Option<PathBuf>,
    pub preloaded: Option<PathBuf>,
    pub skip_network: bool,
}

impl CliArgs {
    pub fn from_env() -> Result<Self, CliError> {
        Self::parse(std::env::args().skip(1))
    }

    pub fn parse<I, S>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut id = None;
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => parsed.config = Some(PathBuf::from(value_for(&arg, args.next())?)),
                "--preloaded" => {
                    parsed.preloaded = Some(PathBuf::from(value_for(&arg, args.next())?))
                }
                "--skip-network" => parsed.skip_network = true,
                flag if flag.starts_with("--") => {
                    return Err(CliError::Usage(format!("unknown flag {}", flag)))
                }
                _ if id.is_some() => {
                    return Err(CliError::Usage(format!("unexpected argument {}", arg)))
                }
                _ => id = Some(arg),
            }
        }

        parsed.id = id.ok_or_else(|| CliError::Usage("missing product id".to_string()))?;
        Ok(parsed)
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, CliError> {
    value.ok_or_else(|| CliError::Usage(format!("{} needs a value", flag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::parse([
            "--config",
            "showroom.toml",
            "--preloaded",
            "first-paint.json",
            "--skip-network",
            "680c9484ab11e96a288ef6da",
        ])
        .unwrap();

        assert_eq!(args.id, "680c9484ab11e96a288ef6da");
        assert_eq!(args.config, Some(PathBuf::from("showroom.toml")));
        assert_eq!(args.preloaded, Some(PathBuf::from("first-paint.json")));
        assert!(args.skip_network);
    }

    #[test]
    fn test_id_only() {
        let args = CliArgs::parse(["p1"]).unwrap();
        assert_eq!(args.id, "p1");
        assert_eq!(args.config, None);
        assert!(!args.skip_network);
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(CliArgs::parse(Vec::<String>::new()), Err(CliError::Usage(_))));
        assert!(matches!(CliArgs::parse(["--config"]), Err(CliError::Usage(_))));
        assert!(matches!(CliArgs::parse(["--verbose", "p1"]), Err(CliError::Usage(_))));
        assert!(matches!(CliArgs::parse(["p1", "p2"]), Err(CliError::Usage(_))));
    }
}
