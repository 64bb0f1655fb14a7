use crate::eval::PowerMode;
use crate::tokens::Spacing;

pub mod errors {
    use error_chain::error_chain;
    error_chain! {
        errors {
            UnknownArgument(arg: String) {
                description("Unknown argument")
                display("Unknown argument: {}", arg)
            }

            MissingValue(flag: String) {
                description("Missing value for flag")
                display("Missing value for {}", flag)
            }
        }
    }
}

use errors::*;

pub const DEFAULT_PROMPT: &str = "> ";

#[derive(Debug, PartialEq, Clone)]
pub struct Config {
    pub power: PowerMode,
    pub spacing: Spacing,
    /// Read plain lines from stdin instead of running the line editor.
    pub plain: bool,
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            power: PowerMode::default(),
            spacing: Spacing::default(),
            plain: false,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Builds a config from command line arguments, program name excluded.
    pub fn from_args<I>(args: I) -> Result<Config>
        where I: IntoIterator<Item = String>
    {
        let mut config = Config::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--strict-pow" => config.power = PowerMode::Strict,
                "--strict-spacing" => config.spacing = Spacing::Separating,
                "--plain" => config.plain = true,
                "--prompt" => {
                    config.prompt = args.next()
                        .ok_or_else(|| Error::from(ErrorKind::MissingValue(arg.clone())))?;
                }
                _ => return Err(ErrorKind::UnknownArgument(arg).into()),
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(Vec::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.power, PowerMode::Repeated);
        assert_eq!(config.spacing, Spacing::Stripped);
        assert_eq!(config.prompt, "> ");
    }

    #[test]
    fn test_flags() {
        let config = Config::from_args(args(&[
            "--plain", "--strict-pow", "--strict-spacing", "--prompt", "calc> ",
        ])).unwrap();
        assert!(config.plain);
        assert_eq!(config.spacing, Spacing::Separating);
        assert_eq!(config.power, PowerMode::Strict);
        assert_eq!(config.prompt, "calc> ");
    }

    #[test]
    fn test_bad_args() {
        match Config::from_args(args(&["--verbose"])) {
            Err(Error(ErrorKind::UnknownArgument(arg), _)) => assert_eq!(arg, "--verbose"),
            other => panic!("Expected unknown argument, got {:?}", other),
        }
        match Config::from_args(args(&["--prompt"])) {
            Err(Error(ErrorKind::MissingValue(_), _)) => (),
            other => panic!("Expected missing value, got {:?}", other),
        }
    }
}
