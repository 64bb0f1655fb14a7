use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

pub mod errors {
    use error_chain::error_chain;
    error_chain! {
        errors {
            InvalidIdentifier(name: String) {
                description("Invalid identifier")
                display("Invalid identifier: {}", name)
            }

            UnknownVariable(name: String) {
                description("Unknown variable")
                display("Unknown variable: {}", name)
            }
        }
    }
}

use errors::*;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^\p{L}+$").unwrap();
}

/// A well-formed identifier is a non-empty run of Unicode letters.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub fn check_identifier(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ErrorKind::InvalidIdentifier(name.to_string()).into())
    }
}

/// Session variables. Bindings only ever get added or overwritten.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Environment {
    vars: HashMap<String, i64>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment::default()
    }

    pub fn get(&self, name: &str) -> Result<i64> {
        check_identifier(name)?;
        self.vars
            .get(name)
            .copied()
            .ok_or_else(|| ErrorKind::UnknownVariable(name.to_string()).into())
    }

    pub fn set(&mut self, name: &str, value: i64) -> Result<()> {
        check_identifier(name)?;
        debug!("{} := {}", name, value);
        self.vars.insert(name.to_string(), value);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        let good = vec!["x", "abc", "Zebra", "żółw", "π", "データ"];
        let bad = vec!["", "1abc", "a1", "a b", "a_b", "x+1", "12"];
        for name in good {
            assert!(is_identifier(name), "{:?} should be an identifier", name);
        }
        for name in bad {
            assert!(!is_identifier(name), "{:?} should not be an identifier", name);
        }
    }

    #[test]
    fn test_get_and_set() {
        let mut env = Environment::new();
        assert!(env.is_empty());
        env.set("x", 5).unwrap();
        assert_eq!(env.get("x").unwrap(), 5);
        env.set("x", -7).unwrap();
        assert_eq!(env.get("x").unwrap(), -7);
        assert!(!env.is_empty());
    }

    #[test]
    fn test_unknown_variable() {
        let env = Environment::new();
        match env.get("y") {
            Err(Error(ErrorKind::UnknownVariable(name), _)) => assert_eq!(name, "y"),
            other => panic!("Expected unknown variable, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_identifier() {
        let mut env = Environment::new();
        match env.get("a1") {
            Err(Error(ErrorKind::InvalidIdentifier(name), _)) => assert_eq!(name, "a1"),
            other => panic!("Expected invalid identifier, got {:?}", other),
        }
        assert!(env.set("", 1).is_err());
        assert!(env.is_empty());
    }
}
