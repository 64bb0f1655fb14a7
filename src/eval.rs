use std::convert::TryFrom;

use crate::env::Environment;
use crate::parser::{display_postfix, to_postfix};
use crate::tokens::{tokenize_with, Lexeme, Operator, Spacing};
use error_chain::bail;
use log::{debug, trace};

pub mod errors {
    use error_chain::error_chain;
    error_chain! {
        links {
            Parse(crate::tokens::errors::Error, crate::tokens::errors::ErrorKind);
            Env(crate::env::errors::Error, crate::env::errors::ErrorKind);
        }

        errors {
            InvalidExpression(reason: String) {
                description("Invalid expression")
                display("Invalid expression: {}", reason)
            }

            DivisionByZero {
                description("Division by zero")
                display("Division by zero")
            }

            Overflow {
                description("Integer overflow")
                display("Integer overflow")
            }

            NoExpression {
                description("No expression")
                display("No expression")
            }

            InvalidAssignment {
                description("Invalid assignment")
                display("Invalid assignment")
            }
        }
    }

    impl ErrorKind {
        pub fn is_unknown_variable(&self) -> bool {
            match self {
                ErrorKind::Env(crate::env::errors::ErrorKind::UnknownVariable(_)) => true,
                _ => false,
            }
        }
    }
}
use errors::*;

/// How `a ^ b` is computed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PowerMode {
    /// `a` multiplied by itself `b - 1` times, so any `b <= 0` yields `a`.
    Repeated,
    /// Exact integer power; negative exponents truncate toward zero.
    Strict,
}

impl Default for PowerMode {
    fn default() -> Self {
        PowerMode::Repeated
    }
}

fn power(a: i64, b: i64, mode: PowerMode) -> Result<i64> {
    if b < 0 && mode == PowerMode::Strict {
        return match a {
            0 => Err(ErrorKind::DivisionByZero.into()),
            1 => Ok(1),
            -1 => Ok(if b % 2 == 0 { 1 } else { -1 }),
            _ => Ok(0),
        };
    }
    if b == 0 && mode == PowerMode::Strict {
        return Ok(1);
    }
    if b <= 0 {
        return Ok(a);
    }
    let res = match u32::try_from(b) {
        Ok(exp) => a.checked_pow(exp),
        // exponent beyond u32, only the trivial bases stay in range
        Err(_) => match a {
            0 | 1 => Some(a),
            -1 => Some(if b % 2 == 0 { 1 } else { -1 }),
            _ => None,
        },
    };
    res.ok_or_else(|| ErrorKind::Overflow.into())
}

fn apply(op: Operator, a: i64, b: i64, mode: PowerMode) -> Result<i64> {
    let res = match op {
        Operator::Add => a.checked_add(b),
        Operator::Sub => a.checked_sub(b),
        Operator::Mul => a.checked_mul(b),
        Operator::Div => {
            if b == 0 {
                bail!(ErrorKind::DivisionByZero);
            }
            a.checked_div(b)
        }
        Operator::Pow => return power(a, b, mode),
    };
    res.ok_or_else(|| ErrorKind::Overflow.into())
}

/// Runs a postfix sequence on an operand stack, using the default power mode.
pub fn evaluate(postfix: &[Lexeme], env: &Environment) -> Result<i64> {
    evaluate_with(postfix, env, PowerMode::default())
}

pub fn evaluate_with(postfix: &[Lexeme], env: &Environment, mode: PowerMode) -> Result<i64> {
    if postfix.is_empty() {
        bail!(ErrorKind::NoExpression);
    }

    let mut stack: Vec<i64> = Vec::with_capacity(postfix.len() / 2 + 1);
    for lexeme in postfix {
        match lexeme {
            Lexeme::Number(digits) => {
                let n = digits.parse::<i64>().map_err(|_| {
                    ErrorKind::InvalidExpression(format!("number {} out of range", digits))
                })?;
                stack.push(n);
            }
            Lexeme::Identifier(name) => stack.push(env.get(name)?),
            Lexeme::Operator(op) => {
                let (b, a) = match (stack.pop(), stack.pop()) {
                    (Some(b), Some(a)) => (b, a),
                    _ => bail!(ErrorKind::InvalidExpression(format!("missing operand for '{}'", op))),
                };
                let res = apply(*op, a, b, mode)?;
                trace!("{} {} {} = {}", a, op, b, res);
                stack.push(res);
            }
            Lexeme::LeftParen | Lexeme::RightParen => {
                bail!(ErrorKind::InvalidExpression("parenthesis in postfix sequence".to_string()))
            }
        }
    }

    match stack.as_slice() {
        [res] => Ok(*res),
        _ => Err(ErrorKind::InvalidExpression(format!("{} values left over", stack.len())).into()),
    }
}

/// Evaluates expressions against the session's variables.
#[derive(Debug, Default)]
pub struct Calculator {
    env: Environment,
    mode: PowerMode,
    spacing: Spacing,
}

impl Calculator {
    pub fn new() -> Calculator {
        Calculator::default()
    }

    pub fn with_mode(mode: PowerMode) -> Calculator {
        Calculator {
            mode,
            ..Calculator::default()
        }
    }

    pub fn with_spacing(self, spacing: Spacing) -> Calculator {
        Calculator { spacing, ..self }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Tokenizes, converts and evaluates `input`. Never touches the variables.
    pub fn calc(&self, input: &str) -> Result<i64> {
        let tokens = tokenize_with(input, self.spacing)?;
        let postfix = to_postfix(tokens)?;
        let res = evaluate_with(&postfix, &self.env, self.mode)?;
        debug!("{} => {}", display_postfix(&postfix), res);
        Ok(res)
    }

    pub fn get(&self, name: &str) -> Result<i64> {
        Ok(self.env.get(name)?)
    }

    /// Binds `name` to the value of `input`. An unbound variable on the right
    /// is reported as is, every other failure becomes an invalid assignment.
    pub fn assign(&mut self, name: &str, input: &str) -> Result<i64> {
        crate::env::check_identifier(name)?;
        let value = match self.calc(input) {
            Ok(value) => value,
            Err(e) if e.kind().is_unknown_variable() => return Err(e),
            Err(e) => return Err(e).chain_err(|| ErrorKind::InvalidAssignment),
        };
        self.env.set(name, value)?;
        Ok(value)
    }
}
