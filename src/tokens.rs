use std::borrow::Cow;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use lazy_static::lazy_static;
use log::trace;
use regex::{Captures, Regex};

pub mod errors {
    use error_chain::error_chain;
    error_chain! {
        errors {
            InvalidExpression(reason: String) {
                description("Invalid expression")
                display("Invalid expression: {}", reason)
            }
        }
    }
}

use errors::*;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            '^' => Some(Operator::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Pow => '^',
        }
    }

    pub fn priority(self) -> i32 {
        match self {
            Operator::Add | Operator::Sub => 10,
            Operator::Mul | Operator::Div => 20,
            Operator::Pow => 30,
        }
    }

    /// Whether `self`, arriving after `top` is already stacked, must be stacked
    /// on top of it instead of popping it. `^` never pops anything.
    pub fn outranks(self, top: Operator) -> bool {
        self == Operator::Pow || self.priority() > top.priority()
    }

    pub fn is_sign(self) -> bool {
        self == Operator::Add || self == Operator::Sub
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Lexeme {
    Number(String),
    Identifier(String),
    Operator(Operator),
    LeftParen,
    RightParen,
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Lexeme::Number(s) | Lexeme::Identifier(s) => write!(f, "{}", s),
            Lexeme::Operator(op) => write!(f, "{}", op),
            Lexeme::LeftParen => write!(f, "("),
            Lexeme::RightParen => write!(f, ")"),
        }
    }
}

lazy_static! {
    static ref SIGN_RUN: Regex = Regex::new(r"[+-](?:\s*[+-])+").unwrap();
    static ref WORD_CHAR: Regex = Regex::new(r"^[\p{L}\p{Nd}]$").unwrap();
}

/// What whitespace inside an expression means.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Spacing {
    /// Whitespace is dropped before anything else, so `1 2` reads as `12`.
    Stripped,
    /// Whitespace ends the current number or name, so `1 2` is two operands.
    Separating,
}

impl Default for Spacing {
    fn default() -> Self {
        Spacing::Stripped
    }
}

/// Collapses chains of `+`/`-` separated by nothing but whitespace into a
/// single sign: `3 - -2` becomes `3 +2`, `5+-3` becomes `5-3`.
pub fn normalize_signs(input: &str) -> Cow<str> {
    SIGN_RUN.replace_all(input, |caps: &Captures| {
        let minuses = caps[0].chars().filter(|c| *c == '-').count();
        if minuses % 2 == 1 { "-" } else { "+" }
    })
}

pub struct TokenStream<'a> {
    input: Peekable<Chars<'a>>,
}

impl TokenStream<'_> {
    pub fn from_input(source: &str) -> TokenStream {
        TokenStream {
            input: source.chars().peekable(),
        }
    }

    fn read_while<P>(&mut self, predicate: P) -> String
        where P: Fn(&char) -> bool
    {
        let mut res = String::new();
        while let Some(c) = self.input.peek() {
            if !predicate(c) {
                break;
            }
            res.push(*c);
            let _ = self.input.next();
        }
        res
    }

    fn skip_whitespace(&mut self) {
        let _ = self.read_while(|c| c.is_whitespace());
    }

    // letters and decimal digits only, so `½` or `Ⅻ` are rejected
    fn is_word_con(c: &char) -> bool {
        let mut buf = [0u8; 4];
        WORD_CHAR.is_match(c.encode_utf8(&mut buf))
    }

    // Digits and letters share one run; the kind is decided once the run ends.
    fn read_word(&mut self) -> Lexeme {
        let res = self.read_while(TokenStream::is_word_con);
        if res.chars().all(|c| c.is_ascii_digit()) {
            Lexeme::Number(res)
        } else {
            Lexeme::Identifier(res)
        }
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Result<Lexeme>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let ch = *self.input.peek()?;

        if TokenStream::is_word_con(&ch) {
            return Some(Ok(self.read_word()));
        }

        let _ = self.input.next();
        let lexeme = match ch {
            '(' => Lexeme::LeftParen,
            ')' => Lexeme::RightParen,
            c => match Operator::from_char(c) {
                Some(op) => Lexeme::Operator(op),
                None => {
                    return Some(Err(
                        ErrorKind::InvalidExpression(format!("unexpected character '{}'", c)).into()
                    ))
                }
            },
        };
        Some(Ok(lexeme))
    }
}

/// Splits an expression into lexemes, with whitespace stripped first.
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>> {
    tokenize_with(source, Spacing::default())
}

pub fn tokenize_with(source: &str, spacing: Spacing) -> Result<Vec<Lexeme>> {
    let normalized = match spacing {
        Spacing::Stripped => {
            let stripped: String = source.chars().filter(|c| !c.is_whitespace()).collect();
            normalize_signs(&stripped).into_owned()
        }
        Spacing::Separating => normalize_signs(source).into_owned(),
    };
    trace!("normalized input: {:?}", normalized);
    TokenStream::from_input(&normalized).collect()
}
