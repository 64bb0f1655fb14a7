//! Interactive integer calculator: expressions with `+ - * / ^` and
//! parentheses, evaluated through a shunting-yard postfix conversion, plus
//! a session-wide set of named variables.

pub mod action;
pub mod config;
pub mod env;
pub mod eval;
pub mod parser;
pub mod repl;
pub mod tokens;

pub use eval::{Calculator, PowerMode};
