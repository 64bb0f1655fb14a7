use super::tokens::{Lexeme, Operator};
use crate::tokens::errors::*;
use error_chain::bail;
use log::{debug, trace};

#[derive(Debug, PartialEq, Clone, Copy)]
enum Stacked {
    Op(Operator),
    LeftParen,
}

/// Shunting-yard conversion of an infix lexeme stream into postfix order.
pub struct Parser {
    output: Vec<Lexeme>,
    stack: Vec<Stacked>,
    // true at the start, after an operator and after `(`
    expect_operand: bool,
}

impl Parser {
    pub fn new() -> Parser {
        Parser {
            output: Vec::new(),
            stack: Vec::new(),
            expect_operand: true,
        }
    }

    pub fn push(&mut self, lexeme: Lexeme) -> Result<()> {
        match lexeme {
            Lexeme::Number(_) | Lexeme::Identifier(_) => {
                self.output.push(lexeme);
                self.expect_operand = false;
            }
            Lexeme::Operator(op) => self.push_operator(op),
            Lexeme::LeftParen => {
                self.stack.push(Stacked::LeftParen);
                self.expect_operand = true;
            }
            Lexeme::RightParen => {
                self.close_paren()?;
                self.expect_operand = false;
            }
        }
        Ok(())
    }

    fn push_operator(&mut self, op: Operator) {
        if self.expect_operand && op.is_sign() {
            // Unary sign: `-x` is read as `0 - x`. Nothing before it is
            // waiting for this operand, so the stack is left alone.
            trace!("unary {} gets an implicit zero", op);
            self.output.push(Lexeme::Number("0".to_string()));
        } else {
            while let Some(&Stacked::Op(top)) = self.stack.last() {
                if op.outranks(top) {
                    break;
                }
                self.output.push(Lexeme::Operator(top));
                let _ = self.stack.pop();
            }
        }
        self.stack.push(Stacked::Op(op));
        self.expect_operand = true;
    }

    fn close_paren(&mut self) -> Result<()> {
        while let Some(top) = self.stack.pop() {
            match top {
                Stacked::LeftParen => return Ok(()),
                Stacked::Op(op) => self.output.push(Lexeme::Operator(op)),
            }
        }
        bail!(ErrorKind::InvalidExpression("unmatched ')'".to_string()))
    }

    pub fn finish(mut self) -> Result<Vec<Lexeme>> {
        while let Some(top) = self.stack.pop() {
            match top {
                Stacked::LeftParen => {
                    bail!(ErrorKind::InvalidExpression("unclosed '('".to_string()))
                }
                Stacked::Op(op) => self.output.push(Lexeme::Operator(op)),
            }
        }
        Ok(self.output)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

pub fn to_postfix<I>(tokens: I) -> Result<Vec<Lexeme>>
    where I: IntoIterator<Item = Lexeme>
{
    let mut parser = Parser::new();
    for token in tokens {
        parser.push(token)?;
    }
    let postfix = parser.finish()?;
    debug!("postfix: {}", display_postfix(&postfix));
    Ok(postfix)
}

pub fn display_postfix(postfix: &[Lexeme]) -> String {
    postfix.iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
