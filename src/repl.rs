use std::io::{BufRead, Write};

use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::Editor;

use crate::action::{classify, Action};
use crate::eval::errors::ErrorKind as CalcErrorKind;
use crate::eval::{self, Calculator};

pub mod errors {
    use error_chain::error_chain;
    error_chain! {
        foreign_links {
            Io(std::io::Error);
            Readline(rustyline::error::ReadlineError);
        }
    }
}

use errors::*;

pub const HELP: &str = "\
Integer calculator. Enter an expression and its value is printed.
  operators    + - * / ^ and parentheses, / truncates toward zero
  variables    name = expression    assign (names are letters only)
               name                 print the value of a variable
  commands     /help                show this text
               /exit                leave the calculator";

/// Where the session gets its lines from. `None` means the input is over.
pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<String>>;
}

/// Interactive line editor with in-memory history.
pub struct Readline {
    editor: Editor<()>,
    prompt: String,
}

impl Readline {
    pub fn new(prompt: &str) -> Readline {
        Readline {
            editor: Editor::<()>::new(),
            prompt: prompt.to_string(),
        }
    }
}

impl LineSource for Readline {
    fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            match self.editor.readline(&self.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.editor.add_history_entry(line.as_str());
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
                #[cfg(unix)]
                Err(ReadlineError::Utf8Error) => warn!("skipping a line that is not valid UTF-8"),
                #[cfg(windows)]
                Err(ReadlineError::Decode(e)) => warn!("skipping an undecodable line: {}", e),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Plain buffered reader, one line per call. Bytes that are not valid UTF-8
/// come through as U+FFFD and get reported like any other bad character.
pub struct Lines<R> {
    reader: R,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R) -> Lines<R> {
        Lines { reader }
    }
}

impl<R: BufRead> LineSource for Lines<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Repl<S, W> {
    source: S,
    out: W,
    calc: Calculator,
}

impl<S: LineSource, W: Write> Repl<S, W> {
    pub fn new(source: S, out: W, calc: Calculator) -> Repl<S, W> {
        Repl { source, out, calc }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Reads and handles lines until `/exit` or the end of input.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let line = match self.source.next_line()? {
                Some(line) => line,
                None => {
                    writeln!(self.out, "Bye!")?;
                    break;
                }
            };
            if self.step(&line)? == Flow::Exit {
                break;
            }
            self.out.flush()?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn step(&mut self, line: &str) -> Result<Flow> {
        let action = classify(line);
        debug!("{:?}", action);
        let res = match action {
            Action::Exit => {
                writeln!(self.out, "Bye!")?;
                return Ok(Flow::Exit);
            }
            Action::Help => {
                writeln!(self.out, "{}", HELP)?;
                return Ok(Flow::Continue);
            }
            Action::Unknown(command) => {
                warn!("unknown command /{}", command);
                writeln!(self.out, "Unknown command")?;
                return Ok(Flow::Continue);
            }
            Action::VariableQuery(name) => self.calc.get(&name).map(Some),
            Action::Assignment { name, expression } => {
                self.calc.assign(&name, &expression).map(|_| None)
            }
            Action::Calculation(expression) => self.calc.calc(&expression).map(Some),
        };
        self.report(res)?;
        Ok(Flow::Continue)
    }

    fn report(&mut self, res: eval::errors::Result<Option<i64>>) -> Result<()> {
        match res {
            Ok(Some(value)) => writeln!(self.out, "{}", value)?,
            Ok(None) => (),
            Err(eval::errors::Error(CalcErrorKind::NoExpression, _)) => (),
            Err(e) => {
                debug!("{}", error_chain::ChainedError::display_chain(&e));
                writeln!(self.out, "{}", e)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::PowerMode;
    use crate::tokens::Spacing;

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn session(input: &str) -> String {
        session_with(input, Calculator::new())
    }

    fn session_with(input: &str, calc: Calculator) -> String {
        init_log();
        let mut repl = Repl::new(Lines::new(input.as_bytes()), Vec::new(), calc);
        repl.run().unwrap();
        String::from_utf8(repl.into_output()).unwrap()
    }

    #[test]
    fn test_session() {
        let out = session("\
2+3*4
x = 5
x
y = x * 2
x + y
/exit
");
        assert_eq!(out, "14\n5\n15\nBye!\n");
    }

    #[test]
    fn test_exit_stops_reading() {
        let out = session("/exit\n1+1\n");
        assert_eq!(out, "Bye!\n");
    }

    #[test]
    fn test_end_of_input_exits() {
        assert_eq!(session("7\n"), "7\nBye!\n");
        assert_eq!(session(""), "Bye!\n");
    }

    #[test]
    fn test_empty_lines_print_nothing() {
        let out = session("\n   \n()\n/exit\n");
        assert_eq!(out, "Bye!\n");
    }

    #[test]
    fn test_errors_are_reported() {
        let out = session("\
(1+2
z
1abc = 4
a = b + 1
a = 1 +
a
1/0
/clear
/exit
");
        assert_eq!(out, "\
Invalid expression: unclosed '('
Unknown variable: z
Invalid identifier: 1abc
Unknown variable: b
Invalid assignment
Unknown variable: a
Division by zero
Unknown command
Bye!
");
    }

    #[test]
    fn test_help() {
        let out = session("/help\n/exit\n");
        assert!(out.starts_with(HELP));
        assert!(out.ends_with("Bye!\n"));
    }

    #[test]
    fn test_power_modes() {
        assert_eq!(session("2^0\n"), "2\nBye!\n");
        assert_eq!(session_with("2^0\n", Calculator::with_mode(PowerMode::Strict)), "1\nBye!\n");
    }

    #[test]
    fn test_variables_survive_errors() {
        init_log();
        let mut repl = Repl::new(Lines::new("".as_bytes()), Vec::new(), Calculator::new());
        assert_eq!(repl.step("n = 3").unwrap(), Flow::Continue);
        assert_eq!(repl.step("n = n / 0").unwrap(), Flow::Continue);
        assert_eq!(repl.step("n").unwrap(), Flow::Continue);
        assert_eq!(repl.step("/exit").unwrap(), Flow::Exit);
        assert_eq!(String::from_utf8(repl.into_output()).unwrap(), "Invalid assignment\n3\nBye!\n");
    }

    #[test]
    fn test_invalid_utf8_line_is_reported() {
        init_log();
        let input: &[u8] = b"\xff\xfe\n1+1\n/exit\n";
        let mut repl = Repl::new(Lines::new(input), Vec::new(), Calculator::new());
        repl.run().unwrap();
        assert_eq!(
            String::from_utf8(repl.into_output()).unwrap(),
            "Invalid expression: unexpected character '\u{FFFD}'\n2\nBye!\n"
        );
    }

    #[test]
    fn test_spacing_modes() {
        assert_eq!(session("1 2 + 1\n"), "13\nBye!\n");
        let calc = Calculator::new().with_spacing(Spacing::Separating);
        assert_eq!(session_with("1 2 + 1\n", calc), "Invalid expression: 2 values left over\nBye!\n");
    }
}
