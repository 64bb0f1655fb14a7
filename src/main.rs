use std::io;

use intcalc::config::Config;
use intcalc::repl::{Lines, Readline, Repl};
use intcalc::Calculator;

use error_chain::ChainedError;

fn main() {
    env_logger::init();

    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.display_chain());
            std::process::exit(2);
        }
    };

    let calc = Calculator::with_mode(config.power).with_spacing(config.spacing);
    let res = if config.plain {
        let stdin = io::stdin();
        let mut repl = Repl::new(Lines::new(stdin.lock()), io::stdout(), calc);
        repl.run()
    } else {
        Repl::new(Readline::new(&config.prompt), io::stdout(), calc).run()
    };

    if let Err(e) = res {
        eprintln!("{}", e.display_chain());
        std::process::exit(1);
    }
}
