//! Squiggle CLI.

use std::io::IsTerminal;

use sqc::commands::{self, Terminal};
use sqc::options::{self, Command, USAGE};

fn main() {
    sqc::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match options::parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    let mut out = std::io::stdout();
    let mut err = std::io::stderr();
    let colors = err.is_terminal();
    let mut terminal = Terminal {
        out: &mut out,
        err: &mut err,
        colors,
    };

    let code = match command {
        Command::Run(run) => {
            let sample_count = std::env::var("SAMPLE_COUNT").ok();
            match options::run_env(&run, sample_count.as_deref()) {
                Ok(env) => {
                    let print_bundle = std::env::var_os("PRINT_SERIALIZED_BUNDLE").is_some();
                    commands::run(&run, env, print_bundle, &mut terminal)
                }
                Err(message) => {
                    eprintln!("error: {message}");
                    1
                }
            }
        }
        Command::Parse { input, raw } => commands::parse(&input, raw, &mut terminal),
        Command::PrintIr { input } => commands::print_ir(&input, &mut terminal),
        Command::Help => {
            println!("{USAGE}");
            0
        }
        Command::Version => {
            println!("sqc {}", env!("CARGO_PKG_VERSION"));
            0
        }
    };
    std::process::exit(code);
}
