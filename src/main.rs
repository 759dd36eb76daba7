//! Lox CLI: execute files or run the REPL.

use std::env;
use std::path::Path;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI command to execute.
enum Command {
    /// Run a script file
    Run { file: String },
    /// Evaluate a string
    Eval { code: String },
    /// Start the REPL
    Repl,
}

/// CLI options parsed from arguments.
struct Options {
    command: Command,
    disassemble: bool,
    trace: bool,
}

fn print_usage() {
    eprintln!("lox {} - Lox bytecode interpreter", VERSION);
    eprintln!();
    eprintln!("Usage: lox [options] [script.lox]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -e <code>       Evaluate code and exit");
    eprintln!("  --disassemble   Dump bytecode before running");
    eprintln!("  --trace         Trace the stack and each instruction");
    eprintln!("  --help, -h      Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  lox                    Start interactive REPL");
    eprintln!("  lox script.lox         Run a script file");
    eprintln!("  lox -e 'print 1 + 2;'  Evaluate code directly");
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut options = Options {
        command: Command::Repl,
        disassemble: false,
        trace: false,
    };

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--disassemble" => options.disassemble = true,
            "--trace" => options.trace = true,
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "-e" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("-e requires a code argument");
                    print_usage();
                    process::exit(64);
                }
                options.command = Command::Eval {
                    code: args[i].clone(),
                };
            }
            _ if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                print_usage();
                process::exit(64);
            }
            _ => {
                if let Command::Run { .. } = options.command {
                    eprintln!("Only one script file can be specified");
                    print_usage();
                    process::exit(64);
                }
                options.command = Command::Run { file: arg.clone() };
            }
        }
        i += 1;
    }

    options
}

fn main() {
    let options = parse_args();

    match &options.command {
        Command::Repl => lox::repl::run_repl(),
        Command::Run { file } => run_file(file, &options),
        Command::Eval { code } => run_eval(code, &options),
    }
}

fn run_file(path: &str, options: &Options) {
    if let Err(e) = lox::run_file(Path::new(path), options.disassemble, options.trace) {
        eprintln!("{}", e);
        process::exit(e.exit_code());
    }
}

fn run_eval(code: &str, options: &Options) {
    if let Err(e) = lox::run_with_options(code, options.disassemble, options.trace) {
        eprintln!("{}", e);
        process::exit(e.exit_code());
    }
}
