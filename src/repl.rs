//! Interactive REPL for Lox.

use std::io::{self, Write};
use std::path::PathBuf;

use colored::Colorize;

use crate::vm::Vm;

const HISTORY_FILE: &str = ".lox_history";

/// Line-at-a-time REPL.
///
/// One [`Vm`] lives for the whole session, so globals and interned strings
/// persist across inputs. Compile and runtime errors are printed and the
/// loop continues with the next line.
pub struct Repl {
    vm: Vm,
    history: Vec<String>,
    history_file: PathBuf,
}

impl Repl {
    pub fn new() -> Self {
        let history_file = Self::history_path();
        let mut repl = Self {
            vm: Vm::new(),
            history: Vec::new(),
            history_file,
        };
        repl.load_history();
        repl
    }

    fn history_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            home.join(HISTORY_FILE)
        } else {
            PathBuf::from(HISTORY_FILE)
        }
    }

    fn load_history(&mut self) {
        if let Ok(content) = std::fs::read_to_string(&self.history_file) {
            for line in content.lines() {
                if !line.trim().is_empty() {
                    self.history.push(line.to_string());
                }
            }
        }
    }

    fn save_history(&self) {
        let content = self.history.join("\n");
        let _ = std::fs::write(&self.history_file, content);
    }

    pub fn run(&mut self) {
        println!("Lox {} - REPL", env!("CARGO_PKG_VERSION"));
        println!("Type .help for available commands.\n");

        let stdin = io::stdin();

        loop {
            print!(">>> ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) => {
                    self.save_history();
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {
                    let line = line.trim_end();
                    if line.is_empty() {
                        continue;
                    }

                    if line == "exit" || line == ".exit" || line == "quit" {
                        self.save_history();
                        println!("Goodbye!");
                        break;
                    }

                    self.history.push(line.to_string());

                    if line.starts_with('.') {
                        self.handle_command(line);
                    } else {
                        self.execute(line);
                    }
                }
                Err(_) => {
                    self.save_history();
                    break;
                }
            }
        }
    }

    fn handle_command(&mut self, line: &str) {
        match line {
            ".help" => self.cmd_help(),
            ".globals" => self.cmd_globals(),
            ".history" | ".hist" => self.cmd_history(),
            ".clear" | ".reset" => {
                self.vm = Vm::new();
                println!("Environment reset.");
            }
            _ => println!(
                "Unknown command: {}. Type .help for available commands.",
                line
            ),
        }
    }

    fn cmd_help(&self) {
        println!();
        println!("Lox REPL Commands");
        println!();
        println!(".help          - Show this help message");
        println!(".globals       - List global variables in definition order");
        println!(".history       - Show command history");
        println!(".clear         - Reset the VM (globals and interned strings)");
        println!("exit / Ctrl+D  - Exit the REPL");
        println!();
    }

    fn cmd_globals(&self) {
        if self.vm.globals.is_empty() {
            println!("No globals defined.");
        } else {
            println!("Globals:");
            for (name, value) in &self.vm.globals {
                println!("  {} = {}", name, value);
            }
        }
    }

    fn cmd_history(&self) {
        for (i, entry) in self.history.iter().enumerate() {
            println!("{:4}  {}", i + 1, entry);
        }
    }

    fn execute(&mut self, line: &str) {
        if let Err(e) = self.vm.interpret(line) {
            eprintln!("{}", e.to_string().red());
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run_repl() {
    let mut repl = Repl::new();
    repl.run();
}
