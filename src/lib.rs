//! Lox: a bytecode compiler and stack-based virtual machine.
//!
//! Source text is scanned into tokens, compiled in one Pratt-parsing pass
//! straight to bytecode (no AST), and executed on a stack VM:
//!
//! - [`lexer`]: source text to tokens, one at a time, lexemes borrowed
//! - [`vm::compiler`]: tokens to a [`vm::Chunk`] (bytecode + constants + lines)
//! - [`vm::Vm`]: executes a chunk against an operand stack and globals
//! - [`vm::disassembler`]: human-readable bytecode dumps
//!
//! The functions below are the one-shot entry points used by the CLI; the
//! REPL holds a [`vm::Vm`] directly so state persists between lines.

pub mod error;
pub mod lexer;
pub mod repl;
pub mod vm;

use std::path::Path;

use error::LoxError;
use vm::Vm;

/// Run a Lox program from source text.
pub fn run(source: &str) -> Result<(), LoxError> {
    run_with_options(source, false, false)
}

/// Run a Lox program with optional bytecode dump and execution tracing.
pub fn run_with_options(source: &str, disassemble: bool, trace: bool) -> Result<(), LoxError> {
    let mut vm = Vm::new();
    vm.trace = trace;

    let chunk = vm.compile(source)?;
    if disassemble {
        print!("{}", vm::disassemble(&chunk, "script"));
        println!("---");
    }

    vm.execute(&chunk)
}

/// Run a Lox program from a file path.
pub fn run_file(path: &Path, disassemble: bool, trace: bool) -> Result<(), LoxError> {
    let source = std::fs::read_to_string(path)?;
    run_with_options(&source, disassemble, trace)
}

/// Compile source to a bytecode chunk without executing it.
pub fn compile(source: &str) -> Result<vm::Chunk, LoxError> {
    Vm::new().compile(source)
}

/// Disassemble a compiled chunk to a string.
pub fn disassemble(chunk: &vm::Chunk) -> String {
    vm::disassemble(chunk, "script")
}
