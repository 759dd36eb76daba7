//! The bytecode virtual machine — stack-based execution engine.

use std::rc::Rc;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::{LoxError, RuntimeError};
use crate::vm::chunk::Chunk;
use crate::vm::compiler;
use crate::vm::disassembler;
use crate::vm::interner::Interner;
use crate::vm::opcode::Op;
use crate::vm::value::Value;

/// The bytecode VM.
///
/// One `Vm` owns the interning table and the globals, and both persist
/// across `interpret` calls (the REPL relies on this). Each call compiles
/// its source into a fresh chunk, runs it, and discards it.
pub struct Vm {
    /// Value stack. Empty between top-level runs.
    pub stack: Vec<Value>,
    /// Global variables, keyed by interned name, in definition order.
    pub globals: IndexMap<Rc<str>, Value>,
    /// Interned strings, shared with the compiler.
    pub strings: Interner,
    /// Captured lines of `print` output (also written to stdout).
    pub output: Vec<String>,
    /// Print the stack and each instruction before executing it.
    pub trace: bool,
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(256),
            globals: IndexMap::new(),
            strings: Interner::new(),
            output: Vec::new(),
            trace: false,
        }
    }

    /// Compile one source text into a chunk, without running it.
    pub fn compile(&mut self, source: &str) -> Result<Chunk, LoxError> {
        let mut chunk = Chunk::new();
        compiler::compile(source, &mut chunk, &mut self.strings)?;
        Ok(chunk)
    }

    /// Execute a compiled chunk. On a runtime error the stack is cleared
    /// before returning.
    pub fn execute(&mut self, chunk: &Chunk) -> Result<(), LoxError> {
        match self.run(chunk) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.stack.clear();
                Err(LoxError::Runtime(err))
            }
        }
    }

    /// Compile and execute one source text.
    pub fn interpret(&mut self, source: &str) -> Result<(), LoxError> {
        let chunk = self.compile(source)?;
        self.execute(&chunk)
    }

    /// Run the dispatch loop.
    fn run(&mut self, chunk: &Chunk) -> Result<(), RuntimeError> {
        let mut ip = 0;

        while ip < chunk.code.len() {
            if self.trace {
                self.trace_instruction(chunk, ip);
            }

            let byte = chunk.read_byte(ip);
            ip += 1;
            let Some(op) = Op::from_u8(byte) else {
                return Err(RuntimeError::unknown_opcode(byte, Self::line(chunk, ip)));
            };

            match op {
                Op::Constant => {
                    let value = chunk.read_constant(ip).clone();
                    ip += 1;
                    self.push(value);
                }
                Op::Nil => self.push(Value::Nil),
                Op::True => self.push(Value::Bool(true)),
                Op::False => self.push(Value::Bool(false)),

                Op::Pop => {
                    self.pop();
                }

                Op::GetLocal => {
                    let slot = chunk.read_byte(ip) as usize;
                    ip += 1;
                    let value = self.stack[slot].clone();
                    self.push(value);
                }
                Op::SetLocal => {
                    let slot = chunk.read_byte(ip) as usize;
                    ip += 1;
                    self.stack[slot] = self.peek(0).clone();
                }
                Op::GetGlobal => {
                    let name = Self::read_string(chunk, ip);
                    ip += 1;
                    match self.globals.get(&*name) {
                        Some(value) => {
                            let value = value.clone();
                            self.push(value);
                        }
                        None => {
                            return Err(RuntimeError::undefined_variable(
                                name.as_ref(),
                                Self::line(chunk, ip),
                            ));
                        }
                    }
                }
                Op::DefineGlobal => {
                    let name = Self::read_string(chunk, ip);
                    ip += 1;
                    let value = self.pop();
                    self.globals.insert(name, value);
                }
                Op::SetGlobal => {
                    let name = Self::read_string(chunk, ip);
                    ip += 1;
                    // Assignment is an expression: the value stays put.
                    let value = self.peek(0).clone();
                    match self.globals.entry(Rc::clone(&name)) {
                        Entry::Occupied(mut e) => {
                            e.insert(value);
                        }
                        Entry::Vacant(_) => {
                            return Err(RuntimeError::undefined_variable(
                                name.as_ref(),
                                Self::line(chunk, ip),
                            ));
                        }
                    }
                }

                Op::Equal => {
                    let b = self.pop();
                    let a = self.pop();
                    self.push(Value::Bool(a == b));
                }
                Op::Greater => {
                    let b = self.pop();
                    let a = self.pop();
                    match (a, b) {
                        (Value::Number(a), Value::Number(b)) => self.push(Value::Bool(a > b)),
                        _ => {
                            return Err(RuntimeError::type_error(
                                "Operands must be numbers.",
                                Self::line(chunk, ip),
                            ));
                        }
                    }
                }
                Op::Less => {
                    let b = self.pop();
                    let a = self.pop();
                    match (a, b) {
                        (Value::Number(a), Value::Number(b)) => self.push(Value::Bool(a < b)),
                        _ => {
                            return Err(RuntimeError::type_error(
                                "Operands must be numbers.",
                                Self::line(chunk, ip),
                            ));
                        }
                    }
                }

                Op::Add => {
                    let b = self.pop();
                    let a = self.pop();
                    match (a, b) {
                        (Value::Number(a), Value::Number(b)) => self.push(Value::Number(a + b)),
                        (Value::String(a), Value::String(b)) => {
                            let combined = format!("{}{}", a, b);
                            let handle = self.strings.intern(&combined);
                            self.push(Value::String(handle));
                        }
                        _ => {
                            return Err(RuntimeError::type_error(
                                "Operands must be two numbers or two strings.",
                                Self::line(chunk, ip),
                            ));
                        }
                    }
                }
                Op::Subtract => {
                    let (a, b) = self.pop_numbers(chunk, ip)?;
                    self.push(Value::Number(a - b));
                }
                Op::Multiply => {
                    let (a, b) = self.pop_numbers(chunk, ip)?;
                    self.push(Value::Number(a * b));
                }
                Op::Divide => {
                    let (a, b) = self.pop_numbers(chunk, ip)?;
                    self.push(Value::Number(a / b));
                }

                Op::Not => {
                    let value = self.pop();
                    self.push(Value::Bool(value.is_falsey()));
                }
                Op::Negate => match self.pop() {
                    Value::Number(n) => self.push(Value::Number(-n)),
                    _ => {
                        return Err(RuntimeError::type_error(
                            "Operand must be a number.",
                            Self::line(chunk, ip),
                        ));
                    }
                },

                Op::Print => {
                    let value = self.pop();
                    let rendered = value.to_string();
                    println!("{}", rendered);
                    self.output.push(rendered);
                }

                Op::Jump => {
                    let offset = Self::read_u16(chunk, ip);
                    ip += 2;
                    ip += offset as usize;
                }
                Op::JumpIfFalse => {
                    let offset = Self::read_u16(chunk, ip);
                    ip += 2;
                    if self.peek(0).is_falsey() {
                        ip += offset as usize;
                    }
                }
                Op::Loop => {
                    let offset = Self::read_u16(chunk, ip);
                    ip += 2;
                    ip -= offset as usize;
                }

                Op::Return => return Ok(()),
            }
        }

        Ok(())
    }

    // --- Stack ---

    #[inline]
    fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    #[inline]
    fn pop(&mut self) -> Value {
        self.stack.pop().unwrap_or(Value::Nil)
    }

    #[inline]
    fn peek(&self, distance: usize) -> &Value {
        &self.stack[self.stack.len() - 1 - distance]
    }

    /// Pop a numeric operand pair (right operand first).
    fn pop_numbers(&mut self, chunk: &Chunk, ip: usize) -> Result<(f64, f64), RuntimeError> {
        let b = self.pop();
        let a = self.pop();
        match (a, b) {
            (Value::Number(a), Value::Number(b)) => Ok((a, b)),
            _ => Err(RuntimeError::type_error(
                "Operands must be numbers.",
                Self::line(chunk, ip),
            )),
        }
    }

    // --- Helpers ---

    /// Line of the instruction that just executed. `ip` has already moved
    /// past the opcode, and operand bytes share their opcode's line.
    fn line(chunk: &Chunk, ip: usize) -> usize {
        chunk.lines[ip - 1]
    }

    fn read_string(chunk: &Chunk, ip: usize) -> Rc<str> {
        match chunk.read_constant(ip) {
            Value::String(s) => Rc::clone(s),
            _ => Rc::from(""),
        }
    }

    fn read_u16(chunk: &Chunk, ip: usize) -> u16 {
        ((chunk.read_byte(ip) as u16) << 8) | chunk.read_byte(ip + 1) as u16
    }

    fn trace_instruction(&self, chunk: &Chunk, ip: usize) {
        let mut repr = String::from("          ");
        for value in &self.stack {
            repr.push_str(&format!("[ {} ]", value));
        }
        repr.push('\n');
        disassembler::disassemble_instruction(chunk, ip, &mut repr);
        println!("{}", repr);
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
