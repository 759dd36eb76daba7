//! Error types for all phases of the pipeline.

use std::fmt;

use thiserror::Error;

/// Scanner errors.
///
/// The compiler converts these into [`CompileError`]s as it pulls tokens, so
/// they never cross the library boundary on their own.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LexerError {
    #[error("Unexpected character.")]
    UnexpectedChar(char, usize),

    #[error("Unterminated string.")]
    UnterminatedString(usize),
}

impl LexerError {
    pub fn line(&self) -> usize {
        match self {
            Self::UnexpectedChar(_, line) => *line,
            Self::UnterminatedString(line) => *line,
        }
    }
}

/// A single compile-time diagnostic, anchored to a source line and token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error{at}: {message}")]
pub struct CompileError {
    pub line: usize,
    /// Rendered anchor: ` at 'lexeme'`, ` at end`, or empty for scanner errors.
    pub at: String,
    pub message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            line,
            at: String::new(),
            message: message.into(),
        }
    }

    pub fn at_token(message: impl Into<String>, lexeme: &str, line: usize) -> Self {
        Self {
            line,
            at: format!(" at '{}'", lexeme),
            message: message.into(),
        }
    }

    pub fn at_end(message: impl Into<String>, line: usize) -> Self {
        Self {
            line,
            at: " at end".to_string(),
            message: message.into(),
        }
    }
}

impl From<LexerError> for CompileError {
    fn from(err: LexerError) -> Self {
        Self::new(err.to_string(), err.line())
    }
}

/// Every diagnostic produced by one compilation, in source order.
///
/// The compiler keeps parsing after an error (panic-mode recovery), so a
/// single run can report several of these.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileErrors(pub Vec<CompileError>);

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}

/// Runtime errors raised by the VM.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'.\n[line {line}] in script")]
    UndefinedVariable { name: String, line: usize },

    #[error("{message}\n[line {line}] in script")]
    Type { message: String, line: usize },

    #[error("Unknown opcode {opcode}.\n[line {line}] in script")]
    UnknownOpcode { opcode: u8, line: usize },
}

impl RuntimeError {
    pub fn undefined_variable(name: impl Into<String>, line: usize) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            line,
        }
    }

    pub fn type_error(message: impl Into<String>, line: usize) -> Self {
        Self::Type {
            message: message.into(),
            line,
        }
    }

    pub fn unknown_opcode(opcode: u8, line: usize) -> Self {
        Self::UnknownOpcode { opcode, line }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::UndefinedVariable { line, .. } => *line,
            Self::Type { line, .. } => *line,
            Self::UnknownOpcode { line, .. } => *line,
        }
    }
}

/// A unified error type for all phases.
#[derive(Debug, Error)]
pub enum LoxError {
    #[error("{0}")]
    Compile(#[from] CompileErrors),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoxError {
    /// Process exit code convention: 65 compile, 70 runtime, 74 filesystem.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Compile(_) => 65,
            Self::Runtime(_) => 70,
            Self::Io(_) => 74,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        let err = CompileError::at_token("Expect expression.", "+", 3);
        assert_eq!(err.to_string(), "[line 3] Error at '+': Expect expression.");

        let err = CompileError::at_end("Expect '}' after block.", 7);
        assert_eq!(
            err.to_string(),
            "[line 7] Error at end: Expect '}' after block."
        );
    }

    #[test]
    fn test_lexer_error_conversion() {
        let err: CompileError = LexerError::UnterminatedString(2).into();
        assert_eq!(err.to_string(), "[line 2] Error: Unterminated string.");
    }

    #[test]
    fn test_runtime_error_display() {
        let err = RuntimeError::type_error("Operand must be a number.", 1);
        assert_eq!(
            err.to_string(),
            "Operand must be a number.\n[line 1] in script"
        );
    }

    #[test]
    fn test_exit_codes() {
        let compile: LoxError = CompileErrors(vec![CompileError::new("bad", 1)]).into();
        let runtime: LoxError = RuntimeError::type_error("bad", 1).into();
        assert_eq!(compile.exit_code(), 65);
        assert_eq!(runtime.exit_code(), 70);
    }
}
