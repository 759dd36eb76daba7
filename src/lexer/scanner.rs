//! Scanner for Lox source code.

use crate::error::LexerError;
use crate::lexer::token::{Token, TokenKind};

/// The scanner transforms source text into tokens, one call at a time.
///
/// Lexemes are borrowed slices of the source; nothing is copied. Once the
/// input is exhausted, every further call yields an `Eof` token, which is
/// what the compiler's one-token lookahead relies on.
pub struct Scanner<'src> {
    source: &'src str,
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    current_pos: usize,
    start_pos: usize,
    line: usize,
    start_line: usize,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            start_pos: 0,
            line: 1,
            start_line: 1,
        }
    }

    /// Scan all remaining tokens, including the trailing `Eof`.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token<'src>>, LexerError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Scan the next token.
    pub fn scan_token(&mut self) -> Result<Token<'src>, LexerError> {
        self.skip_whitespace_and_comments();
        self.mark_start();

        let Some(c) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, "", self.line));
        };

        match c {
            // Single-character tokens
            '(' => Ok(self.make_token(TokenKind::LeftParen)),
            ')' => Ok(self.make_token(TokenKind::RightParen)),
            '{' => Ok(self.make_token(TokenKind::LeftBrace)),
            '}' => Ok(self.make_token(TokenKind::RightBrace)),
            ',' => Ok(self.make_token(TokenKind::Comma)),
            '.' => Ok(self.make_token(TokenKind::Dot)),
            '-' => Ok(self.make_token(TokenKind::Minus)),
            '+' => Ok(self.make_token(TokenKind::Plus)),
            ';' => Ok(self.make_token(TokenKind::Semicolon)),
            '*' => Ok(self.make_token(TokenKind::Star)),
            // A lone slash; `//` comments were consumed with the whitespace.
            '/' => Ok(self.make_token(TokenKind::Slash)),

            // One- or two-character tokens
            '!' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::BangEqual))
                } else {
                    Ok(self.make_token(TokenKind::Bang))
                }
            }
            '=' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::EqualEqual))
                } else {
                    Ok(self.make_token(TokenKind::Equal))
                }
            }
            '<' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::LessEqual))
                } else {
                    Ok(self.make_token(TokenKind::Less))
                }
            }
            '>' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::GreaterEqual))
                } else {
                    Ok(self.make_token(TokenKind::Greater))
                }
            }

            // String literals
            '"' => self.scan_string(),

            // Numbers
            c if c.is_ascii_digit() => Ok(self.scan_number()),

            // Identifiers and keywords
            c if c.is_alphabetic() || c == '_' => Ok(self.scan_identifier()),

            _ => Err(LexerError::UnexpectedChar(c, self.line)),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.peek().is_some() && self.peek() != Some('\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Scan a string literal. No escape sequences; newlines are allowed and
    /// counted. The returned lexeme keeps its quotes.
    fn scan_string(&mut self) -> Result<Token<'src>, LexerError> {
        loop {
            match self.peek() {
                None => return Err(LexerError::UnterminatedString(self.line)),
                Some('"') => {
                    self.advance();
                    return Ok(self.make_token(TokenKind::String));
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scan a number: digits, then an optional fraction. A trailing `.` with
    /// no digit after it is left unconsumed (it is a `Dot` token).
    fn scan_number(&mut self) -> Token<'src> {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        self.make_token(TokenKind::Number)
    }

    fn scan_identifier(&mut self) -> Token<'src> {
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let kind = TokenKind::keyword(self.lexeme()).unwrap_or(TokenKind::Identifier);
        self.make_token(kind)
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.current_pos = pos + c.len_utf8();
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn mark_start(&mut self) {
        self.start_pos = self.current_pos;
        self.start_line = self.line;
    }

    fn lexeme(&self) -> &'src str {
        &self.source[self.start_pos..self.current_pos]
    }

    fn make_token(&self, kind: TokenKind) -> Token<'src> {
        Token::new(kind, self.lexeme(), self.start_line)
    }
}
