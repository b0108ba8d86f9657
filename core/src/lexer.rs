use std::collections::VecDeque;

use log::debug;

use crate::config::DEFAULT_MAX_TOKEN_LENGTH;

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    /// A lone `.`, introducing the tail of a dotted list
    Dot,
    Number(f64),
    /// Uppercased, possibly truncated symbol name
    Symbol(String),
    Eof,
}

// ============================================================================
// Lexer
// ============================================================================

/// Streaming tokenizer over any character source.
///
/// Characters are pulled lazily, so a lexer over a line editor's buffer and
/// one over a whole file behave the same. `position` counts characters
/// consumed, which lets a caller resume after an incomplete form.
pub struct Lexer<I: Iterator<Item = char>> {
    input: I,
    lookahead: VecDeque<char>,
    position: usize,
    max_token_length: usize,
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn new(input: I) -> Self {
        Self::with_max_token_length(input, DEFAULT_MAX_TOKEN_LENGTH)
    }

    pub fn with_max_token_length(input: I, max_token_length: usize) -> Self {
        Lexer {
            input,
            lookahead: VecDeque::new(),
            position: 0,
            max_token_length: max_token_length.max(1),
        }
    }

    /// Characters consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    fn peek_ahead(&mut self, n: usize) -> Option<char> {
        while self.lookahead.len() <= n {
            let c = self.input.next()?;
            self.lookahead.push_back(c);
        }
        self.lookahead.get(n).copied()
    }

    fn current_char(&mut self) -> Option<char> {
        self.peek_ahead(0)
    }

    fn advance(&mut self) -> Option<char> {
        let c = match self.lookahead.pop_front() {
            Some(c) => Some(c),
            None => self.input.next(),
        };
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if c.is_whitespace() {
                self.advance();
            } else if c == ';' {
                // Comment runs to end of line
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(c) = self.current_char() else {
            return Token::Eof;
        };

        match c {
            '(' => {
                self.advance();
                Token::LParen
            }
            ')' => {
                self.advance();
                Token::RParen
            }
            _ if self.starts_number() => self.read_number(),
            _ => self.read_symbol(),
        }
    }

    /// A digit, or a sign directly followed by a digit.
    fn starts_number(&mut self) -> bool {
        match self.current_char() {
            Some(c) if c.is_ascii_digit() => true,
            Some('+' | '-') => self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(c) = self.current_char() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
        }
    }

    /// Longest prefix of `[sign] digits [. digits] [e [sign] digits]`.
    /// Whatever follows stays in the stream.
    fn read_number(&mut self) -> Token {
        let mut text = String::new();

        if let Some(sign @ ('+' | '-')) = self.current_char() {
            text.push(sign);
            self.advance();
        }
        self.take_digits(&mut text);

        if self.current_char() == Some('.') {
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
        }

        if let Some(e @ ('e' | 'E')) = self.current_char() {
            let exponent_follows = match self.peek_ahead(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => self.peek_ahead(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if exponent_follows {
                text.push(e);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    text.push(sign);
                    self.advance();
                }
                self.take_digits(&mut text);
            }
        }

        // The scanned text is always a valid float literal
        Token::Number(text.parse().unwrap_or(0.0))
    }

    fn read_symbol(&mut self) -> Token {
        let mut name = String::new();
        let mut dropped = 0;

        while let Some(c) = self.current_char() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            if name.chars().count() < self.max_token_length {
                name.push(c.to_ascii_uppercase());
            } else {
                dropped += 1;
            }
            self.advance();
        }

        if dropped > 0 {
            debug!("symbol {name} truncated, {dropped} character(s) dropped");
        }

        if name == "." && dropped == 0 {
            Token::Dot
        } else {
            Token::Symbol(name)
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Lexer<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.next_token() {
            Token::Eof => None,
            token => Some(token),
        }
    }
}
