use crate::config::DEFAULT_MAX_TOKEN_LENGTH;
use crate::error::{Error, Result};
use crate::language::Value;
use crate::lexer::{Lexer, Token};
use crate::runtime::Runtime;

// ============================================================================
// Reader
// ============================================================================

/// Lists nested deeper than this are rejected, which bounds the reader's
/// recursion.
pub const MAX_NESTING: usize = 512;

/// Recursive-descent reader producing heap data, one top-level form at a time.
pub struct Reader<I: Iterator<Item = char>> {
    lexer: Lexer<I>,
    /// Lists opened and not yet closed in the current form
    depth: usize,
}

impl<I: Iterator<Item = char>> Reader<I> {
    pub fn new(input: I) -> Self {
        Self::with_max_token_length(input, DEFAULT_MAX_TOKEN_LENGTH)
    }

    pub fn with_max_token_length(input: I, max_token_length: usize) -> Self {
        Reader {
            lexer: Lexer::with_max_token_length(input, max_token_length),
            depth: 0,
        }
    }

    /// Characters consumed so far. After a successful `read_one` this is the
    /// end of the form just read.
    pub fn offset(&self) -> usize {
        self.lexer.position()
    }

    /// Read the next form. `Ok(None)` means the input ended cleanly between
    /// forms; ending inside a list is `UnexpectedEnd`.
    ///
    /// After an error the rest of the broken form is discarded, so the next
    /// call starts at the following top-level form.
    pub fn read_one(&mut self, rt: &mut Runtime) -> Result<Option<Value>> {
        self.depth = 0;
        let result = match self.lexer.next_token() {
            Token::Eof => Ok(None),
            token => self.datum(rt, token).map(Some),
        };
        if result.is_err() {
            self.skip_rest_of_form();
        }
        result
    }

    /// Drop tokens until every list left open by a failed read is closed.
    fn skip_rest_of_form(&mut self) {
        while self.depth > 0 {
            match self.lexer.next_token() {
                Token::LParen => self.depth += 1,
                Token::RParen => self.depth -= 1,
                Token::Eof => break,
                _ => {}
            }
        }
        self.depth = 0;
    }

    fn read_datum(&mut self, rt: &mut Runtime) -> Result<Value> {
        let token = self.lexer.next_token();
        self.datum(rt, token)
    }

    fn datum(&mut self, rt: &mut Runtime, token: Token) -> Result<Value> {
        match token {
            Token::Number(n) if !n.is_finite() => {
                Err(Error::syntax("number literal out of range"))
            }
            Token::Number(n) => rt.number(n),
            Token::Symbol(name) if name == "NIL" => Ok(Value::Nil),
            Token::Symbol(name) => {
                let id = rt.intern(&name)?;
                rt.symbol(id)
            }
            Token::LParen => {
                self.depth += 1;
                if self.depth > MAX_NESTING {
                    return Err(Error::syntax(format!(
                        "lists nested deeper than {MAX_NESTING}"
                    )));
                }
                let slot = rt.roots.len();
                rt.roots.push(Value::Nil);
                let list = self.list(rt, slot);
                rt.roots.truncate(slot);
                list
            }
            Token::RParen => {
                // Closes the list this datum was meant to finish
                self.depth = self.depth.saturating_sub(1);
                Err(Error::syntax("unexpected )"))
            }
            Token::Dot => Err(Error::syntax("unexpected .")),
            Token::Eof => Err(Error::unexpected_end()),
        }
    }

    /// Elements up to the matching `)`, with `(a . b)` tails. The list head
    /// is pinned in `rt.roots[slot]` while it grows.
    fn list(&mut self, rt: &mut Runtime, slot: usize) -> Result<Value> {
        let mut head = Value::Nil;
        let mut tail = Value::Nil;

        loop {
            match self.lexer.next_token() {
                Token::RParen => {
                    self.depth -= 1;
                    return Ok(head);
                }
                Token::Eof => return Err(Error::unexpected_end()),
                Token::Dot => {
                    if head.is_nil() {
                        return Err(Error::syntax(". with nothing before it"));
                    }
                    let last = self.read_datum(rt)?;
                    rt.set_rest(tail, last)?;
                    return match self.lexer.next_token() {
                        Token::RParen => {
                            self.depth -= 1;
                            Ok(head)
                        }
                        Token::Eof => Err(Error::unexpected_end()),
                        token => {
                            if token == Token::LParen {
                                self.depth += 1;
                            }
                            Err(Error::syntax("more than one datum after ."))
                        }
                    };
                }
                token => {
                    let value = self.datum(rt, token)?;
                    let pair = rt.cons(value, Value::Nil)?;
                    if head.is_nil() {
                        head = pair;
                        rt.roots[slot] = head;
                    } else {
                        rt.set_rest(tail, pair)?;
                    }
                    tail = pair;
                }
            }
        }
    }
}

/// Read the first form of `input`.
pub fn parse(rt: &mut Runtime, input: &str) -> Result<Value> {
    let mut reader = rt.reader(input);
    reader.read_one(rt)?.ok_or_else(Error::unexpected_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ErrorKind;

    fn read(rt: &mut Runtime, input: &str) -> String {
        let value = parse(rt, input).unwrap();
        rt.display(value).to_string()
    }

    #[test]
    fn test_atoms() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        assert_eq!(read(&mut rt, "42"), "42");
        assert_eq!(read(&mut rt, "-1.5"), "-1.5");
        assert_eq!(read(&mut rt, "foo"), "FOO");
        assert_eq!(read(&mut rt, "nil"), "NIL");
    }

    #[test]
    fn test_lists() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        assert_eq!(read(&mut rt, "()"), "NIL");
        assert_eq!(read(&mut rt, "(a b c)"), "(A B C)");
        assert_eq!(read(&mut rt, "(a (b (c)) d)"), "(A (B (C)) D)");
    }

    #[test]
    fn test_dotted() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        assert_eq!(read(&mut rt, "(a . b)"), "(A . B)");
        assert_eq!(read(&mut rt, "(a b . c)"), "(A B . C)");
        assert_eq!(read(&mut rt, "(a . (b c))"), "(A B C)");
    }

    #[test]
    fn test_malformed_dots() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        for input in ["(. a)", "(a . b c)", "(a . )", "."] {
            let err = parse(&mut rt, input).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Syntax, "input {input}");
        }
    }

    #[test]
    fn test_stray_close_paren() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        assert_eq!(parse(&mut rt, ")").unwrap_err().kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_unexpected_end() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        assert_eq!(parse(&mut rt, "(a b").unwrap_err().kind, ErrorKind::UnexpectedEnd);
        assert_eq!(parse(&mut rt, "(a .").unwrap_err().kind, ErrorKind::UnexpectedEnd);
        assert_eq!(parse(&mut rt, "").unwrap_err().kind, ErrorKind::UnexpectedEnd);
        assert_eq!(rt.pinned(), 0);
    }

    #[test]
    fn test_clean_end_between_forms() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        let mut reader = rt.reader("1 (2)  ; done\n");
        assert!(reader.read_one(&mut rt).unwrap().is_some());
        assert!(reader.read_one(&mut rt).unwrap().is_some());
        assert_eq!(reader.read_one(&mut rt).unwrap(), None);
    }

    #[test]
    fn test_offset_marks_form_end() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        let mut reader = rt.reader("(a) (b");
        reader.read_one(&mut rt).unwrap();
        assert_eq!(reader.offset(), 3);
        let err = reader.read_one(&mut rt).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_error_skips_rest_of_form() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        let mut reader = rt.reader("(quote (a . b (label leaked 42))) next (x . ) after");
        let err = reader.read_one(&mut rt).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        let next = reader.read_one(&mut rt).unwrap().unwrap();
        assert_eq!(rt.display(next).to_string(), "NEXT");

        // The `)` after the dot closes its list
        assert!(reader.read_one(&mut rt).is_err());
        let after = reader.read_one(&mut rt).unwrap().unwrap();
        assert_eq!(rt.display(after).to_string(), "AFTER");
    }

    #[test]
    fn test_out_of_range_literals() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        for input in ["1e400", "-1e400", "(1 2e999)"] {
            let err = parse(&mut rt, input).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Syntax, "input {input}");
        }
        let largest = parse(&mut rt, "1.7976931348623157e308").unwrap();
        assert_eq!(rt.number_value(largest).unwrap(), Some(f64::MAX));
    }

    #[test]
    fn test_nesting_limit() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        let deep = format!("{}{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(parse(&mut rt, &deep).is_ok());

        let too_deep = "(".repeat(100_000);
        let mut reader = rt.reader(&too_deep);
        let err = reader.read_one(&mut rt).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(reader.read_one(&mut rt).unwrap(), None);
        assert_eq!(rt.pinned(), 0);
    }

    #[test]
    fn test_symbols_are_interned_once() {
        let mut rt = Runtime::new(Config::default()).unwrap();
        let before = rt.symbols().len();
        parse(&mut rt, "(zed zed zed)").unwrap();
        assert_eq!(rt.symbols().len(), before + 1);
    }
}
