use std::{borrow::Cow, ops::Range};

use logos::{Lexer, Logos};

use crate::Error;

use super::lex::{LexError, Token};

const MAX_DEPTH: usize = 100;

/// A pull-based reader over a JSON document with one token of lookahead.
///
/// Structural tokens are asserted by [`begin_object`](Self::begin_object),
/// [`next_key`](Self::next_key), [`end_object`](Self::end_object) and their array equivalents,
/// which also check the commas and colons between members.
pub(super) struct JsonReader<'a> {
    lexer: Lexer<'a, Token<'a>>,
    peeked: Option<(Token<'a>, Range<usize>)>,
    stack: Vec<Frame>,
    consumed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object { first: bool },
    Array { first: bool },
}

impl<'a> JsonReader<'a> {
    pub(super) fn new(source: &'a str) -> Self {
        JsonReader {
            lexer: Token::lexer(source),
            peeked: None,
            stack: Vec::new(),
            consumed: 0,
        }
    }

    /// Gets the next token without consuming it, or `None` at the end of the input.
    pub(super) fn peek(&mut self) -> Result<Option<&Token<'a>>, Error> {
        if self.peeked.is_none() {
            self.peeked = match self.lexer.next() {
                Some(Ok(token)) => Some((token, self.lexer.span())),
                Some(Err(())) => return Err(self.lex_error()),
                None => None,
            };
        }
        Ok(self.peeked.as_ref().map(|(token, _)| token))
    }

    /// Consumes the next token. `expected` describes the token wanted at this point, and is
    /// reported if the input has ended.
    pub(super) fn poll(&mut self, expected: &str) -> Result<(Token<'a>, Range<usize>), Error> {
        self.peek()?;
        match self.peeked.take() {
            Some((token, span)) => {
                self.consumed = span.end;
                Ok((token, span))
            }
            None => Err(self.unexpected_eof(expected)),
        }
    }

    pub(super) fn peek_null(&mut self) -> Result<bool, Error> {
        Ok(matches!(self.peek()?, Some(Token::Null)))
    }

    pub(super) fn peek_object(&mut self) -> Result<bool, Error> {
        Ok(matches!(self.peek()?, Some(Token::LeftBrace)))
    }

    pub(super) fn peek_array(&mut self) -> Result<bool, Error> {
        Ok(matches!(self.peek()?, Some(Token::LeftBracket)))
    }

    pub(super) fn begin_object(&mut self) -> Result<(), Error> {
        self.expect(Token::LeftBrace, "'{'")?;
        self.push(Frame::Object { first: true })
    }

    /// Reads the key of the next member of the current object, or returns `None` if the next
    /// token closes the object. The closing brace is left for [`end_object`](Self::end_object).
    pub(super) fn next_key(&mut self) -> Result<Option<(Cow<'a, str>, Range<usize>)>, Error> {
        let first = match self.stack.last_mut() {
            Some(Frame::Object { first }) => std::mem::replace(first, false),
            _ => panic!("next_key called outside of an object"),
        };

        if matches!(self.peek()?, Some(Token::RightBrace)) {
            return Ok(None);
        }
        if !first {
            self.expect(Token::Comma, "',' or '}'")?;
        }

        match self.poll("field name")? {
            (Token::String(key), span) => {
                self.expect(Token::Colon, "':'")?;
                Ok(Some((key, span)))
            }
            (token, span) => Err(Error::malformed_json("field name", token, span)),
        }
    }

    pub(super) fn end_object(&mut self) -> Result<(), Error> {
        self.expect(Token::RightBrace, "'}'")?;
        self.stack.pop();
        Ok(())
    }

    pub(super) fn begin_array(&mut self) -> Result<(), Error> {
        self.expect(Token::LeftBracket, "'['")?;
        self.push(Frame::Array { first: true })
    }

    /// Returns `true` if another element follows in the current array, consuming the comma
    /// before it. The closing bracket is left for [`end_array`](Self::end_array).
    pub(super) fn has_next(&mut self) -> Result<bool, Error> {
        let first = match self.stack.last_mut() {
            Some(Frame::Array { first }) => std::mem::replace(first, false),
            _ => panic!("has_next called outside of an array"),
        };

        if matches!(self.peek()?, Some(Token::RightBracket)) {
            return Ok(false);
        }
        if !first {
            self.expect(Token::Comma, "',' or ']'")?;
        }
        Ok(true)
    }

    pub(super) fn end_array(&mut self) -> Result<(), Error> {
        self.expect(Token::RightBracket, "']'")?;
        self.stack.pop();
        Ok(())
    }

    /// Consumes a complete value of any shape.
    pub(super) fn skip_value(&mut self) -> Result<(), Error> {
        if self.peek_object()? {
            self.begin_object()?;
            while self.next_key()?.is_some() {
                self.skip_value()?;
            }
            self.end_object()
        } else if self.peek_array()? {
            self.begin_array()?;
            while self.has_next()? {
                self.skip_value()?;
            }
            self.end_array()
        } else {
            match self.poll("value")? {
                (
                    Token::Null | Token::True | Token::False | Token::Number(_) | Token::String(_),
                    _,
                ) => Ok(()),
                (token, span) => Err(Error::malformed_json("value", token, span)),
            }
        }
    }

    /// Checks that nothing but whitespace follows the value that was read.
    pub(super) fn finish(self) -> Result<(), Error> {
        debug_assert!(self.stack.is_empty());

        let source = self.lexer.source();
        let rest = &source[self.consumed..];
        let remainder = rest.trim();
        if remainder.is_empty() {
            Ok(())
        } else {
            let start = self.consumed + (rest.len() - rest.trim_start().len());
            Err(Error::trailing_data(
                remainder,
                start..start + remainder.len(),
            ))
        }
    }

    fn expect(&mut self, expected: Token<'static>, description: &str) -> Result<(), Error> {
        let (token, span) = self.poll(description)?;
        if token == expected {
            Ok(())
        } else {
            Err(Error::malformed_json(description, token, span))
        }
    }

    fn push(&mut self, frame: Frame) -> Result<(), Error> {
        if self.stack.len() >= MAX_DEPTH {
            let span = self.consumed - 1..self.consumed;
            return Err(Error::malformed_json(
                format!("at most {} levels of nesting", MAX_DEPTH),
                "a deeper value",
                span,
            ));
        }
        self.stack.push(frame);
        Ok(())
    }

    fn unexpected_eof(&self, expected: &str) -> Error {
        let end = self.lexer.source().len();
        Error::malformed_json(expected, "end of input", end..end)
    }

    fn lex_error(&mut self) -> Error {
        let source = self.lexer.source();
        match self.lexer.extras.error.take() {
            Some(LexError::InvalidEscape { span }) => Error::malformed_json(
                "a valid escape sequence",
                format!("'{}'", &source[span.clone()]),
                span,
            ),
            Some(LexError::InvalidCharacter { span }) => Error::malformed_json(
                "a string character",
                format!("{:?}", &source[span.clone()]),
                span,
            ),
            Some(LexError::UnterminatedString { span }) => {
                Error::malformed_json("'\"'", "end of input", span)
            }
            None => Error::malformed_json(
                "a JSON token",
                format!("'{}'", self.lexer.slice()),
                self.lexer.span(),
            ),
        }
    }
}
