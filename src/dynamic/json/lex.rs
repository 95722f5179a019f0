use std::{borrow::Cow, fmt, ops::Range};

use logos::{Lexer, Logos};

#[derive(Debug, Clone, Logos, PartialEq)]
#[logos(extras = TokenExtras)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(subpattern int = r"-?(0|[1-9][0-9]*)")]
#[logos(subpattern exponent = r"[eE][+\-]?[0-9]+")]
pub(super) enum Token<'a> {
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[regex(r"(?&int)(\.[0-9]+)?(?&exponent)?", |lex| lex.slice())]
    Number(&'a str),
    #[token("\"", string)]
    String(Cow<'a, str>),
}

#[derive(Debug, Default)]
pub(super) struct TokenExtras {
    pub error: Option<LexError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum LexError {
    InvalidEscape { span: Range<usize> },
    InvalidCharacter { span: Range<usize> },
    UnterminatedString { span: Range<usize> },
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftBrace => write!(f, "'{{'"),
            Token::RightBrace => write!(f, "'}}'"),
            Token::LeftBracket => write!(f, "'['"),
            Token::RightBracket => write!(f, "']'"),
            Token::Colon => write!(f, "':'"),
            Token::Comma => write!(f, "','"),
            Token::Null => write!(f, "null"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Number(value) => write!(f, "{}", value),
            Token::String(value) => write!(f, "{:?}", value),
        }
    }
}

fn string<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Result<Cow<'a, str>, ()> {
    #[derive(Logos)]
    #[logos(subpattern hex = r"[0-9A-Fa-f]")]
    enum Component<'a> {
        #[regex(r#"[^\x00-\x1F"\\]+"#, |lex| lex.slice())]
        Unescaped(&'a str),
        #[token("\"")]
        Terminator,
        #[regex(r#"\\["\\/bfnrt]"#, char_escape)]
        Char(char),
        #[regex(r#"\\u(?&hex)(?&hex)(?&hex)(?&hex)"#, unicode_escape)]
        CodeUnit(u32),
    }

    fn char_escape<'a>(lex: &mut Lexer<'a, Component<'a>>) -> char {
        match lex.slice().as_bytes()[1] {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\x08',
            b'f' => '\x0c',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            _ => panic!("failed to parse char escape"),
        }
    }

    fn unicode_escape<'a>(lex: &mut Lexer<'a, Component<'a>>) -> Option<u32> {
        u32::from_str_radix(&lex.slice()[2..], 16).ok()
    }

    let start = lex.span().end;
    let mut value = Cow::Borrowed("");
    let mut char_lexer = Component::lexer(lex.remainder());

    loop {
        let span = |char_lexer: &Lexer<'a, Component<'a>>| {
            start + char_lexer.span().start..start + char_lexer.span().end
        };

        match char_lexer.next() {
            Some(Ok(Component::Unescaped(s))) => {
                if value.is_empty() {
                    value = Cow::Borrowed(s);
                } else {
                    value.to_mut().push_str(s);
                }
            }
            Some(Ok(Component::Terminator)) => break,
            Some(Ok(Component::Char(ch))) => value.to_mut().push(ch),
            Some(Ok(Component::CodeUnit(unit))) => {
                let escape_start = span(&char_lexer).start;
                let ch = match unit {
                    0xD800..=0xDBFF => match char_lexer.next() {
                        Some(Ok(Component::CodeUnit(low @ 0xDC00..=0xDFFF))) => {
                            char::from_u32(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))
                        }
                        _ => None,
                    },
                    _ => char::from_u32(unit),
                };
                match ch {
                    Some(ch) => value.to_mut().push(ch),
                    None => {
                        lex.extras.error = Some(LexError::InvalidEscape {
                            span: escape_start..span(&char_lexer).end,
                        });
                        return Err(());
                    }
                }
            }
            Some(Err(())) => {
                let span = span(&char_lexer);
                if char_lexer.slice().starts_with('\\') {
                    lex.extras.error = Some(LexError::InvalidEscape { span });
                } else {
                    lex.extras.error = Some(LexError::InvalidCharacter { span });
                }
                return Err(());
            }
            None => {
                lex.extras.error = Some(LexError::UnterminatedString {
                    span: start - 1..lex.source().len(),
                });
                return Err(());
            }
        }
    }

    lex.bump(char_lexer.span().end);
    Ok(value)
}
