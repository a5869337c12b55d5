/* Copyright (c) 2022-2023 Jeremy Davis (jeremydavis519@gmail.com)
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the "Software"), to deal in the Software without restriction,
 * including without limitation the rights to use, copy, modify, merge, publish, distribute,
 * sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all copies or
 * substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
 * NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 */

//! This module turns IDL source text into tokens. Tokens are produced one at a time, on demand,
//! with at most one token of lookahead.
//!
//! Whitespace and comments never become tokens. A `/** ... */` comment is remembered instead and
//! attached to whatever token comes next, which is how definitions and members get their
//! documentation.

use {
    std::fmt,
    nom::{
        IResult,
        bytes::complete::{tag, take_till, take_until, take_while},
        branch::alt,
        character::complete::{char, one_of, satisfy},
        combinator::{opt, recognize},
        multi::many1_count,
        sequence::{delimited, pair, preceded, tuple},
    },
    crate::{
        ast::DebugInfo,
        error::{SourceLocation, SyntaxError, SyntaxErrorKind},
        literal::{self, Number},
    },
};

macro_rules! keywords {
    ($($variant:ident => $text:expr,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }

            pub fn from_word(word: &str) -> Option<Self> {
                match word {
                    $($text => Some(Keyword::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

keywords! {
    Any => "any",
    Attribute => "attribute",
    Callback => "callback",
    Const => "const",
    Deleter => "deleter",
    Dictionary => "dictionary",
    Enum => "enum",
    False => "false",
    Getter => "getter",
    Includes => "includes",
    Inherit => "inherit",
    Interface => "interface",
    Iterable => "iterable",
    Maplike => "maplike",
    Namespace => "namespace",
    Null => "null",
    Optional => "optional",
    Partial => "partial",
    Required => "required",
    Sequence => "sequence",
    Setlike => "setlike",
    Setter => "setter",
    Static => "static",
    Stringifier => "stringifier",
    True => "true",
    Typedef => "typedef",
    Void => "void",

    Boolean => "boolean",
    Byte => "byte",
    Double => "double",
    Float => "float",
    Long => "long",
    Short => "short",
    Octet => "octet",
    Unrestricted => "unrestricted",
    Unsigned => "unsigned",
    Record => "record",

    ByteString => "ByteString",
    DomString => "DOMString",
    FrozenArray => "FrozenArray",
    Promise => "Promise",
    UsvString => "USVString",
}

impl Keyword {
    // https://webidl.spec.whatwg.org/#index-prod-ArgumentNameKeyword
    /// Whether this keyword may be used as the name of an argument.
    pub fn is_argument_name(self) -> bool {
        matches!(
            self,
            Self::Attribute | Self::Callback | Self::Const | Self::Deleter | Self::Dictionary
                | Self::Enum | Self::Getter | Self::Includes | Self::Inherit | Self::Interface
                | Self::Iterable | Self::Maplike | Self::Namespace | Self::Partial
                | Self::Required | Self::Setlike | Self::Setter | Self::Static
                | Self::Stringifier | Self::Typedef | Self::Unrestricted
        )
    }

    // https://webidl.spec.whatwg.org/#index-prod-StringType
    pub fn is_string_type(self) -> bool {
        matches!(self, Self::ByteString | Self::DomString | Self::UsvString)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Question,
    LAngle,
    RAngle,
    LBracket,
    RBracket,
    Equals,
    Minus,
    Colon,
    Dot,
    Ellipsis,
    Keyword(Keyword),
    Identifier,
    StringLiteral,
    IntegerLiteral,
    FloatLiteral,
}

impl TokenKind {
    fn punctuation(c: char) -> Option<Self> {
        Some(match c {
            '{' => Self::LBrace,
            '}' => Self::RBrace,
            '(' => Self::LParen,
            ')' => Self::RParen,
            ',' => Self::Comma,
            ';' => Self::Semicolon,
            '?' => Self::Question,
            '<' => Self::LAngle,
            '>' => Self::RAngle,
            '[' => Self::LBracket,
            ']' => Self::RBracket,
            '=' => Self::Equals,
            ':' => Self::Colon,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Question => "?",
            Self::LAngle => "<",
            Self::RAngle => ">",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Equals => "=",
            Self::Minus => "-",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Ellipsis => "...",
            Self::Keyword(k) => k.as_str(),
            Self::Identifier => "IDENTIFIER",
            Self::StringLiteral => "STRING_LITERAL",
            Self::IntegerLiteral => "INTEGER_LITERAL",
            Self::FloatLiteral => "FLOAT_LITERAL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Int(i128),
    Float(f64),
    /// The name of an identifier or the contents of a string literal.
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    /// Exactly what was in the source.
    pub text: String,
    /// The byte offset of the token in the source.
    pub offset: usize,
    pub span: DebugInfo,
    /// The doc comment that came right before this token, if any.
    pub doc: Option<String>,
    pub doc_span: Option<DebugInfo>,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// The text of an identifier or string literal.
    pub fn str_value(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// How the token is named in error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("identifier \"{}\"", self.text),
            TokenKind::StringLiteral | TokenKind::IntegerLiteral | TokenKind::FloatLiteral => {
                self.kind.to_string()
            },
            _ => self.text.clone(),
        }
    }
}

/// Reads tokens out of one source file at a time.
///
/// A lexer can be reused for any number of files; [`Lexer::set_contents`] starts over.
#[derive(Debug, Default)]
pub struct Lexer {
    filename: String,
    contents: String,
    pos: usize,
    line: u32,
    col: u32,
    peeked: Option<Token>,
    doc: Option<(String, DebugInfo)>,
    stray_docs: Vec<DebugInfo>,
}

impl Lexer {
    pub fn new() -> Self {
        Self {
            line: 1,
            col: 1,
            ..Self::default()
        }
    }

    pub fn set_contents(&mut self, filename: &str, contents: &str) {
        self.filename = String::from(filename);
        self.contents = String::from(contents);
        self.pos = 0;
        self.line = 1;
        self.col = 1;
        self.peeked = None;
        self.doc = None;
        self.stray_docs.clear();
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the next token without consuming it. Calling this repeatedly returns the same
    /// token.
    pub fn peek(&mut self) -> Result<Option<&Token>, SyntaxError> {
        if self.peeked.is_none() {
            self.peeked = self.scan()?;
        }
        Ok(self.peeked.as_ref())
    }

    pub fn peek_kind(&mut self) -> Result<Option<TokenKind>, SyntaxError> {
        Ok(self.peek()?.map(|t| t.kind))
    }

    pub fn peek_is(&mut self, kind: TokenKind) -> Result<bool, SyntaxError> {
        Ok(self.peek_kind()? == Some(kind))
    }

    /// Consumes and returns the next token, or `None` at the end of the file.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Token>, SyntaxError> {
        self.peek()?;
        let token = self.peeked.take();
        if let Some(token) = &token {
            if let Some(span) = &token.doc_span {
                self.stray_docs.push(span.clone());
            }
            self.advance(token.text.len());
            log::trace!("{}:{}:{}: {}", self.filename, token.span.line, token.span.col, token.kind);
        }
        Ok(token)
    }

    /// Takes the doc comment attached to the next token, if there is one. A doc comment that
    /// isn't taken before its token is consumed is remembered as a stray.
    pub fn claim_doc(&mut self) -> Result<Option<(String, DebugInfo)>, SyntaxError> {
        self.peek()?;
        Ok(self.peeked.as_mut().and_then(|token| match (token.doc.take(), token.doc_span.take()) {
            (Some(doc), Some(span)) => Some((doc, span)),
            _ => None,
        }))
    }

    /// Returns the positions of the doc comments that were consumed without being claimed, or
    /// that had no token after them, since the last call.
    pub fn take_stray_docs(&mut self) -> Vec<DebugInfo> {
        std::mem::take(&mut self.stray_docs)
    }

    /// Consumes the next token if it's the given kind, or returns an error if it isn't.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        let eof = || format!("Unexpected EOF looking for {}", kind);
        let found = self.peek()?.map(|t| (t.kind, t.describe(), t.span.clone()));
        match found {
            None => Err(self.error_here(SyntaxErrorKind::Grammar, eof())),
            Some((found, description, span)) if found != kind => {
                let message = format!("Expecting {}, got {}", kind, description);
                Err(SyntaxError::new(SyntaxErrorKind::Grammar, message, self.location_of(&span)))
            },
            Some(_) => self.next()?.ok_or_else(|| self.error_here(SyntaxErrorKind::Grammar, eof())),
        }
    }

    /// Consumes the next token if it's the given kind. Returns whether it did.
    pub fn read_if(&mut self, kind: TokenKind) -> Result<bool, SyntaxError> {
        if self.peek_is(kind)? {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Returns the full line of text that contains the given byte offset.
    pub fn get_line(&self, offset: usize) -> &str {
        let offset = offset.min(self.contents.len());
        let start = self.contents[.. offset].rfind('\n').map_or(0, |i| i + 1);
        let end = self.contents[offset ..].find('\n').map_or(self.contents.len(), |i| offset + i);
        &self.contents[start .. end]
    }

    /// Returns the 1-based column of the given byte offset.
    pub fn get_col(&self, offset: usize) -> u32 {
        let offset = offset.min(self.contents.len());
        let start = self.contents[.. offset].rfind('\n').map_or(0, |i| i + 1);
        self.contents[start .. offset].chars().count() as u32 + 1
    }

    /// The position just past the last thing read, which is the end of the file once every
    /// token has been consumed.
    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            filename: self.filename.clone(),
            line: self.line,
            col: self.col,
            line_text: String::from(self.get_line(self.pos)),
        }
    }

    pub fn location_of(&self, span: &DebugInfo) -> SourceLocation {
        SourceLocation {
            filename: self.filename.clone(),
            line: span.line,
            col: span.col,
            line_text: span.line_text.clone(),
        }
    }

    fn error_here(&self, kind: SyntaxErrorKind, message: String) -> SyntaxError {
        SyntaxError::new(kind, message, self.location())
    }

    fn debug_here(&self) -> DebugInfo {
        DebugInfo {
            line: self.line,
            col: self.col,
            line_text: String::from(self.get_line(self.pos)),
        }
    }

    fn rest(&self) -> &str {
        &self.contents[self.pos ..]
    }

    fn advance(&mut self, len: usize) {
        let read = &self.contents[self.pos .. self.pos + len];
        match read.rfind('\n') {
            Some(i) => {
                self.line += read.matches('\n').count() as u32;
                self.col = read[i + 1 ..].chars().count() as u32 + 1;
            },
            None => self.col += read.chars().count() as u32,
        };
        self.pos += len;
    }

    fn scan(&mut self) -> Result<Option<Token>, SyntaxError> {
        self.skip_whitespace_and_comments()?;

        let rest = self.rest();
        let c = match rest.chars().next() {
            Some(c) => c,
            None => {
                if let Some((_, span)) = self.doc.take() {
                    self.stray_docs.push(span);
                }
                return Ok(None);
            },
        };

        let (kind, value, len) = if rest.starts_with("...") {
            (TokenKind::Ellipsis, TokenValue::None, 3)
        } else if let Some(kind) = TokenKind::punctuation(c) {
            (kind, TokenValue::None, 1)
        } else if c == '"' {
            self.scan_string()?
        } else if c.is_ascii_digit() || c == '-' || c == '.' {
            self.scan_number()?
        } else if let Ok((_, name)) = identifier(rest) {
            match literal::parse_number(name).filter(|_| literal::is_numeric_word(name)) {
                Some(Number::Float(f)) => (TokenKind::FloatLiteral, TokenValue::Float(f), name.len()),
                _ => {
                    let kind = Keyword::from_word(name).map_or(TokenKind::Identifier, TokenKind::Keyword);
                    (kind, TokenValue::Str(String::from(name)), name.len())
                },
            }
        } else {
            return Err(self.error_here(SyntaxErrorKind::Lex, format!("Unexpected character '{}'", c)));
        };

        let (doc, doc_span) = match self.doc.take() {
            Some((doc, span)) => (Some(doc), Some(span)),
            None => (None, None),
        };
        Ok(Some(Token {
            kind,
            value,
            text: String::from(&self.rest()[.. len]),
            offset: self.pos,
            span: self.debug_here(),
            doc,
            doc_span,
        }))
    }

    fn scan_string(&self) -> Result<(TokenKind, TokenValue, usize), SyntaxError> {
        let rest = self.rest();
        let (after, body) = string_body(rest)
            .map_err(|_| self.error_here(SyntaxErrorKind::Lex, String::from("Unexpected EOF in string literal")))?;
        match after.chars().next() {
            Some('"') => Ok((TokenKind::StringLiteral, TokenValue::Str(String::from(body)), body.len() + 2)),
            Some(_) => Err(self.error_here(SyntaxErrorKind::Lex, String::from("Newline in string literal"))),
            None => Err(self.error_here(SyntaxErrorKind::Lex, String::from("Unexpected EOF in string literal"))),
        }
    }

    fn scan_number(&self) -> Result<(TokenKind, TokenValue, usize), SyntaxError> {
        let word = number_word(self.rest()).map_or("", |(_, word)| word);
        match word {
            "-" => return Ok((TokenKind::Minus, TokenValue::None, 1)),
            "." => return Ok((TokenKind::Dot, TokenValue::None, 1)),
            _ => {},
        };
        match literal::parse_number(word) {
            Some(Number::Int(i)) => Ok((TokenKind::IntegerLiteral, TokenValue::Int(i), word.len())),
            Some(Number::Float(f)) => Ok((TokenKind::FloatLiteral, TokenValue::Float(f), word.len())),
            None => Err(self.error_here(SyntaxErrorKind::Lex, String::from("Invalid number format"))),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), SyntaxError> {
        // Whitespace since the last newline. It's kept as part of a doc comment so the comment's
        // indentation is preserved.
        let mut indent = String::new();
        loop {
            let rest = self.rest();
            let c = match rest.chars().next() {
                Some(c) => c,
                None => return Ok(()),
            };

            if c.is_ascii_whitespace() {
                if c == '\n' {
                    indent.clear();
                } else {
                    indent.push(c);
                }
                self.advance(c.len_utf8());
            } else if let Ok((_, comment)) = line_comment(rest) {
                let len = comment.len();
                self.advance(len);
                indent.clear();
            } else if rest.starts_with("/*") {
                let comment = match block_comment(rest) {
                    Ok((_, comment)) => comment,
                    Err(_) => return Err(self.error_here(SyntaxErrorKind::Lex, String::from("Unexpected EOF in comment"))),
                };
                let doc = if comment != "/**/" && comment.starts_with("/**") {
                    Some((indent.clone() + comment, self.debug_here()))
                } else {
                    None
                };
                let len = comment.len();
                self.doc = doc;
                self.advance(len);
                indent.clear();
            } else {
                return Ok(());
            }
        }
    }
}

// https://webidl.spec.whatwg.org/#prod-identifier
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('_')),
        satisfy(|c| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    )))(input)
}

/// Everything that could be part of a number. The whole word has to be a valid number, so that
/// something like `3x52` is an error rather than a number followed by an identifier. A `+` only
/// belongs to the word as the sign of an exponent.
fn number_word(input: &str) -> IResult<&str, &str> {
    recognize(many1_count(alt((
        recognize(pair(one_of("Ee"), char('+'))),
        recognize(satisfy(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')),
    ))))(input)
}

// https://webidl.spec.whatwg.org/#prod-string
// Escapes aren't processed, so a backslash is just a character.
fn string_body(input: &str) -> IResult<&str, &str> {
    preceded(char('"'), take_till(|c| c == '"' || c == '\n'))(input)
}

// https://webidl.spec.whatwg.org/#prod-comment
fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), take_till(|c| c == '\n')))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(delimited(tag("/*"), take_until("*/"), tag("*/")))(input)
}
