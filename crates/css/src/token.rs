//! CSS tokens and a tokenizer for selector text.
//!
//! Follows CSS Syntax Level 3 for the token kinds a selector prelude can
//! contain. Braces, semicolons and at-keywords have no meaning inside a
//! selector and come out as `Delim`s, which the parser then rejects.

use std::fmt;

use crate::selector::{Combinator, NamespaceConstraint};

/// CSS token types, plus the composite kinds the selector parser synthesizes.
#[derive(Debug, Clone, PartialEq)]
pub enum CssToken {
    Ident(String),
    Function(String),
    Hash { value: String, is_id: bool },
    String(String),
    /// `signed` records an explicit `+` or `-`, which `An+B` syntax needs.
    Number {
        value: f64,
        is_integer: bool,
        signed: bool,
    },
    Percentage(f64),
    Dimension { value: f64, unit: String },
    Whitespace,
    Colon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    /// `~=`
    IncludeMatch,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// `||`
    Column,
    Delim(char),
    EOF,

    // -- synthesized by the selector pre-pass --------------------------------
    /// `ns|`, `*|` or a bare `|`.
    NamespacePrefix(NamespaceConstraint),
    /// A namespace prefix fused with the local name that follows it.
    /// `local_name` is `None` for `ns|*`.
    QualifiedName {
        namespace: NamespaceConstraint,
        local_name: Option<String>,
    },
    Combinator(Combinator),
}

impl CssToken {
    pub fn is_eof(&self) -> bool {
        matches!(self, CssToken::EOF)
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, CssToken::Whitespace)
    }
}

impl fmt::Display for CssToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssToken::Ident(name) => f.write_str(name),
            CssToken::Function(name) => write!(f, "{name}("),
            CssToken::Hash { value, .. } => write!(f, "#{value}"),
            CssToken::String(value) => write_css_string(f, value),
            CssToken::Number { value, signed, .. } if *signed && *value >= 0.0 => {
                write!(f, "+{value}")
            }
            CssToken::Number { value, .. } => write!(f, "{value}"),
            CssToken::Percentage(value) => write!(f, "{value}%"),
            CssToken::Dimension { value, unit } => write!(f, "{value}{unit}"),
            CssToken::Whitespace => f.write_str(" "),
            CssToken::Colon => f.write_str(":"),
            CssToken::Comma => f.write_str(","),
            CssToken::LBracket => f.write_str("["),
            CssToken::RBracket => f.write_str("]"),
            CssToken::LParen => f.write_str("("),
            CssToken::RParen => f.write_str(")"),
            CssToken::IncludeMatch => f.write_str("~="),
            CssToken::DashMatch => f.write_str("|="),
            CssToken::PrefixMatch => f.write_str("^="),
            CssToken::SuffixMatch => f.write_str("$="),
            CssToken::SubstringMatch => f.write_str("*="),
            CssToken::Column => f.write_str("||"),
            CssToken::Delim(c) => write!(f, "{c}"),
            CssToken::EOF => Ok(()),
            CssToken::NamespacePrefix(ns) => write!(f, "{ns}"),
            CssToken::QualifiedName {
                namespace,
                local_name,
            } => write!(f, "{namespace}{}", local_name.as_deref().unwrap_or("*")),
            CssToken::Combinator(c) => write!(f, "{c}"),
        }
    }
}

/// Write `value` as a double-quoted CSS string.
pub(crate) fn write_css_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in value.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\a ")?,
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("\"")
}

/// Tokenize `input` completely. The returned stream always ends with
/// [`CssToken::EOF`].
pub fn tokenize(input: &str) -> Vec<CssToken> {
    let mut tokenizer = Tokenizer::new(input);
    let mut tokens = Vec::new();
    loop {
        let tok = tokenizer.next_token();
        let done = tok.is_eof();
        tokens.push(tok);
        if done {
            return tokens;
        }
    }
}

/// Incremental tokenizer over a selector string.
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Consume and return the next token; `EOF` once the input is exhausted.
    pub fn next_token(&mut self) -> CssToken {
        self.skip_comments();

        let Some(ch) = self.peek_at(0) else {
            return CssToken::EOF;
        };

        if is_whitespace(ch) {
            while self.peek_at(0).is_some_and(is_whitespace) {
                self.pos += 1;
            }
            return CssToken::Whitespace;
        }

        match ch {
            '"' | '\'' => self.consume_string(ch),
            '#' => {
                self.pos += 1;
                if self.peek_at(0).is_some_and(is_name_char) || self.starts_escape(0) {
                    let is_id = self.starts_ident(0);
                    let value = self.consume_name();
                    CssToken::Hash { value, is_id }
                } else {
                    CssToken::Delim('#')
                }
            }
            '+' | '.' if self.starts_number(0) => self.consume_numeric(),
            '-' if self.starts_number(0) => self.consume_numeric(),
            '-' if self.starts_ident(0) => self.consume_ident_like(),
            c if c.is_ascii_digit() => self.consume_numeric(),
            ':' => self.single(CssToken::Colon),
            ',' => self.single(CssToken::Comma),
            '[' => self.single(CssToken::LBracket),
            ']' => self.single(CssToken::RBracket),
            '(' => self.single(CssToken::LParen),
            ')' => self.single(CssToken::RParen),
            '~' if self.peek_at(1) == Some('=') => self.double(CssToken::IncludeMatch),
            '^' if self.peek_at(1) == Some('=') => self.double(CssToken::PrefixMatch),
            '$' if self.peek_at(1) == Some('=') => self.double(CssToken::SuffixMatch),
            '*' if self.peek_at(1) == Some('=') => self.double(CssToken::SubstringMatch),
            '|' if self.peek_at(1) == Some('=') => self.double(CssToken::DashMatch),
            '|' if self.peek_at(1) == Some('|') => self.double(CssToken::Column),
            c if is_name_start_char(c) || self.starts_escape(0) => self.consume_ident_like(),
            c => self.single(CssToken::Delim(c)),
        }
    }

    // --- Helper methods ---

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn single(&mut self, tok: CssToken) -> CssToken {
        self.pos += 1;
        tok
    }

    fn double(&mut self, tok: CssToken) -> CssToken {
        self.pos += 2;
        tok
    }

    fn skip_comments(&mut self) {
        while self.peek_at(0) == Some('/') && self.peek_at(1) == Some('*') {
            self.pos += 2;
            loop {
                match (self.peek_at(0), self.peek_at(1)) {
                    (Some('*'), Some('/')) => {
                        self.pos += 2;
                        break;
                    }
                    (Some(_), _) => self.pos += 1,
                    (None, _) => return,
                }
            }
        }
    }

    fn consume_string(&mut self, quote: char) -> CssToken {
        self.pos += 1;
        let mut value = String::new();
        while let Some(ch) = self.peek_at(0) {
            self.pos += 1;
            match ch {
                c if c == quote => break,
                // Unescaped newline ends a (bad) string.
                '\n' => break,
                '\\' => match self.peek_at(0) {
                    None => break,
                    Some('\n') => self.pos += 1,
                    Some(_) => value.push(self.consume_escape()),
                },
                c => value.push(c),
            }
        }
        CssToken::String(value)
    }

    /// Consume an escape; the backslash has already been consumed.
    fn consume_escape(&mut self) -> char {
        let Some(ch) = self.peek_at(0) else {
            return '\u{FFFD}';
        };
        self.pos += 1;
        if !ch.is_ascii_hexdigit() {
            return ch;
        }
        let mut code = ch.to_digit(16).unwrap_or(0);
        for _ in 0..5 {
            match self.peek_at(0).and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    code = code * 16 + d;
                    self.pos += 1;
                }
                None => break,
            }
        }
        if self.peek_at(0).is_some_and(is_whitespace) {
            self.pos += 1;
        }
        match char::from_u32(code) {
            Some(c) if code != 0 => c,
            _ => '\u{FFFD}',
        }
    }

    fn starts_escape(&self, offset: usize) -> bool {
        self.peek_at(offset) == Some('\\')
            && self.peek_at(offset + 1).is_some_and(|c| c != '\n')
    }

    fn starts_ident(&self, offset: usize) -> bool {
        match self.peek_at(offset) {
            Some('-') => match self.peek_at(offset + 1) {
                Some(c) if is_name_start_char(c) || c == '-' => true,
                Some('\\') => self.starts_escape(offset + 1),
                _ => false,
            },
            Some('\\') => self.starts_escape(offset),
            Some(c) => is_name_start_char(c),
            None => false,
        }
    }

    fn starts_number(&self, offset: usize) -> bool {
        let digit_at = |i: usize| self.peek_at(i).is_some_and(|c| c.is_ascii_digit());
        match self.peek_at(offset) {
            Some('+') | Some('-') => {
                digit_at(offset + 1) || (self.peek_at(offset + 1) == Some('.') && digit_at(offset + 2))
            }
            Some('.') => digit_at(offset + 1),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek_at(0) {
            if is_name_char(ch) {
                name.push(ch);
                self.pos += 1;
            } else if self.starts_escape(0) {
                self.pos += 1;
                name.push(self.consume_escape());
            } else {
                break;
            }
        }
        name
    }

    fn consume_numeric(&mut self) -> CssToken {
        let signed = matches!(self.peek_at(0), Some('+') | Some('-'));
        let (value, is_integer) = self.consume_number();
        if self.starts_ident(0) {
            let unit = self.consume_name();
            return CssToken::Dimension { value, unit };
        }
        if self.peek_at(0) == Some('%') {
            self.pos += 1;
            return CssToken::Percentage(value);
        }
        CssToken::Number {
            value,
            is_integer,
            signed,
        }
    }

    fn consume_number(&mut self) -> (f64, bool) {
        let start = self.pos;
        let mut is_integer = true;
        let digit_at = |t: &Self, i: usize| t.peek_at(i).is_some_and(|c| c.is_ascii_digit());

        if matches!(self.peek_at(0), Some('+') | Some('-')) {
            self.pos += 1;
        }
        while digit_at(self, 0) {
            self.pos += 1;
        }
        if self.peek_at(0) == Some('.') && digit_at(self, 1) {
            is_integer = false;
            self.pos += 1;
            while digit_at(self, 0) {
                self.pos += 1;
            }
        }
        if matches!(self.peek_at(0), Some('e') | Some('E')) {
            let signed = matches!(self.peek_at(1), Some('+') | Some('-'));
            let digits_from = if signed { 2 } else { 1 };
            if digit_at(self, digits_from) {
                is_integer = false;
                self.pos += digits_from;
                while digit_at(self, 0) {
                    self.pos += 1;
                }
            }
        }

        let repr: String = self.input[start..self.pos].iter().collect();
        (repr.parse::<f64>().unwrap_or(0.0), is_integer)
    }

    fn consume_ident_like(&mut self) -> CssToken {
        let name = self.consume_name();
        if self.peek_at(0) == Some('(') {
            self.pos += 1;
            return CssToken::Function(name);
        }
        CssToken::Ident(name)
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_name_start_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch) || ch.is_ascii_digit() || ch == '-'
}
