//! Lookahead cursor over a finite token sequence.

use crate::token::CssToken;

pub(crate) static EOF: CssToken = CssToken::EOF;

/// Cursor over a token sequence. Reading past the end yields `EOF`.
///
/// Each token remembers the index it had in the caller's original stream,
/// so errors raised on a rewritten sequence still point at the caller's input.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<CssToken>,
    origins: Vec<usize>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<CssToken>) -> Self {
        let origins = (0..tokens.len()).collect();
        Self {
            tokens,
            origins,
            pos: 0,
        }
    }

    /// Build a stream whose tokens map back to `origins` in some source stream.
    pub(crate) fn with_origins(tokens: Vec<CssToken>, origins: Vec<usize>) -> Self {
        debug_assert_eq!(tokens.len(), origins.len());
        Self {
            tokens,
            origins,
            pos: 0,
        }
    }

    /// The token `n` places ahead of the cursor.
    pub fn peek(&self, n: usize) -> &CssToken {
        self.tokens.get(self.pos + n).unwrap_or(&EOF)
    }

    pub fn next(&self) -> &CssToken {
        self.peek(0)
    }

    pub fn next_next(&self) -> &CssToken {
        self.peek(1)
    }

    pub fn next_next_next(&self) -> &CssToken {
        self.peek(2)
    }

    /// Advance past the current token and return it.
    pub fn consume(&mut self) -> CssToken {
        let tok = self.next().clone();
        self.advance(1);
        tok
    }

    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.tokens.len());
    }

    /// Consume the current token if it equals `expected`.
    pub fn eat(&mut self, expected: &CssToken) -> bool {
        if self.next() == expected {
            self.advance(1);
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) {
        while self.next().is_whitespace() {
            self.advance(1);
        }
    }

    pub fn at_eof(&self) -> bool {
        self.next().is_eof()
    }

    /// Source index of the current token. Past the end this is one past the
    /// last source token.
    pub fn position(&self) -> usize {
        match self.origins.get(self.pos) {
            Some(&origin) => origin,
            None => self.origins.last().map_or(0, |last| last + 1),
        }
    }
}
