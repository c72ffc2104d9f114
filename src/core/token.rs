// Token records produced by the scan phase
//
// Offsets use u32 (4 GB cap, halves memory vs usize on 64-bit).

use tracing::warn;

/// Kind of structural byte a token marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Field delimiter.
    Delim,
    /// Quote byte. Quote semantics are applied by the reducer, not here.
    Quote,
    /// Row terminator.
    Row,
    /// Zero byte: end of input for the worker that saw it.
    Null,
}

/// A structural byte located by a scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Absolute byte offset into the source file.
    pub offset: u32,
}

/// Initial token capacity per worker; doubles on demand.
const BASE_CAPACITY: usize = 64;

/// Growable per-worker token buffer.
///
/// Growth failure is tolerated: the old buffer is kept, the token is
/// dropped, and the drop is counted. A truncated stream yields a truncated
/// cell index, which callers should treat as a parse failure.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    dropped: usize,
}

impl TokenStream {
    pub fn new() -> Self {
        let mut tokens = Vec::new();
        if tokens.try_reserve(BASE_CAPACITY).is_err() {
            warn!(capacity = BASE_CAPACITY, "token stream allocation failed");
        }
        TokenStream { tokens, dropped: 0 }
    }

    /// Append a token, doubling the buffer when full.
    #[inline]
    pub fn push(&mut self, kind: TokenKind, offset: u32) {
        if self.tokens.len() == self.tokens.capacity() {
            let grow = self.tokens.capacity().max(BASE_CAPACITY);
            if let Err(err) = self.tokens.try_reserve(grow) {
                if self.dropped == 0 {
                    warn!(
                        len = self.tokens.len(),
                        error = %err,
                        "token stream growth failed; dropping tokens"
                    );
                }
                self.dropped += 1;
                return;
            }
        }
        self.tokens.push(Token { kind, offset });
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn last(&self) -> Option<Token> {
        self.tokens.last().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens lost to failed growth.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for TokenStream {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut stream = TokenStream::new();
        stream.push(TokenKind::Delim, 3);
        stream.push(TokenKind::Quote, 7);
        stream.push(TokenKind::Row, 11);

        assert_eq!(stream.len(), 3);
        assert_eq!(
            stream.tokens(),
            &[
                Token { kind: TokenKind::Delim, offset: 3 },
                Token { kind: TokenKind::Quote, offset: 7 },
                Token { kind: TokenKind::Row, offset: 11 },
            ]
        );
        assert_eq!(stream.last(), Some(Token { kind: TokenKind::Row, offset: 11 }));
    }

    #[test]
    fn test_growth_past_base_capacity() {
        let mut stream = TokenStream::new();
        for i in 0..1000u32 {
            stream.push(TokenKind::Delim, i);
        }
        assert_eq!(stream.len(), 1000);
        assert_eq!(stream.dropped(), 0);
        for (i, token) in stream.tokens().iter().enumerate() {
            assert_eq!(token.offset, i as u32);
        }
    }

    #[test]
    fn test_empty_stream() {
        let stream = TokenStream::new();
        assert!(stream.is_empty());
        assert_eq!(stream.last(), None);
    }
}
