//! A growable window of tokens shared by the lexer and the parser.
//!
//! Tokens are addressed by an absolute index `k`. The window holds the
//! tokens from `first()` to `last()`; the parser commits tokens it no longer
//! needs so the window can slide forward.

use crate::token::Token;
use std::collections::VecDeque;

const INITIAL_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct TokenStream {
    buffer: VecDeque<Token>,
    /// Absolute index of `buffer[0]`.
    base: usize,
    capacity: usize,
}

impl TokenStream {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(INITIAL_CAPACITY),
            base: 0,
            capacity: INITIAL_CAPACITY,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }

    /// Double the window capacity.
    pub fn grow(&mut self) {
        self.capacity *= 2;
        self.buffer.reserve(self.capacity - self.buffer.len());
    }

    /// Index of the oldest buffered token.
    #[inline]
    pub fn first(&self) -> usize {
        self.base
    }

    /// Index of the newest buffered token.
    #[inline]
    pub fn last(&self) -> Option<usize> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.base + self.buffer.len() - 1)
        }
    }

    /// Number of tokens ever put, including committed ones.
    #[inline]
    pub fn count(&self) -> usize {
        self.base + self.buffer.len()
    }

    /// Token `k`, or an empty `Error` token outside the window.
    pub fn get(&self, k: usize) -> Token {
        k.checked_sub(self.base)
            .and_then(|index| self.buffer.get(index))
            .copied()
            .unwrap_or_default()
    }

    pub fn put(&mut self, token: Token) {
        self.buffer.push_back(token);
    }

    /// Drop every token before `k`.
    pub fn commit(&mut self, k: usize) {
        while self.base < k && !self.buffer.is_empty() {
            self.buffer.pop_front();
            self.base += 1;
        }
    }

    /// Discard all buffered tokens. Indices keep counting from `count()`.
    pub fn reset(&mut self) {
        self.base += self.buffer.len();
        self.buffer.clear();
    }
}

impl Default for TokenStream {
    fn default() -> Self {
        Self::new()
    }
}
