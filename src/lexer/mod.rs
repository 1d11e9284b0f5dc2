//! Backtracking character reader.
//!
//! Input is pulled line by line into a cache. Matchers move a lookahead
//! offset over the cache and then either `save()` the span (removing it from
//! the input and remembering it for `recall()`) or `discard()` it, which
//! leaves the input exactly as it was before the attempt.

pub mod matchers;

use std::io::BufRead;

use crate::error::{Result, VmError};

pub(crate) fn is_ws(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

pub struct Lexer<R> {
    reader: R,
    cache: Vec<char>,
    lookahead: usize,
    saved: String,
    exhausted: bool,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            cache: Vec::new(),
            lookahead: 0,
            saved: String::new(),
            exhausted: false,
        }
    }

    fn next_line(&mut self) -> Result<()> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            self.exhausted = true;
        } else {
            self.cache.extend(line.chars());
        }
        Ok(())
    }

    /// Character under the lookahead position.
    pub fn peek(&mut self) -> Result<char> {
        while self.lookahead >= self.cache.len() {
            if self.exhausted {
                return Err(VmError::EndOfInput);
            }
            self.next_line()?;
        }
        Ok(self.cache[self.lookahead])
    }

    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.lookahead <= self.cache.len());
        self.lookahead += n;
    }

    pub fn discard(&mut self) {
        self.lookahead = 0;
    }

    /// Commits the whole lookahead.
    pub fn save(&mut self) {
        let n = self.lookahead;
        self.commit(n);
    }

    /// Commits the first `n` characters of the lookahead.
    pub fn save_n(&mut self, n: usize) -> Result<()> {
        if n > self.lookahead {
            return Err(VmError::Internal(format!(
                "save({n}) beyond lookahead {}",
                self.lookahead
            )));
        }
        self.commit(n);
        Ok(())
    }

    fn commit(&mut self, n: usize) {
        let n = n.min(self.cache.len());
        self.saved = self.cache.drain(..n).collect();
        self.lookahead -= n;
    }

    pub fn recall(&self) -> &str {
        &self.saved
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Consumes whitespace up to the next significant character and returns
    /// it. Does nothing (and keeps the saved span) when already on one.
    pub fn skip_ws(&mut self) -> Result<char> {
        let ch = self.peek()?;
        if !is_ws(ch) {
            return Ok(ch);
        }

        loop {
            let ch = self.peek()?;
            if !is_ws(ch) {
                self.save();
                return Ok(ch);
            }
            self.advance(1);
        }
    }

    /// Input read from the stream but not yet committed.
    pub fn pending(&self) -> String {
        self.cache.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer(input: &str) -> Lexer<&[u8]> {
        Lexer::new(input.as_bytes())
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lx = lexer("ab");
        assert_eq!(lx.peek().unwrap(), 'a');
        assert_eq!(lx.peek().unwrap(), 'a');
        lx.advance(1);
        assert_eq!(lx.peek().unwrap(), 'b');
    }

    #[test]
    fn peek_pulls_following_lines() {
        let mut lx = lexer("a\nb\n");
        lx.advance(1);
        assert_eq!(lx.peek().unwrap(), '\n');
        lx.advance(1);
        assert_eq!(lx.peek().unwrap(), 'b');
        assert_eq!(lx.pending(), "a\nb\n");
    }

    #[test]
    fn save_commits_and_recall_returns_span() {
        let mut lx = lexer("abcd");
        lx.peek().unwrap();
        lx.advance(2);
        lx.save();
        assert_eq!(lx.recall(), "ab");
        assert_eq!(lx.lookahead(), 0);
        assert_eq!(lx.peek().unwrap(), 'c');
    }

    #[test]
    fn save_n_keeps_remaining_lookahead() {
        let mut lx = lexer("abcd");
        lx.peek().unwrap();
        lx.advance(3);
        lx.save_n(1).unwrap();
        assert_eq!(lx.recall(), "a");
        assert_eq!(lx.lookahead(), 2);
        assert!(matches!(lx.save_n(3), Err(VmError::Internal(_))));
    }

    #[test]
    fn discard_rewinds() {
        let mut lx = lexer("xyz");
        lx.peek().unwrap();
        lx.advance(2);
        lx.discard();
        assert_eq!(lx.peek().unwrap(), 'x');
        assert_eq!(lx.pending(), "xyz");
    }

    #[test]
    fn skip_ws_commits_whitespace() {
        let mut lx = lexer(" \t\n  id");
        assert_eq!(lx.skip_ws().unwrap(), 'i');
        assert_eq!(lx.pending(), "id");
        assert_eq!(lx.lookahead(), 0);
    }

    #[test]
    fn skip_ws_on_significant_char_keeps_saved() {
        let mut lx = lexer("ab");
        lx.peek().unwrap();
        lx.advance(1);
        lx.save();
        assert_eq!(lx.skip_ws().unwrap(), 'b');
        assert_eq!(lx.recall(), "a");
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut lx = lexer("a");
        lx.advance(1);
        assert!(matches!(lx.peek(), Err(VmError::EndOfInput)));
        assert!(matches!(lexer("").peek(), Err(VmError::EndOfInput)));
    }
}
