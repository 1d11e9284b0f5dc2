use std::io::BufRead;

use super::Lexer;
use crate::error::Result;

const QUOTES: [char; 2] = ['\'', '"'];

impl<R: BufRead> Lexer<R> {
    // =========================================================
    // Primitive matchers
    //
    // Each one skips leading whitespace, then either saves the
    // match and returns true, or discards and returns false.
    // =========================================================

    /// Letter or underscore, then letters, digits or underscores.
    pub fn identifier(&mut self) -> Result<bool> {
        let ch = self.skip_ws()?;
        if !(ch.is_alphabetic() || ch == '_') {
            self.discard();
            return Ok(false);
        }

        loop {
            self.advance(1);
            let ch = self.peek()?;
            if !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
        }

        self.save();
        Ok(true)
    }

    /// Digits with single embedded periods, starting and ending on a digit.
    pub fn number(&mut self) -> Result<bool> {
        let ch = self.skip_ws()?;
        if !ch.is_ascii_digit() {
            self.discard();
            return Ok(false);
        }
        self.advance(1);

        let mut prev_was_dot = false;
        loop {
            let ch = self.peek()?;
            if ch == '.' {
                if prev_was_dot {
                    self.discard();
                    return Ok(false);
                }
                prev_was_dot = true;
            } else if ch.is_ascii_digit() {
                prev_was_dot = false;
            } else {
                if prev_was_dot {
                    self.discard();
                    return Ok(false);
                }
                self.save();
                return Ok(true);
            }
            self.advance(1);
        }
    }

    /// `'...'` or `"..."`, no escapes. The saved span keeps both quotes.
    pub fn quoted_string(&mut self) -> Result<bool> {
        let quote = self.skip_ws()?;
        if !QUOTES.contains(&quote) {
            self.discard();
            return Ok(false);
        }
        self.advance(1);

        loop {
            let ch = self.peek()?;
            self.advance(1);
            if ch == quote {
                self.save();
                return Ok(true);
            }
        }
    }

    /// Exact prefix match against `s`. A shorter literal matches the start
    /// of a longer token: `&` matches `&&`.
    pub fn literal(&mut self, s: &str) -> Result<bool> {
        self.skip_ws()?;

        for expected in s.chars() {
            if self.peek()? != expected {
                self.discard();
                return Ok(false);
            }
            self.advance(1);
        }

        self.save();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;

    fn lexer(input: &str) -> Lexer<&[u8]> {
        Lexer::new(input.as_bytes())
    }

    #[test]
    fn identifier_matches_word() {
        let mut lx = lexer("  foo_1 bar");
        assert!(lx.identifier().unwrap());
        assert_eq!(lx.recall(), "foo_1");
        assert_eq!(lx.pending(), " bar");
    }

    #[test]
    fn identifier_allows_leading_underscore() {
        let mut lx = lexer("_x;");
        assert!(lx.identifier().unwrap());
        assert_eq!(lx.recall(), "_x");
    }

    #[test]
    fn identifier_rejects_digit_start() {
        let mut lx = lexer("9abc ");
        assert!(!lx.identifier().unwrap());
        assert_eq!(lx.pending(), "9abc ");
        assert_eq!(lx.lookahead(), 0);
    }

    #[test]
    fn number_with_embedded_periods() {
        let mut lx = lexer("12.34 ");
        assert!(lx.number().unwrap());
        assert_eq!(lx.recall(), "12.34");
        assert_eq!(lx.pending(), " ");

        let mut lx = lexer("1.2.3;");
        assert!(lx.number().unwrap());
        assert_eq!(lx.recall(), "1.2.3");
    }

    #[test]
    fn number_rejects_double_period() {
        let mut lx = lexer("12..34 ");
        assert!(!lx.number().unwrap());
        assert_eq!(lx.pending(), "12..34 ");
        assert_eq!(lx.lookahead(), 0);
    }

    #[test]
    fn number_rejects_trailing_period() {
        let mut lx = lexer("12. x");
        assert!(!lx.number().unwrap());
        assert_eq!(lx.pending(), "12. x");
        assert_eq!(lx.lookahead(), 0);
    }

    #[test]
    fn number_rejects_leading_period() {
        let mut lx = lexer(".5 ");
        assert!(!lx.number().unwrap());
        assert_eq!(lx.pending(), ".5 ");
    }

    #[test]
    fn quoted_string_keeps_delimiters() {
        let mut lx = lexer(" 'a \"b' rest");
        assert!(lx.quoted_string().unwrap());
        assert_eq!(lx.recall(), "'a \"b'");
        assert_eq!(lx.pending(), " rest");

        let mut lx = lexer("\"it's\"");
        assert!(lx.quoted_string().unwrap());
        assert_eq!(lx.recall(), "\"it's\"");
    }

    #[test]
    fn quoted_string_spans_lines() {
        let mut lx = lexer("'a\nb' ");
        assert!(lx.quoted_string().unwrap());
        assert_eq!(lx.recall(), "'a\nb'");
    }

    #[test]
    fn quoted_string_requires_quote() {
        let mut lx = lexer("abc ");
        assert!(!lx.quoted_string().unwrap());
        assert_eq!(lx.pending(), "abc ");
    }

    #[test]
    fn unterminated_string_runs_out_of_input() {
        let mut lx = lexer("'abc");
        assert!(lx.quoted_string().is_err());
    }

    #[test]
    fn literal_match_and_mismatch() {
        let mut lx = lexer("  .SYNTAX X");
        assert!(lx.literal(".SYNTAX").unwrap());
        assert_eq!(lx.recall(), ".SYNTAX");

        assert!(!lx.literal("YY").unwrap());
        assert_eq!(lx.pending(), "X");
    }

    #[test]
    fn literal_is_prefix_based() {
        let mut lx = lexer("&&");
        assert!(lx.literal("&").unwrap());
        assert_eq!(lx.pending(), "&");
    }

    #[test]
    fn literal_mismatch_discards_whole_attempt() {
        let mut lx = lexer(".SYNTAS ");
        assert!(!lx.literal(".SYNTAX").unwrap());
        assert_eq!(lx.lookahead(), 0);
        assert_eq!(lx.pending(), ".SYNTAS ");
    }
}
