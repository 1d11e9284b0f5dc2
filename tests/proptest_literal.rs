//! Property tests for the literal matcher.

use meta_ii::lexer::Lexer;
use proptest::prelude::*;

fn arb_literal() -> impl Strategy<Value = String> {
    "[a-z.&*=;]{1,6}"
}

fn arb_rest() -> impl Strategy<Value = String> {
    "[ a-z.&*=;]{0,8}"
}

proptest! {
    #[test]
    fn literal_consumes_exactly_its_text(
        ws in "[ \t\n]{0,3}",
        s in arb_literal(),
        rest in arb_rest(),
    ) {
        let input = format!("{ws}{s}{rest}\n");
        let mut lx = Lexer::new(input.as_bytes());

        prop_assert!(lx.literal(&s).unwrap());
        prop_assert_eq!(lx.recall(), s.as_str());
        prop_assert_eq!(lx.lookahead(), 0);
        prop_assert_eq!(lx.pending(), format!("{rest}\n"));
    }

    #[test]
    fn failed_literal_leaves_input_untouched(
        s in arb_literal(),
        t in "[a-z.&*=;][ a-z.&*=;]{0,8}",
    ) {
        prop_assume!(!t.starts_with(&s));
        let input = format!("{t}\n");
        let mut lx = Lexer::new(input.as_bytes());

        prop_assert!(!lx.literal(&s).unwrap());
        prop_assert_eq!(lx.lookahead(), 0);
        prop_assert_eq!(lx.pending(), input.as_str());
    }
}
