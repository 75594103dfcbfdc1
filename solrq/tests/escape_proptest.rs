//! Property-based tests for term escaping.

use proptest::prelude::*;
use solrq::{escape_colons, solr_escape};

const SPECIAL: &str = " &|+-!(){}[]^\"~?:\\";

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Every special character of an escaped value must belong to a `\x` pair.
fn fully_escaped(value: &str, is_special: impl Fn(char) -> bool) -> bool {
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) if is_special(next) => continue,
                _ => return false,
            }
        }
        if is_special(c) {
            return false;
        }
    }
    true
}

proptest! {
    #[test]
    fn escape_then_unescape_is_identity(s in "[a-zA-Z0-9 &|+!(){}\\[\\]^\"~?:*éà-]{0,40}") {
        prop_assert_eq!(unescape(&solr_escape(&s)), s);
    }

    #[test]
    fn escaped_values_have_no_bare_special_chars(s in ".{0,40}") {
        let escaped = solr_escape(&s);
        prop_assert!(fully_escaped(&escaped, |c| SPECIAL.contains(c)));
    }

    #[test]
    fn escaping_is_idempotent(s in ".{0,40}") {
        let once = solr_escape(&s);
        prop_assert_eq!(solr_escape(&once), once.clone());

        let colons = escape_colons(&s);
        prop_assert_eq!(escape_colons(&colons), colons.clone());
    }

    #[test]
    fn colon_escaping_only_touches_colons(s in "[a-z ():\"*\\[\\]-]{0,40}") {
        let escaped = escape_colons(&s);
        prop_assert_eq!(escaped.replace("\\:", ":"), s);
    }

    #[test]
    fn wildcards_survive_escaping(s in "[a-z]{1,10}") {
        let term = format!("{}*", s);
        prop_assert_eq!(solr_escape(&term), term);
    }
}
