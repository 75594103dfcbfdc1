//! Escaping of term values before they are spliced into a query string

/// Characters with a meaning in the Solr standard query parser.
const SPECIAL_CHARS: &[char] = &[
    ' ', '&', '|', '+', '-', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '?', ':', '\\',
];

/// Escape every Solr special character (and the space) with a backslash.
///
/// Pairs that are already escaped are copied as they are, so escaping an
/// escaped value leaves it unchanged. `*` is not escaped: wildcards stay
/// usable in escaped terms.
pub fn solr_escape(value: &str) -> String {
    escape_with(value, |c| SPECIAL_CHARS.contains(&c))
}

/// Escape only the `:` field separator.
///
/// Used for values whose shape is trusted (identifiers, quoted phrases,
/// ranges) but that must not be read as `field:value`.
pub fn escape_colons(value: &str) -> String {
    escape_with(value, |c| c == ':')
}

fn escape_with(value: &str, is_special: impl Fn(char) -> bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if is_special(next) {
                    escaped.push(c);
                    escaped.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        if is_special(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
