//! String literal escape processing.
//!
//! Unknown escapes resolve to the escaped character itself, so `"\q"` is
//! `"q"`. Malformed `\x` and `\u` sequences keep the letter and leave the
//! following characters untouched.

/// Unescape the content of a string literal (without its quotes).
pub(crate) fn unescape(content: &str) -> String {
    if !content.contains('\\') {
        return content.to_owned();
    }

    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            result.push('\\');
            break;
        };
        match esc {
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            'b' => result.push('\u{8}'),
            'f' => result.push('\u{c}'),
            'v' => result.push('\u{b}'),
            '0' => result.push('\0'),
            'x' => push_hex(&mut result, &mut chars, 2, 'x'),
            'u' => push_hex(&mut result, &mut chars, 4, 'u'),
            other => result.push(other),
        }
    }
    result
}

fn push_hex(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    letter: char,
) {
    let mut lookahead = chars.clone();
    let mut code = 0u32;
    for _ in 0..digits {
        match lookahead.next().and_then(|c| c.to_digit(16)) {
            Some(d) => code = code * 16 + d,
            None => {
                out.push(letter);
                return;
            }
        }
    }
    *chars = lookahead;
    out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
}

#[cfg(test)]
mod tests {
    use super::unescape;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_content_is_unchanged() {
        assert_eq!(unescape("hello"), "hello");
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unescape(r#"a\nb\t\"q\"\\"#), "a\nb\t\"q\"\\");
        assert_eq!(unescape(r"it\'s"), "it's");
    }

    #[test]
    fn test_hex_and_unicode_escapes() {
        assert_eq!(unescape(r"\x41\u00e9"), "A\u{e9}");
    }

    #[test]
    fn test_malformed_hex_keeps_letter() {
        assert_eq!(unescape(r"\xZZ"), "xZZ");
        assert_eq!(unescape(r"\u12"), "u12");
    }

    #[test]
    fn test_unknown_escape_is_the_character() {
        assert_eq!(unescape(r"\q"), "q");
    }
}
