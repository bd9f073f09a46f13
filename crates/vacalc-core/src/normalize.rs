//! Condition-name normalization for bilateral pairing.
//!
//! Two lateral conditions belong to the same pair when their names reduce to
//! the same key once side words are removed, so `Left Knee Strain` and
//! `right knee strain` both become `knee strain`.
//!
//! The key is built with a small tokenizer rather than a regex:
//! 1. lower-case the name
//! 2. split into word runs (ASCII alphanumerics and `_`) and everything else
//! 3. drop word runs that are exactly a side token
//! 4. drop every non-word character that is not a separator
//! 5. collapse separators into single spaces and trim
//!
//! Side tokens only match whole words: `cleft` and `leftover` are kept.
//!
//! Separators are the ECMAScript `\s` set: U+FEFF counts, U+0085 does not.

/// Whole words that name a side and are ignored when pairing.
pub const SIDE_TOKENS: [&str; 6] = ["left", "right", "lft", "rgt", "l", "r"];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_separator(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{b}'
            | '\u{c}'
            | '\r'
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            | '\u{feff}'
    )
}

fn is_side_token(word: &str) -> bool {
    SIDE_TOKENS.contains(&word)
}

/// Reduce a condition name to the key used to group bilateral pairs.
pub fn pair_key(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut stripped = String::with_capacity(lowered.len());
    let mut word = String::new();

    for c in lowered.chars() {
        if is_word_char(c) {
            word.push(c);
            continue;
        }

        if !is_side_token(&word) {
            stripped.push_str(&word);
        }
        word.clear();

        if is_separator(c) {
            stripped.push(' ');
        }
    }
    if !is_side_token(&word) {
        stripped.push_str(&word);
    }

    stripped
        .split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character of a pair key for display.
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
