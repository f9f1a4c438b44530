//! Word-wise cursor motion for the cooked line editor.
//!
//! Both directions follow the same "skip one, skip a run, skip a different
//! run" shape, but the second run differs: `word_prev` skips spaces before the
//! word, `word_next` skips spaces after it. The result is that
//! `word_next(word_prev(text, p))` does not always return `p`. Console users
//! rely on this exact behavior so it is kept as is.
//!
//! Offsets are UTF-8 byte offsets and always land on char boundaries. Motion is
//! per code point, not per grapheme, to match the console's word semantics.

/// Character class used to find word edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterClass {
    /// Space and anything at or below it (control characters).
    Whitespace,
    /// Alphanumerics and underscore.
    Word,
    /// Everything else, punctuation mostly.
    Other,
}

/// Classify a single code point.
pub fn delimiter_class(c: char) -> DelimiterClass {
    if c <= ' ' {
        DelimiterClass::Whitespace
    } else if c == '_' || c.is_alphanumeric() {
        DelimiterClass::Word
    } else {
        DelimiterClass::Other
    }
}

fn char_before(text: &str, byte: usize) -> Option<(usize, char)> {
    text[..byte].char_indices().next_back()
}

fn char_at(text: &str, byte: usize) -> Option<char> {
    text[byte..].chars().next()
}

/// Start of the word at or before `byte`.
///
/// Steps back one character, skips spaces, then skips the run of characters
/// sharing the class of the one it landed on.
pub fn word_prev(text: &str, byte: usize) -> usize {
    let mut pos = byte.min(text.len());
    let Some((start, _)) = char_before(text, pos) else {
        return 0;
    };
    pos = start;
    while pos != 0 && char_at(text, pos) == Some(' ') {
        pos = char_before(text, pos).map_or(0, |(i, _)| i);
    }
    let Some(c) = char_at(text, pos) else {
        return pos;
    };
    let class = delimiter_class(c);
    while let Some((i, prev)) = char_before(text, pos) {
        if delimiter_class(prev) != class {
            break;
        }
        pos = i;
    }
    pos
}

/// Start of the word following `byte`.
///
/// Steps forward one character, skips the run sharing that character's class,
/// then skips trailing spaces.
pub fn word_next(text: &str, byte: usize) -> usize {
    let mut pos = byte.min(text.len());
    let Some(first) = char_at(text, pos) else {
        return pos;
    };
    pos += first.len_utf8();
    let class = delimiter_class(first);
    while let Some(c) = char_at(text, pos) {
        if delimiter_class(c) != class {
            break;
        }
        pos += c.len_utf8();
    }
    while char_at(text, pos) == Some(' ') {
        pos += 1;
    }
    pos
}
