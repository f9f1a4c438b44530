//! Grapheme cluster display width.
//!
//! `egc_width` is the single authority for how many console cells a cluster
//! occupies. The console grid only knows narrow (1) and wide (2) cells, so
//! every visible cluster maps to one of those two values. Zero is reserved for
//! clusters made entirely of zero-width code points (e.g. a lone ZWJ).
//!
//! Invariants:
//! - No caller bypasses `egc_width` for layout decisions.
//! - The result never exceeds 2; a cluster is one logical cell pair at most.
//! - Over-estimation is preferred to under-estimation for pictographic
//!   composites, because an extra blank cell is harmless while a short count
//!   desynchronizes the cursor from the terminal.
//!
//! Control characters are not measured here; the line layout substitutes a
//! caret form for them before any width query happens.

use unicode_width::UnicodeWidthChar;

const ZWJ: char = '\u{200D}';
const VS16: char = '\u{FE0F}';
const KEYCAP: char = '\u{20E3}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClusterKind {
    Empty,
    Narrow,
    Wide,
    /// Flag pair, keycap, ZWJ sequence, skin-tone or VS16 presentation.
    Emoji,
}

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

fn is_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

fn classify(egc: &str) -> ClusterKind {
    let mut chars = egc.chars();
    let Some(base) = chars.next() else {
        return ClusterKind::Empty;
    };
    let rest = chars.as_str();
    if rest.is_empty() {
        return match char_width(base) {
            0 => ClusterKind::Empty,
            1 => ClusterKind::Narrow,
            _ => ClusterKind::Wide,
        };
    }

    let mut pictographs = usize::from(is_pictographic(base));
    let mut regional = usize::from(is_regional_indicator(base));
    let mut presentation = false;
    for c in rest.chars() {
        match c {
            ZWJ | VS16 | KEYCAP => presentation = true,
            c if is_skin_tone_modifier(c) => presentation = true,
            c if is_regional_indicator(c) => regional += 1,
            c if is_pictographic(c) => pictographs += 1,
            _ => {}
        }
    }
    if regional >= 2 || (presentation && pictographs > 0) {
        return ClusterKind::Emoji;
    }
    if rest.ends_with(KEYCAP) {
        return ClusterKind::Emoji;
    }
    // Base plus combining marks: the base decides.
    match char_width(base) {
        0 if egc.chars().all(|c| char_width(c) == 0) => ClusterKind::Empty,
        2 => ClusterKind::Wide,
        _ => ClusterKind::Narrow,
    }
}

/// Width in console cells of a single extended grapheme cluster.
pub fn egc_width(egc: &str) -> u16 {
    match classify(egc) {
        ClusterKind::Empty => 0,
        ClusterKind::Narrow => 1,
        ClusterKind::Wide | ClusterKind::Emoji => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_latin() {
        assert_eq!(egc_width("A"), 1);
        assert_eq!(egc_width("é"), 1);
    }

    #[test]
    fn cjk_is_wide() {
        assert_eq!(egc_width("界"), 2);
        assert_eq!(egc_width("漢"), 2);
    }

    #[test]
    fn emoji_forms_are_wide() {
        assert_eq!(egc_width("😀"), 2);
        assert_eq!(egc_width("🇺🇸"), 2);
        assert_eq!(egc_width("1️⃣"), 2);
        assert_eq!(egc_width("👍🏻"), 2);
        assert_eq!(egc_width("👨‍👩‍👧‍👦"), 2);
    }

    #[test]
    fn combining_follows_base() {
        assert_eq!(egc_width("e\u{0301}"), 1);
        assert_eq!(egc_width("界\u{0301}"), 2);
    }

    #[test]
    fn zero_width_only() {
        assert_eq!(egc_width(""), 0);
        assert_eq!(egc_width("\u{200D}"), 0);
    }
}
