//! Text grid queries for the cooked line editor.
//!
//! Everything here is a pure function over a single `&str` line. Offsets are
//! UTF-8 byte offsets; every offset returned by this crate lands on a char
//! boundary, and the grapheme helpers additionally guarantee cluster
//! boundaries.
//!
//! Contents:
//! - `grapheme`: previous/next cluster boundary and cluster width.
//! - `width`: the single authoritative cluster width function (`egc_width`).
//! - `fit_into_columns`: longest prefix that fits a column budget.
//! - `motion`: legacy console word motion (`word_prev` / `word_next`).

pub mod motion;
pub mod width;

pub use motion::{DelimiterClass, delimiter_class, word_next, word_prev};
pub use width::egc_width;

use unicode_segmentation::UnicodeSegmentation;

/// Result of [`fit_into_columns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fit {
    /// Byte length of the prefix that fits.
    pub len: usize,
    /// Columns occupied by that prefix.
    pub columns: usize,
}

/// Measure the longest grapheme-aligned prefix of `text` occupying at most
/// `max_columns` terminal cells.
///
/// A cluster that would straddle the budget is excluded whole, so a wide
/// glyph never gets split across the boundary.
pub fn fit_into_columns(text: &str, max_columns: usize) -> Fit {
    let mut fit = Fit::default();
    for (idx, g) in text.grapheme_indices(true) {
        let w = grapheme::cluster_width(g);
        if fit.columns + w > max_columns {
            break;
        }
        fit.columns += w;
        fit.len = idx + g.len();
    }
    fit
}

/// Grapheme and width utilities. These are pure helpers operating on a single line.
pub mod grapheme {
    use crate::egc_width;
    use unicode_segmentation::UnicodeSegmentation;

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Width in terminal cells of this grapheme cluster.
    pub fn cluster_width(g: &str) -> usize {
        egc_width(g) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grapheme_basic_emoji() {
        let s = "a😀b";
        let after_a = grapheme::next_boundary(s, 0);
        let after_emoji = grapheme::next_boundary(s, after_a);
        assert_eq!(after_a, 1);
        assert_eq!(after_emoji, 1 + "😀".len());
        assert_eq!(grapheme::prev_boundary(s, after_emoji), after_a);
        assert_eq!(fit_into_columns(&s[..after_emoji], usize::MAX).columns, 3);
    }

    #[test]
    fn grapheme_combining_mark() {
        let s = "e\u{0301}x";
        let nb = grapheme::next_boundary(s, 0);
        assert_eq!(nb, "e\u{0301}".len());
        assert_eq!(grapheme::prev_boundary(s, nb), 0);
    }

    #[test]
    fn grapheme_cjk() {
        let s = "漢字";
        let first = grapheme::next_boundary(s, 0);
        let second = grapheme::next_boundary(s, first);
        assert_eq!(second, s.len());
        assert_eq!(grapheme::prev_boundary(s, second), first);
        assert_eq!(fit_into_columns(&s[..second], usize::MAX).columns, 4);
    }

    #[test]
    fn boundaries_clamp_out_of_range() {
        assert_eq!(grapheme::prev_boundary("abc", 0), 0);
        assert_eq!(grapheme::prev_boundary("abc", 99), 0);
        assert_eq!(grapheme::next_boundary("abc", 3), 3);
        assert_eq!(grapheme::next_boundary("abc", 99), 3);
    }

    #[test]
    fn fit_stops_before_wide_glyph_straddling_budget() {
        let fit = fit_into_columns("ab漢c", 3);
        assert_eq!(fit, Fit { len: 2, columns: 2 });
        let fit = fit_into_columns("ab漢c", 4);
        assert_eq!(fit.len, 2 + "漢".len());
        assert_eq!(fit.columns, 4);
    }

    #[test]
    fn fit_whole_text() {
        let fit = fit_into_columns("hello", 80);
        assert_eq!(fit, Fit { len: 5, columns: 5 });
        assert_eq!(fit_into_columns("", 10), Fit::default());
        assert_eq!(fit_into_columns("abc", 0), Fit::default());
    }

    #[test]
    fn unbounded_fit_counts_wide_glyphs() {
        assert_eq!(fit_into_columns("a漢😀", usize::MAX).columns, 5);
    }
}
