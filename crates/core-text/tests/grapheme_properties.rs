use core_text::{fit_into_columns, grapheme, word_next, word_prev};
use proptest::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

fn boundaries(text: &str) -> Vec<usize> {
    let mut out: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
    out.push(text.len());
    out
}

fn mixed_text() -> impl Strategy<Value = String> {
    let pieces = prop_oneof![
        Just("a"),
        Just(" "),
        Just("_"),
        Just("."),
        Just("e\u{301}"),
        Just("\u{4e16}"),
        Just("\u{1f468}\u{200d}\u{1f469}"),
        Just("\t"),
    ];
    prop::collection::vec(pieces, 0..24).prop_map(|v| v.concat())
}

proptest! {
    #[test]
    fn stepping_stays_on_cluster_boundaries(text in mixed_text(), pick in 0usize..64) {
        let stops = boundaries(&text);
        let start = stops[pick % stops.len()];
        let next = grapheme::next_boundary(&text, start);
        let prev = grapheme::prev_boundary(&text, start);
        prop_assert!(stops.contains(&next));
        prop_assert!(stops.contains(&prev));
        prop_assert!(prev <= start && start <= next);
        if start < text.len() {
            prop_assert!(next > start);
        }
    }

    #[test]
    fn fit_never_splits_a_cluster(text in mixed_text(), max in 0usize..40) {
        let fit = fit_into_columns(&text, max);
        prop_assert!(fit.columns <= max);
        prop_assert!(boundaries(&text).contains(&fit.len));
        let clusters: usize = text[..fit.len].graphemes(true).map(grapheme::cluster_width).sum();
        prop_assert_eq!(fit.columns, clusters);
    }

    #[test]
    fn word_motion_lands_on_char_boundaries(text in mixed_text(), pick in 0usize..64) {
        let stops = boundaries(&text);
        let start = stops[pick % stops.len()];
        let back = word_prev(&text, start);
        let fwd = word_next(&text, start);
        prop_assert!(back <= start && text.is_char_boundary(back));
        prop_assert!(fwd >= start && fwd <= text.len() && text.is_char_boundary(fwd));
    }
}
