#![forbid(unsafe_code)]

//! Vertical placement policy.
//!
//! [`compute_top`] is a pure function of the current scroll offset, the
//! viewport height, and the measured dialog height. Three bands:
//!
//! - dialog at least as tall as the viewport: pin near the top of the
//!   visible region ([`OVERFLOW_TOP_MARGIN`] below the scroll offset; the
//!   page scrolls for the rest);
//! - dialog taller than half the viewport (ties included): center
//!   vertically within the visible region;
//! - shorter dialogs: sit in the upper band, one fifth of the viewport
//!   down, where short dialogs read naturally.
//!
//! [`entry_top`] is the pre-transition position written before the final
//! one, [`ENTRY_OFFSET`] px above the scroll offset, so the dialog animates
//! downward into place.
//!
//! Horizontal centering stays with the host stylesheet; nothing here
//! computes x.

use scrim_core::dom::{Document, NodeId};

/// Gap kept above a dialog taller than the viewport, px.
pub const OVERFLOW_TOP_MARGIN: i32 = 20;

/// Distance above the scroll offset used as the entry position, px.
pub const ENTRY_OFFSET: i32 = 100;

/// Line height assumed when estimating an unmeasured dialog, px.
pub const ESTIMATED_LINE_HEIGHT: i32 = 20;

/// Compute the dialog panel's vertical offset in page coordinates.
pub fn compute_top(scroll_offset: i32, viewport_height: i32, dialog_height: i32) -> i32 {
    if dialog_height >= viewport_height {
        scroll_offset + OVERFLOW_TOP_MARGIN
    } else if dialog_height >= viewport_height / 2 {
        scroll_offset + (viewport_height - dialog_height) / 2
    } else {
        scroll_offset + viewport_height / 5
    }
}

/// Pre-transition position written before the computed one.
pub fn entry_top(scroll_offset: i32) -> i32 {
    scroll_offset - ENTRY_OFFSET
}

/// Deterministic height estimate for markup no host has measured:
/// one [`ESTIMATED_LINE_HEIGHT`] per markup line, at least one line.
pub fn estimate_height(markup: &str) -> i32 {
    let lines = markup.lines().count().max(1);
    lines as i32 * ESTIMATED_LINE_HEIGHT
}

/// Effective dialog height: the host-measured value when one was recorded,
/// otherwise the line-count estimate of the panel markup.
pub fn dialog_height(doc: &Document, panel: NodeId) -> i32 {
    doc.measured_height(panel)
        .unwrap_or_else(|| estimate_height(doc.markup(panel)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn overflow_pins_near_top() {
        assert_eq!(compute_top(300, 600, 900), 320);
    }

    #[test]
    fn dialog_equal_to_viewport_takes_overflow_branch() {
        // Boundary: equality routes to the overflow rule, not centering.
        assert_eq!(compute_top(300, 600, 600), 320);
    }

    #[test]
    fn tall_dialog_is_centered() {
        // 600px viewport, 400px dialog: centered 100px down.
        assert_eq!(compute_top(0, 600, 400), 100);
        assert_eq!(compute_top(250, 600, 400), 350);
    }

    #[test]
    fn dialog_at_half_viewport_is_centered() {
        // Boundary: exactly half the viewport ties toward centering.
        assert_eq!(compute_top(0, 600, 300), 150);
    }

    #[test]
    fn short_dialog_sits_in_upper_band() {
        assert_eq!(compute_top(0, 600, 100), 120);
        assert_eq!(compute_top(1000, 500, 40), 1100);
    }

    #[test]
    fn entry_position_is_above_scroll() {
        assert_eq!(entry_top(0), -100);
        assert_eq!(entry_top(450), 350);
    }

    #[test]
    fn estimate_counts_lines() {
        assert_eq!(estimate_height(""), ESTIMATED_LINE_HEIGHT);
        assert_eq!(estimate_height("<p>Hi</p>"), ESTIMATED_LINE_HEIGHT);
        assert_eq!(
            estimate_height("<ul>\n<li>a</li>\n<li>b</li>\n</ul>"),
            4 * ESTIMATED_LINE_HEIGHT
        );
    }

    #[test]
    fn measured_height_wins_over_estimate() {
        let mut doc = Document::new();
        let panel = doc.create_element("div");
        doc.set_markup(panel, "<p>one line</p>");
        assert_eq!(dialog_height(&doc, panel), ESTIMATED_LINE_HEIGHT);
        doc.set_measured_height(panel, 480);
        assert_eq!(dialog_height(&doc, panel), 480);
    }

    proptest! {
        /// Shifting the scroll offset shifts the result by the same amount.
        #[test]
        fn translation_invariant_in_scroll(
            scroll in -100_000i32..100_000,
            shift in -10_000i32..10_000,
            viewport in 0i32..10_000,
            dialog in 0i32..20_000,
        ) {
            prop_assert_eq!(
                compute_top(scroll + shift, viewport, dialog),
                compute_top(scroll, viewport, dialog) + shift
            );
        }

        /// A dialog shorter than the viewport lands fully inside it.
        #[test]
        fn non_overflow_bands_stay_in_viewport(
            scroll in -100_000i32..100_000,
            viewport in 1i32..10_000,
            dialog in 0i32..10_000,
        ) {
            prop_assume!(dialog < viewport);
            let top = compute_top(scroll, viewport, dialog);
            prop_assert!(top >= scroll);
            prop_assert!(top + dialog <= scroll + viewport);
        }

        /// Determinism: same inputs, same output.
        #[test]
        fn pure_function(scroll in any::<i32>(), viewport in 0i32..50_000, dialog in 0i32..50_000) {
            prop_assert_eq!(
                compute_top(scroll, viewport, dialog),
                compute_top(scroll, viewport, dialog)
            );
        }
    }
}
