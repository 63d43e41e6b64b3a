//! Collapsing of the pin area to a fixed number of wrapped rows.
//!
//! The core never measures anything itself. Renderers report the top offset
//! of each pin as laid out, and [`PinOverflow::from_offsets`] turns that into
//! the index of the first pin to hide.

pub const DEFAULT_VISIBLE_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinOverflow {
    first_hidden: Option<usize>,
}

impl PinOverflow {
    pub fn none() -> Self {
        Self::default()
    }

    /// `offsets[i]` is the top edge of pin `i` in layout order.
    pub fn from_offsets(offsets: &[i32], visible_rows: usize) -> Self {
        let mut rows: Vec<i32> = Vec::new();
        for offset in offsets {
            if !rows.contains(offset) {
                rows.push(*offset);
            }
        }
        let Some(&cutoff) = rows.get(visible_rows) else {
            return Self::none();
        };
        Self {
            first_hidden: offsets.iter().position(|offset| *offset >= cutoff),
        }
    }

    pub fn first_hidden(&self) -> Option<usize> {
        self.first_hidden
    }

    pub fn hidden_count(&self, pin_count: usize) -> usize {
        self.first_hidden
            .map_or(0, |idx| pin_count.saturating_sub(idx))
    }

    pub fn is_hidden(&self, index: usize, show_all: bool) -> bool {
        !show_all && self.first_hidden.is_some_and(|idx| index >= idx)
    }

    /// Label for the expand/collapse toggle, or `None` when nothing overflows.
    pub fn toggle_label(&self, pin_count: usize, show_all: bool) -> Option<String> {
        let hidden = self.hidden_count(pin_count);
        if hidden == 0 {
            return None;
        }
        Some(if show_all {
            "Show less".to_string()
        } else {
            format!("Show more ({hidden})")
        })
    }
}

/// Flex-wrap layout of fixed-width items, returning each item's row index as
/// its offset. Items wider than `available` take a row of their own.
pub fn wrap_offsets(widths: &[usize], available: usize, gap: usize) -> Vec<i32> {
    let mut offsets = Vec::with_capacity(widths.len());
    let mut row = 0i32;
    let mut used = 0usize;

    for &width in widths {
        if used > 0 && used + gap + width > available {
            row += 1;
            used = 0;
        }
        used += if used == 0 { width } else { gap + width };
        offsets.push(row);
    }

    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_rows_never_overflow() {
        let overflow = PinOverflow::from_offsets(&[0, 0, 40, 40, 80], DEFAULT_VISIBLE_ROWS);
        assert_eq!(overflow.first_hidden(), None);
        assert_eq!(overflow.toggle_label(5, false), None);
    }

    #[test]
    fn fourth_row_starts_hidden_region() {
        let offsets = [0, 0, 40, 80, 120, 120, 160];
        let overflow = PinOverflow::from_offsets(&offsets, DEFAULT_VISIBLE_ROWS);
        assert_eq!(overflow.first_hidden(), Some(4));
        assert_eq!(overflow.hidden_count(offsets.len()), 3);
        assert!(overflow.is_hidden(4, false));
        assert!(!overflow.is_hidden(3, false));
        assert!(!overflow.is_hidden(6, true));
        assert_eq!(overflow.toggle_label(7, false).as_deref(), Some("Show more (3)"));
        assert_eq!(overflow.toggle_label(7, true).as_deref(), Some("Show less"));
    }

    #[test]
    fn wrapping_packs_rows_greedily() {
        let offsets = wrap_offsets(&[10, 10, 10, 30, 5], 25, 1);
        assert_eq!(offsets, vec![0, 0, 1, 2, 3]);
        assert!(wrap_offsets(&[], 10, 1).is_empty());
    }
}
