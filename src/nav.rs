//! Focus and highlight tracking for keyboard navigation.
//!
//! `Navigation` only knows the length of the current filtered list; the
//! widget passes it in on every transition so the highlight never points
//! past the end.

/// Whether the text input has focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Blurred,
    Focused,
}

/// The observable navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Blurred,
    /// Focused with no highlighted row.
    Idle,
    Highlighted(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    focus: Focus,
    highlight: Option<usize>,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavState {
        match (self.focus, self.highlight) {
            (Focus::Blurred, _) => NavState::Blurred,
            (Focus::Focused, None) => NavState::Idle,
            (Focus::Focused, Some(i)) => NavState::Highlighted(i),
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focus == Focus::Focused
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// Gain focus. The highlight is left as is.
    pub fn focus(&mut self) {
        self.focus = Focus::Focused;
    }

    /// Lose focus and drop the highlight.
    pub fn blur(&mut self) {
        self.focus = Focus::Blurred;
        self.highlight = None;
    }

    /// Move the highlight one row up, stopping at the first row.
    ///
    /// Returns the new highlight when focused and the list is non-empty.
    pub fn move_up(&mut self, len: usize) -> Option<usize> {
        if !self.is_focused() || len == 0 {
            return None;
        }
        let next = match self.highlight {
            None => 0,
            Some(i) => i.saturating_sub(1).min(len - 1),
        };
        self.set(next)
    }

    /// Move the highlight one row down, stopping at the last row.
    pub fn move_down(&mut self, len: usize) -> Option<usize> {
        if !self.is_focused() || len == 0 {
            return None;
        }
        let next = match self.highlight {
            None => 0,
            Some(i) => (i + 1).min(len - 1),
        };
        self.set(next)
    }

    /// Row a confirm acts on: the highlight, or the first row if none.
    pub fn confirm_target(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.highlight.unwrap_or(0).min(len - 1))
    }

    /// Point the highlight back at the first row.
    pub fn reset(&mut self, len: usize) {
        self.highlight = Some(0);
        self.reconcile(len);
    }

    /// Clamp the highlight into `0..len`, clearing it for an empty list.
    pub fn reconcile(&mut self, len: usize) {
        self.highlight = match self.highlight {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => None,
        };
    }

    fn set(&mut self, index: usize) -> Option<usize> {
        if self.highlight != Some(index) {
            tracing::debug!(from = ?self.highlight, to = index, "highlight moved");
        }
        self.highlight = Some(index);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focused() -> Navigation {
        let mut nav = Navigation::new();
        nav.focus();
        nav
    }

    #[test]
    fn starts_blurred() {
        let nav = Navigation::new();
        assert_eq!(nav.state(), NavState::Blurred);
    }

    #[test]
    fn focus_is_idle() {
        assert_eq!(focused().state(), NavState::Idle);
    }

    #[test]
    fn arrows_ignored_while_blurred() {
        let mut nav = Navigation::new();
        assert_eq!(nav.move_down(5), None);
        assert_eq!(nav.move_up(5), None);
        assert_eq!(nav.highlight(), None);
    }

    #[test]
    fn first_arrow_highlights_first_row() {
        let mut nav = focused();
        assert_eq!(nav.move_up(5), Some(0));

        let mut nav = focused();
        assert_eq!(nav.move_down(5), Some(0));
        assert_eq!(nav.state(), NavState::Highlighted(0));
    }

    #[test]
    fn clamps_without_wrapping() {
        let mut nav = focused();
        for _ in 0..10 {
            nav.move_down(3);
        }
        assert_eq!(nav.highlight(), Some(2));
        for _ in 0..10 {
            nav.move_up(3);
        }
        assert_eq!(nav.highlight(), Some(0));
    }

    #[test]
    fn empty_list_has_no_highlight() {
        let mut nav = focused();
        assert_eq!(nav.move_down(0), None);
        nav.reset(0);
        assert_eq!(nav.state(), NavState::Idle);
        assert_eq!(nav.confirm_target(0), None);
    }

    #[test]
    fn confirm_defaults_to_first_row() {
        let nav = focused();
        assert_eq!(nav.confirm_target(4), Some(0));
    }

    #[test]
    fn blur_clears_highlight() {
        let mut nav = focused();
        nav.move_down(4);
        nav.move_down(4);
        nav.blur();
        assert_eq!(nav.state(), NavState::Blurred);
        nav.focus();
        assert_eq!(nav.state(), NavState::Idle);
    }

    #[test]
    fn reconcile_after_shrink() {
        let mut nav = focused();
        for _ in 0..5 {
            nav.move_down(10);
        }
        nav.reconcile(2);
        assert_eq!(nav.highlight(), Some(1));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn highlight_stays_in_bounds(
                len in 0usize..20,
                moves in proptest::collection::vec(any::<bool>(), 0..60),
            ) {
                let mut nav = focused();
                let mut previous = nav.highlight();
                for up in moves {
                    if up { nav.move_up(len); } else { nav.move_down(len); }
                    match nav.highlight() {
                        Some(i) => prop_assert!(i < len),
                        None => prop_assert_eq!(len, 0),
                    }
                    // No wraparound: a single step moves at most one row.
                    if let (Some(a), Some(b)) = (previous, nav.highlight()) {
                        prop_assert!(a.abs_diff(b) <= 1);
                    }
                    previous = nav.highlight();
                }
            }
        }
    }
}
