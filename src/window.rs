//! Windowing for the option list: which rows to materialize for a given
//! scroll position, and how to scroll so a row becomes visible.
//!
//! All lengths (`scroll_offset`, `viewport_height`, `row_height`) share one
//! unit: terminal lines for the CLI, pixels for a graphical host.

use std::ops::Range;

/// Default extra rows rendered above and below the viewport.
pub const DEFAULT_OVERSCAN: usize = 3;

/// Row range to render for `len` rows, as a half-open `start..end`.
///
/// Covers every row at least partially inside the viewport, widened by
/// `overscan` rows on each side and clamped to `0..len`.
pub fn visible_slice(
    len: usize,
    scroll_offset: usize,
    viewport_height: usize,
    row_height: usize,
    overscan: usize,
) -> Range<usize> {
    if len == 0 || viewport_height == 0 {
        return 0..0;
    }
    let row_height = row_height.max(1);

    let first = (scroll_offset / row_height).min(len - 1);
    let last = scroll_offset
        .saturating_add(viewport_height)
        .div_ceil(row_height)
        .min(len);

    let start = first.saturating_sub(overscan);
    let end = last.saturating_add(overscan).min(len);
    start..end.max(first + 1)
}

/// Scroll state for a fixed-row-height list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    pub scroll_offset: usize,
    pub viewport_height: usize,
    pub row_height: usize,
    pub overscan: usize,
}

impl Default for ViewWindow {
    fn default() -> Self {
        ViewWindow::new(10, 1)
    }
}

impl ViewWindow {
    pub fn new(viewport_height: usize, row_height: usize) -> Self {
        ViewWindow {
            scroll_offset: 0,
            viewport_height,
            row_height: row_height.max(1),
            overscan: DEFAULT_OVERSCAN,
        }
    }

    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Rows to render for a list of `len` rows.
    pub fn slice(&self, len: usize) -> Range<usize> {
        visible_slice(
            len,
            self.scroll_offset,
            self.viewport_height,
            self.row_height,
            self.overscan,
        )
    }

    /// Rows fully or partly inside the viewport, without overscan.
    pub fn visible(&self, len: usize) -> Range<usize> {
        visible_slice(len, self.scroll_offset, self.viewport_height, self.row_height, 0)
    }

    /// Number of whole rows the viewport shows.
    pub fn rows_per_page(&self) -> usize {
        self.viewport_height / self.row_height.max(1)
    }

    pub fn max_offset(&self, len: usize) -> usize {
        len.saturating_mul(self.row_height)
            .saturating_sub(self.viewport_height)
    }

    /// Scroll the least amount that makes row `index` fully visible.
    /// Returns whether the offset changed.
    pub fn scroll_to_item(&mut self, index: usize, len: usize) -> bool {
        if len == 0 || self.viewport_height == 0 {
            return false;
        }
        let index = index.min(len - 1);
        let top = index * self.row_height;
        let bottom = top + self.row_height;

        let next = if top < self.scroll_offset {
            top
        } else if bottom > self.scroll_offset + self.viewport_height {
            // A row taller than the viewport aligns to its top.
            bottom.saturating_sub(self.viewport_height).min(top)
        } else {
            self.scroll_offset
        };

        if next == self.scroll_offset {
            return false;
        }
        tracing::debug!(index, from = self.scroll_offset, to = next, "scroll to item");
        self.scroll_offset = next;
        true
    }

    /// Scroll by `delta` units, clamped to the content.
    pub fn scroll_by(&mut self, delta: isize, len: usize) {
        let target = if delta < 0 {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_offset.saturating_add(delta as usize)
        };
        self.scroll_offset = target.min(self.max_offset(len));
    }

    pub fn resize(&mut self, viewport_height: usize, len: usize) {
        self.viewport_height = viewport_height;
        self.clamp(len);
    }

    /// Pull the offset back inside the content after the list shrank.
    pub fn clamp(&mut self, len: usize) {
        self.scroll_offset = self.scroll_offset.min(self.max_offset(len));
    }

    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }
}
