//! Page-window arithmetic.
//!
//! Page numbers are 1-based. Out-of-range input is clamped, never rejected:
//! a page number or page size below 1 behaves like 1.

/// The `[start, end]` slice of a list selected for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u64,
    size: u64,
    start: u64,
    end: u64,
    empty: bool,
}

impl PageWindow {
    /// Window for `page` at `size` items per page, before the list length is
    /// known: `start = (page-1)*size`, `end = start + size - 1`.
    pub fn new(page: u64, size: u64) -> Self {
        let page = page.max(1);
        let size = size.max(1);
        let start = (page - 1).saturating_mul(size);
        let end = start.saturating_add(size - 1);
        Self {
            page,
            size,
            start,
            end,
            empty: false,
        }
    }

    /// Window from a raw, possibly negative page number as supplied by a caller.
    pub fn from_raw(page: i64, size: u64) -> Self {
        Self::new(u64::try_from(page).unwrap_or(1), size)
    }

    /// Fit the window to a list holding `total` elements.
    ///
    /// An empty list collapses the window to `[0, 0]` and marks it empty.
    /// Otherwise `end` is cut to the last index; a page entirely past the
    /// tail ends up with `start > end` and is empty as well.
    pub fn clamp(mut self, total: u64) -> Self {
        if total == 0 {
            self.start = 0;
            self.end = 0;
            self.empty = true;
            return self;
        }
        self.end = self.end.min(total - 1);
        self.empty = self.start > self.end;
        self
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Whether the window selects nothing.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Whether elements remain after this window in a list of `total`.
    pub fn has_more(&self, total: u64) -> bool {
        total > 0 && self.end.saturating_add(1) < total
    }
}

/// `min(page + 1, ceil(total / size))`. Yields 0 for an empty list.
pub fn next_page(total: u64, size: u64, page: u64) -> u64 {
    let last = total.div_ceil(size.max(1));
    page.saturating_add(1).min(last)
}

/// `max(page - 1, 1)`.
pub fn prev_page(page: u64) -> u64 {
    page.saturating_sub(1).max(1)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn first_pages() {
        let w = PageWindow::new(1, 10);
        assert_eq!((w.start(), w.end()), (0, 9));
        let w = PageWindow::new(3, 10);
        assert_eq!((w.start(), w.end()), (20, 29));
    }

    #[test]
    fn clamp_cuts_to_tail() {
        let w = PageWindow::new(2, 10).clamp(15);
        assert_eq!((w.start(), w.end()), (10, 14));
        assert!(!w.is_empty());
        assert!(!w.has_more(15));

        let w = PageWindow::new(1, 10).clamp(15);
        assert!(w.has_more(15));
    }

    #[test]
    fn clamp_empty_list() {
        let w = PageWindow::new(4, 10).clamp(0);
        assert_eq!((w.start(), w.end()), (0, 0));
        assert!(w.is_empty());
        assert!(!w.has_more(0));
    }

    #[test]
    fn page_past_the_tail_is_empty() {
        let w = PageWindow::new(5, 10).clamp(12);
        assert!(w.is_empty());
        assert!(w.start() > w.end());
    }

    #[test]
    fn bad_input_is_clamped() {
        assert_eq!(PageWindow::new(0, 0), PageWindow::new(1, 1));
        assert_eq!(PageWindow::from_raw(-3, 10), PageWindow::new(1, 10));
        assert_eq!(PageWindow::from_raw(2, 10).start(), 10);
    }

    #[test]
    fn navigation() {
        assert_eq!(next_page(25, 10, 1), 2);
        assert_eq!(next_page(25, 10, 3), 3);
        assert_eq!(next_page(30, 10, 3), 3);
        assert_eq!(next_page(0, 10, 1), 0);
        assert_eq!(prev_page(1), 1);
        assert_eq!(prev_page(0), 1);
        assert_eq!(prev_page(4), 3);
    }

    proptest! {
        #[test]
        fn clamped_window_stays_inside_the_list(
            page in 1u64..1_000,
            size in 1u64..200,
            total in 0u64..50_000,
        ) {
            let w = PageWindow::new(page, size).clamp(total);
            if total == 0 {
                prop_assert!(w.is_empty());
                prop_assert_eq!((w.start(), w.end()), (0, 0));
            } else {
                prop_assert!(w.end() <= total - 1);
                prop_assert!(w.is_empty() || w.start() <= w.end());
                prop_assert_eq!(w.is_empty(), w.start() >= total);
            }
        }

        #[test]
        fn navigation_stays_in_bounds(
            page in 1u64..1_000,
            size in 1u64..200,
            total in 1u64..50_000,
        ) {
            let last = total.div_ceil(size);
            let next = next_page(total, size, page);
            prop_assert!(next <= last);
            prop_assert!(next >= 1);
            prop_assert!(prev_page(page) >= 1);
            prop_assert!(prev_page(page) <= page);
        }
    }
}
