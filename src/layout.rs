//! Paging and focus over the panel grid.
//!
//! Panels are laid out four to a page, two over two. Focus is an absolute
//! panel index; the page always follows it.

/// Panels per page (2×2 grid)
pub const PAGE_SIZE: usize = 4;

/// What the display has to do after a focus or page change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutChange {
    /// Nothing moved
    None,
    /// Same page, only the focus pointer moved
    Focus,
    /// The visible page changed; the grid must be rebuilt
    Page,
}

#[derive(Clone, Debug)]
pub struct LayoutController {
    panel_count: usize,
    current_page: usize,
    focused: usize,
}

impl LayoutController {
    pub fn new(panel_count: usize) -> Self {
        Self {
            panel_count,
            current_page: 0,
            focused: 0,
        }
    }

    pub fn num_pages(&self) -> usize {
        self.panel_count.div_ceil(PAGE_SIZE)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    /// Panel indices on `page`, row-major, `None` for unused cells.
    pub fn page_slots(&self, page: usize) -> [Option<usize>; PAGE_SIZE] {
        let start = page * PAGE_SIZE;
        std::array::from_fn(|cell| {
            let index = start + cell;
            (index < self.panel_count).then_some(index)
        })
    }

    /// Every page with its slots.
    pub fn paginate(&self) -> Vec<[Option<usize>; PAGE_SIZE]> {
        (0..self.num_pages()).map(|page| self.page_slots(page)).collect()
    }

    /// Half-open panel range of the current page
    pub fn page_range(&self) -> std::ops::Range<usize> {
        let start = self.current_page * PAGE_SIZE;
        start..(start + PAGE_SIZE).min(self.panel_count)
    }

    /// Move `delta` pages, wrapping. Focus lands on the first panel of the
    /// destination page.
    pub fn go_to_page(&mut self, delta: isize) -> LayoutChange {
        let pages = self.num_pages();
        if pages <= 1 {
            return LayoutChange::None;
        }
        let target = (self.current_page as isize + delta).rem_euclid(pages as isize) as usize;
        if target == self.current_page {
            return LayoutChange::None;
        }
        self.show_page(target);
        LayoutChange::Page
    }

    /// Move focus by `delta` across all panels, wrapping at both ends, and
    /// follow it onto its page.
    pub fn shift_focus(&mut self, delta: isize) -> LayoutChange {
        if self.panel_count == 0 {
            return LayoutChange::None;
        }
        let target = (self.focused as isize + delta).rem_euclid(self.panel_count as isize) as usize;
        self.focus(target)
    }

    /// Focus `index` directly, switching page if needed.
    pub fn focus(&mut self, index: usize) -> LayoutChange {
        if self.panel_count == 0 {
            return LayoutChange::None;
        }
        let index = index.min(self.panel_count - 1);
        if index == self.focused {
            return LayoutChange::None;
        }
        let page = index / PAGE_SIZE;
        if page != self.current_page {
            self.show_page(page);
            self.focused = index;
            LayoutChange::Page
        } else {
            self.focused = index;
            LayoutChange::Focus
        }
    }

    fn show_page(&mut self, page: usize) {
        self.current_page = page;
        self.focused = page * PAGE_SIZE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ten_sources_make_three_pages() {
        let layout = LayoutController::new(10);
        assert_eq!(layout.num_pages(), 3);
        assert_eq!(layout.page_slots(2), [Some(8), Some(9), None, None]);
        assert_eq!(layout.paginate().len(), 3);
        assert_eq!(layout.paginate()[0], [Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn no_sources_means_no_pages() {
        let mut layout = LayoutController::new(0);
        assert_eq!(layout.num_pages(), 0);
        assert_eq!(layout.shift_focus(1), LayoutChange::None);
        assert_eq!(layout.go_to_page(1), LayoutChange::None);
    }

    #[test]
    fn focus_crossing_page_boundary_switches_page() {
        let mut layout = LayoutController::new(10);
        layout.focus(3);
        assert_eq!(layout.current_page(), 0);

        assert_eq!(layout.shift_focus(1), LayoutChange::Page);
        assert_eq!(layout.focused(), 4);
        assert_eq!(layout.current_page(), 1);
    }

    #[test]
    fn focus_within_page_only_moves_pointer() {
        let mut layout = LayoutController::new(10);
        assert_eq!(layout.shift_focus(1), LayoutChange::Focus);
        assert_eq!(layout.focused(), 1);
        assert_eq!(layout.current_page(), 0);
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut layout = LayoutController::new(10);
        assert_eq!(layout.shift_focus(-1), LayoutChange::Page);
        assert_eq!(layout.focused(), 9);
        assert_eq!(layout.current_page(), 2);

        assert_eq!(layout.shift_focus(1), LayoutChange::Page);
        assert_eq!(layout.focused(), 0);
        assert_eq!(layout.current_page(), 0);
    }

    #[test]
    fn paging_wraps_and_refocuses() {
        let mut layout = LayoutController::new(10);
        layout.focus(2);
        assert_eq!(layout.go_to_page(-1), LayoutChange::Page);
        assert_eq!(layout.current_page(), 2);
        assert_eq!(layout.focused(), 8);

        assert_eq!(layout.go_to_page(1), LayoutChange::Page);
        assert_eq!(layout.current_page(), 0);
        assert_eq!(layout.focused(), 0);
    }

    #[test]
    fn single_page_ignores_paging() {
        let mut layout = LayoutController::new(3);
        layout.focus(2);
        assert_eq!(layout.go_to_page(1), LayoutChange::None);
        assert_eq!(layout.focused(), 2);
    }

    proptest! {
        #[test]
        fn focus_stays_on_current_page(panels in 1usize..30, moves in proptest::collection::vec(-3isize..=3, 0..50), pages in proptest::collection::vec(-2isize..=2, 0..10)) {
            let mut layout = LayoutController::new(panels);
            for delta in moves {
                layout.shift_focus(delta);
                prop_assert!(layout.focused() < panels);
                prop_assert!(layout.page_range().contains(&layout.focused()));
            }
            for delta in pages {
                layout.go_to_page(delta);
                prop_assert!(layout.page_range().contains(&layout.focused()));
            }
        }
    }
}
