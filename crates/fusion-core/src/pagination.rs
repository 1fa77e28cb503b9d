//! Page navigation over `count`-based list endpoints.

/// Tracks the current page of a list whose total item count is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    page_size: u32,
    current: u32,
}

impl Paginator {
    /// A paginator positioned on page 1. A zero `page_size` is treated as 1.
    pub fn new(count: u64, page_size: u32) -> Self {
        Self {
            count,
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// `ceil(count / page_size)`; zero when there are no items.
    pub fn total_pages(&self) -> u32 {
        let pages = self.count.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Controls are hidden when everything fits on one page.
    pub fn shows_controls(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages()
    }

    /// Move to `page`. Pages outside `[1, total_pages]` are refused and the
    /// current page is left unchanged.
    pub fn go_to(&mut self, page: u32) -> bool {
        if page == 0 || page > self.total_pages() {
            return false;
        }
        self.current = page;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_items_make_three_pages() {
        let p = Paginator::new(13, 6);
        assert_eq!(p.total_pages(), 3);
        assert!(p.shows_controls());
        assert!(!p.has_previous());
        assert!(p.has_next());
    }

    #[test]
    fn out_of_range_pages_are_refused() {
        let mut p = Paginator::new(13, 6);
        assert!(!p.go_to(0));
        assert!(!p.go_to(4));
        assert_eq!(p.current(), 1);

        assert!(p.go_to(3));
        assert_eq!(p.current(), 3);
        assert!(!p.has_next());
        assert!(p.has_previous());
        assert!(!p.go_to(4));
        assert_eq!(p.current(), 3);
    }

    #[test]
    fn single_page_hides_controls() {
        assert!(!Paginator::new(6, 6).shows_controls());
        assert_eq!(Paginator::new(0, 6).total_pages(), 0);
        assert!(!Paginator::new(0, 6).shows_controls());
        assert_eq!(Paginator::new(7, 6).total_pages(), 2);
    }

}
