/// Every listing in the service pages at five items.
pub const PER_PAGE: i64 = 5;

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        Self {
            items,
            page: page.max(1),
            per_page,
            total,
        }
    }

    /// Page a fully materialized list in memory (used where the source is
    /// already capped, e.g. the latest-posts window).
    pub fn from_vec(all: Vec<T>, page: i64, per_page: i64) -> Self {
        let total = all.len() as i64;
        let page = page.max(1);
        // Page numbers come straight from the query string; saturate rather
        // than overflow on absurd values.
        let start = (page - 1).saturating_mul(per_page).min(total) as usize;
        let end = page.saturating_mul(per_page).min(total) as usize;
        let items = all.into_iter().skip(start).take(end - start).collect();
        Self {
            items,
            page,
            per_page,
            total,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// SQL OFFSET for a 1-based page number. Saturates on huge page numbers so
/// query-string input can never wrap into a negative offset.
pub fn offset(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based_and_clamps() {
        assert_eq!(offset(1, 5), 0);
        assert_eq!(offset(3, 5), 10);
        assert_eq!(offset(0, 5), 0);
        assert_eq!(offset(-2, 5), 0);
    }

    #[test]
    fn absurd_page_numbers_saturate_instead_of_overflowing() {
        assert_eq!(offset(i64::MAX, 5), i64::MAX);
        assert_eq!(offset(i64::MAX - 1, 5), i64::MAX);
        let all: Vec<i32> = (1..=7).collect();
        let page = Page::from_vec(all, i64::MAX, 5);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 7);
    }

    #[test]
    fn total_pages_rounds_up() {
        let p: Page<i32> = Page::new(vec![], 1, 5, 11);
        assert_eq!(p.total_pages(), 3);
        let empty: Page<i32> = Page::new(vec![], 1, 5, 0);
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_next());
    }

    #[test]
    fn from_vec_windows_the_list() {
        let all: Vec<i32> = (1..=7).collect();
        let first = Page::from_vec(all.clone(), 1, 5);
        assert_eq!(first.items, vec![1, 2, 3, 4, 5]);
        assert!(first.has_next());
        let second = Page::from_vec(all.clone(), 2, 5);
        assert_eq!(second.items, vec![6, 7]);
        assert!(second.has_prev());
        assert!(!second.has_next());
        let past_end = Page::from_vec(all, 9, 5);
        assert!(past_end.items.is_empty());
    }
}
