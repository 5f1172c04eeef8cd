/// Default page size, matching the client dashboard table.
pub const DEFAULT_PAGE_SIZE: usize = 25;

pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Reset to page 1 when the current index exceeds the new page count
/// (happens after a filter change shrinks the set). An empty set has zero
/// pages and also resets to 1.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    let page = page.max(1);
    if page > total_pages {
        1
    } else {
        page
    }
}

/// Slice out one page: `[(page-1)*size, page*size)`.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_bounded_and_lossless() {
        let items: Vec<u32> = (0..53).collect();
        let size = 25;
        let pages = total_pages(items.len(), size);
        assert_eq!(pages, 3);

        let mut rebuilt = Vec::new();
        for p in 1..=pages {
            let page = paginate(&items, p, size);
            assert!(page.len() <= size);
            rebuilt.extend_from_slice(page);
        }
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn out_of_range_page_is_empty_slice() {
        let items: Vec<u32> = (0..10).collect();
        assert!(paginate(&items, 5, 25).is_empty());
    }

    #[test]
    fn page_resets_when_beyond_total() {
        assert_eq!(clamp_page(4, 2), 1);
        assert_eq!(clamp_page(2, 2), 2);
        assert_eq!(clamp_page(0, 2), 1);
    }

    #[test]
    fn empty_set_resets_to_page_one() {
        // A filter change can empty the set while the cursor is deep in.
        assert_eq!(clamp_page(3, 0), 1);
        assert_eq!(clamp_page(1, 0), 1);
    }

    #[test]
    fn empty_set_has_zero_pages() {
        assert_eq!(total_pages(0, 25), 0);
        let empty: [u32; 0] = [];
        assert!(paginate(&empty, 1, 25).is_empty());
    }
}
