// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Number of pages needed for `len` items; zero for an empty view.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Clamp a 1-based page into `[1, max(1, page_count)]`.
pub fn clamp_page(page: usize, len: usize, page_size: usize) -> usize {
    page.clamp(1, page_count(len, page_size).max(1))
}

/// Items on 1-based `page`, clipped to the end of `items`.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_PAGE_SIZE, clamp_page, page_count, paginate};

    #[test]
    fn twenty_five_items_at_twelve_per_page() {
        let items: Vec<usize> = (0..25).collect();
        assert_eq!(page_count(items.len(), DEFAULT_PAGE_SIZE), 3);
        assert_eq!(paginate(&items, 1, DEFAULT_PAGE_SIZE).len(), 12);
        assert_eq!(paginate(&items, 2, DEFAULT_PAGE_SIZE)[0], 12);
        assert_eq!(paginate(&items, 3, DEFAULT_PAGE_SIZE), &[24]);
        assert!(paginate(&items, 4, DEFAULT_PAGE_SIZE).is_empty());
    }

    #[test]
    fn page_bounds_hold_for_every_length() {
        for page_size in 1..6 {
            for len in 0..40 {
                let pages = page_count(len, page_size);
                assert!(pages * page_size >= len);
                if len > 0 {
                    assert!((pages - 1) * page_size < len);
                } else {
                    assert_eq!(pages, 0);
                }
                let items: Vec<usize> = (0..len).collect();
                for page in 0..pages + 2 {
                    assert!(paginate(&items, page, page_size).len() <= page_size);
                }
            }
        }
    }

    #[test]
    fn clamp_keeps_page_in_range() {
        assert_eq!(clamp_page(0, 25, 12), 1);
        assert_eq!(clamp_page(9, 25, 12), 3);
        assert_eq!(clamp_page(3, 0, 12), 1);
        assert_eq!(clamp_page(2, 25, 12), 2);
    }

    #[test]
    fn zero_page_size_yields_no_pages() {
        assert_eq!(page_count(10, 0), 0);
        assert!(paginate(&[1, 2, 3], 1, 0).is_empty());
    }
}
