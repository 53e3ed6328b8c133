//! Fixed-size page-number pagination.
//!
//! Pages are 1-based. Out-of-range requests clamp to the nearest valid page
//! instead of failing, and an empty sequence still yields exactly one (empty)
//! page, so every feed URL with any `page` value renders something sensible.

/// A single page sliced out of an ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub total_pages: u32,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Parse a raw `page` query value. Anything that is not a positive integer
/// falls back to `None`, which [`paginate`] treats as page 1.
pub fn parse_page_param(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|&page| page > 0)
}

/// Slice `items` into the requested page of `per_page` entries.
///
/// `requested` of `None` means page 1. Requests beyond the last page clamp to
/// the last page; `per_page` is clamped to at least 1.
pub fn paginate<T: Clone>(items: &[T], requested: Option<u32>, per_page: u32) -> Page<T> {
    let per_page = per_page.max(1) as usize;
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1) as u32;

    let number = requested.unwrap_or(1).clamp(1, total_pages);

    let start = (number as usize - 1) * per_page;
    let end = (start + per_page).min(total_items);
    let page_items = items[start..end].to_vec();

    Page {
        items: page_items,
        number,
        total_pages,
        total_items,
        has_previous: number > 1,
        has_next: number < total_pages,
    }
}
