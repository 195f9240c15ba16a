//! Page-number pagination for post listings.

use serde::Serialize;

use crate::error::DomainError;

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: u64 = 3;

/// One page of a paginated sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total_items: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, num_pages: u64, total_items: u64) -> Self {
        Self {
            items,
            number,
            num_pages,
            total_items,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }
}

/// Number of pages needed for `total` items. An empty listing has one page.
pub fn num_pages(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page).max(1)
}

/// Resolve the raw `page` parameter to a 1-based page number.
///
/// Accepts a positive integer or `last`. Anything else, or a page past the
/// end, is NotFound.
pub fn resolve_page(raw: Option<&str>, total: u64, per_page: u64) -> Result<u64, DomainError> {
    let last = num_pages(total, per_page);
    let number = match raw.map(str::trim) {
        None | Some("") => 1,
        Some("last") => last,
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| DomainError::not_found("page", value))?,
    };

    if number == 0 || number > last {
        return Err(DomainError::not_found("page", number));
    }
    Ok(number)
}

/// Offset of the first item on page `number`.
pub fn offset(number: u64, per_page: u64) -> u64 {
    (number - 1) * per_page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page() {
        assert_eq!(resolve_page(None, 10, 3).unwrap(), 1);
        assert_eq!(resolve_page(Some(""), 10, 3).unwrap(), 1);
    }

    #[test]
    fn test_last_page() {
        assert_eq!(resolve_page(Some("last"), 10, 3).unwrap(), 4);
        assert_eq!(resolve_page(Some("last"), 0, 3).unwrap(), 1);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        assert_eq!(resolve_page(Some("1"), 0, 3).unwrap(), 1);
        assert!(resolve_page(Some("2"), 0, 3).unwrap_err().is_not_found());
    }

    #[test]
    fn test_out_of_range_is_not_found() {
        assert!(resolve_page(Some("5"), 10, 3).unwrap_err().is_not_found());
        assert!(resolve_page(Some("0"), 10, 3).unwrap_err().is_not_found());
        assert!(resolve_page(Some("abc"), 10, 3).unwrap_err().is_not_found());
        assert!(resolve_page(Some("-1"), 10, 3).unwrap_err().is_not_found());
    }

    #[test]
    fn test_page_flags() {
        let page = Page::new(vec![1, 2, 3], 2, 3, 9);
        assert!(page.has_previous);
        assert!(page.has_next);
        assert_eq!(offset(2, 3), 3);
    }
}
