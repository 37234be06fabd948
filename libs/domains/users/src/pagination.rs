//! Page requests, repository pages and the paginated list envelope.
//!
//! The envelope preserves every incoming query parameter in its links so
//! filters survive page navigation.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PER_PAGE: u64 = 15;
pub const MAX_PER_PAGE: u64 = 100;
/// Highest page whose offset still fits a signed 64-bit SQL OFFSET
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PER_PAGE;

pub const PAGE_PARAM: &str = "page";
pub const PER_PAGE_PARAM: &str = "per_page";

/// 1-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    /// Page number, starting at 1 (default 1)
    pub page: u64,
    /// Page size, 1..=100 (default 15)
    pub per_page: u64,
}

impl PageRequest {
    /// Build a request, clamping both values into range.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Read `page` and `per_page` from raw query pairs.
    ///
    /// Missing or non-numeric values fall back to the defaults; the last
    /// occurrence of a repeated key wins.
    pub fn from_params<K: AsRef<str>, V: AsRef<str>>(params: &[(K, V)]) -> Self {
        let lookup = |name: &str| {
            params
                .iter()
                .rev()
                .find(|(k, _)| k.as_ref() == name)
                .and_then(|(_, v)| v.as_ref().trim().parse::<u64>().ok())
        };

        Self::new(
            lookup(PAGE_PARAM).unwrap_or(1),
            lookup(PER_PAGE_PARAM).unwrap_or(DEFAULT_PER_PAGE),
        )
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of results plus the total number of matches
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.request.per_page).max(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    /// 1-based index of the first item on this page, `null` when empty
    pub from: Option<u64>,
    pub to: Option<u64>,
}

/// Paginated collection response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub links: PageLinks,
    pub meta: PageMeta,
}

impl<T> ListResponse<T> {
    /// Wrap `page`, building links from `path` and the request's query pairs.
    pub fn from_page<K: AsRef<str>, V: AsRef<str>>(
        page: Page<T>,
        path: &str,
        params: &[(K, V)],
    ) -> Self {
        let current = page.request.page;
        let last = page.last_page();
        let count = page.items.len() as u64;

        let (from, to) = if count == 0 {
            (None, None)
        } else {
            let from = page.request.offset().saturating_add(1);
            (Some(from), Some(from.saturating_add(count - 1)))
        };

        let link = |n: u64| page_url(path, params, n);

        let links = PageLinks {
            first: link(1),
            last: link(last),
            prev: (current > 1).then(|| link(current - 1)),
            next: (current < last).then(|| link(current + 1)),
        };

        let meta = PageMeta {
            current_page: current,
            per_page: page.request.per_page,
            total: page.total,
            last_page: last,
            from,
            to,
        };

        Self {
            data: page.items,
            links,
            meta,
        }
    }
}

/// `path?<params without page>&page=<n>`, percent-encoded.
pub fn page_url<K: AsRef<str>, V: AsRef<str>>(path: &str, params: &[(K, V)], page: u64) -> String {
    let mut query: Vec<String> = params
        .iter()
        .filter(|(k, _)| k.as_ref() != PAGE_PARAM)
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect();
    query.push(format!("{}={}", PAGE_PARAM, page));

    format!("{}?{}", path, query.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_page_request_defaults_and_clamping() {
        let none: Vec<(String, String)> = vec![];
        assert_eq!(PageRequest::from_params(&none), PageRequest::new(1, 15));

        let params = pairs(&[("page", "0"), ("per_page", "1000")]);
        assert_eq!(PageRequest::from_params(&params), PageRequest::new(1, 100));

        let params = pairs(&[("page", "abc"), ("per_page", "5")]);
        assert_eq!(PageRequest::from_params(&params), PageRequest::new(1, 5));
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let huge = u64::MAX.to_string();
        let params = pairs(&[("page", huge.as_str()), ("per_page", "100")]);
        let request = PageRequest::from_params(&params);

        assert_eq!(request.page, MAX_PAGE);
        assert!(i64::try_from(request.offset()).is_ok());

        let page: Page<u8> = Page::new(vec![], 3, request);
        let list = ListResponse::from_page(page, "/users", &params);

        assert_eq!(list.meta.current_page, MAX_PAGE);
        assert_eq!(list.meta.total, 3);
        assert_eq!(list.meta.last_page, 1);
        assert_eq!(list.meta.from, None);
        assert_eq!(list.links.next, None);
    }

    #[test]
    fn test_list_response_meta_and_links() {
        let params = pairs(&[("name", "Ann Lee"), ("page", "2"), ("per_page", "2")]);
        let page = Page::new(vec!["c", "d"], 5, PageRequest::from_params(&params));

        let list = ListResponse::from_page(page, "/api/v1/users", &params);

        assert_eq!(list.meta.current_page, 2);
        assert_eq!(list.meta.last_page, 3);
        assert_eq!(list.meta.from, Some(3));
        assert_eq!(list.meta.to, Some(4));
        assert_eq!(
            list.links.first,
            "/api/v1/users?name=Ann%20Lee&per_page=2&page=1"
        );
        assert_eq!(
            list.links.next.as_deref(),
            Some("/api/v1/users?name=Ann%20Lee&per_page=2&page=3")
        );
        assert_eq!(
            list.links.prev.as_deref(),
            Some("/api/v1/users?name=Ann%20Lee&per_page=2&page=1")
        );
    }

    #[test]
    fn test_empty_page() {
        let none: Vec<(String, String)> = vec![];
        let page: Page<u8> = Page::new(vec![], 0, PageRequest::default());
        let list = ListResponse::from_page(page, "/users", &none);

        assert_eq!(list.meta.last_page, 1);
        assert_eq!(list.meta.from, None);
        assert_eq!(list.links.prev, None);
        assert_eq!(list.links.next, None);
        assert_eq!(list.links.last, "/users?page=1");
    }
}
