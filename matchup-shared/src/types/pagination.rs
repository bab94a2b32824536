use serde::{Deserialize, Serialize};

pub const MAX_PER_PAGE: u64 = 100;

/// Query-string pagination. `per_page` falls back to the service's configured
/// page size when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default)]
    pub per_page: Option<u64>,
}

fn default_page() -> u64 { 1 }

impl PaginationParams {
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    pub fn limit(&self, default_per_page: u64) -> u64 {
        self.per_page.unwrap_or(default_per_page).clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self, default_per_page: u64) -> u64 {
        (self.page() - 1).saturating_mul(self.limit(default_per_page))
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: None }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams, default_per_page: u64) -> Self {
        let per_page = params.limit(default_per_page);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(per_page) };
        Self {
            items,
            total,
            page: params.page(),
            per_page,
            total_pages,
        }
    }

    /// Cuts one page out of an already ordered, fully materialized result.
    pub fn from_all(all: Vec<T>, params: &PaginationParams, default_per_page: u64) -> Self {
        let total = all.len() as u64;
        let offset = usize::try_from(params.offset(default_per_page)).unwrap_or(usize::MAX);
        let limit = params.limit(default_per_page) as usize;
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self::new(items, total, params, default_per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: u64, per_page: Option<u64>) -> PaginationParams {
        PaginationParams { page, per_page }
    }

    #[test]
    fn falls_back_to_service_page_size() {
        let p = params(2, None);
        assert_eq!(p.limit(3), 3);
        assert_eq!(p.offset(3), 3);
    }

    #[test]
    fn per_page_is_capped() {
        assert_eq!(params(1, Some(10_000)).limit(3), MAX_PER_PAGE);
        assert_eq!(params(1, Some(0)).limit(3), 1);
    }

    #[test]
    fn page_zero_is_first_page() {
        assert_eq!(params(0, None).offset(3), 0);
    }

    #[test]
    fn from_all_slices_and_counts() {
        let page = Paginated::from_all((1..=7).collect::<Vec<_>>(), &params(3, None), 3);
        assert_eq!(page.items, vec![7]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);

        let past_end = Paginated::from_all((1..=7).collect::<Vec<_>>(), &params(9, None), 3);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.page, 9);
    }

    #[test]
    fn huge_page_number_yields_empty_page() {
        let p = params(u64::MAX, None);
        assert_eq!(p.offset(3), u64::MAX);

        let page = Paginated::from_all((1..=7).collect::<Vec<_>>(), &p, 3);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 7);
        assert_eq!(page.page, u64::MAX);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page = Paginated::<u8>::from_all(vec![], &PaginationParams::default(), 3);
        assert_eq!(page.total_pages, 0);
    }
}
