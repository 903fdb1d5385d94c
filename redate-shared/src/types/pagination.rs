use serde::{Deserialize, Serialize};

/// Query parameters shared by the paged list endpoints (`?page=&limit=`).
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 { 1 }
fn default_limit() -> i64 { 20 }

impl PageParams {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, params: &PageParams) -> Self {
        Self {
            items,
            page: params.page.max(1),
            limit: params.limit(),
            total: None,
        }
    }

    pub fn with_total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_starts_at_zero() {
        let params = PageParams { page: 1, limit: 20 };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn offset_advances_by_limit() {
        let params = PageParams { page: 3, limit: 20 };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn limit_is_clamped() {
        let params = PageParams { page: 1, limit: 500 };
        assert_eq!(params.limit(), 100);
        let params = PageParams { page: 1, limit: 0 };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn nonpositive_page_is_treated_as_first() {
        let params = PageParams { page: 0, limit: 20 };
        assert_eq!(params.offset(), 0);
        let page = Page::new(Vec::<i32>::new(), &params);
        assert_eq!(page.page, 1);
    }
}
