mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BlogQueryParams {
    #[serde(default = "get_default_page")]
    pub page: u32,
    #[serde(default = "get_default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TrendingQueryParams {
    #[serde(default = "get_default_trending_limit")]
    pub limit: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct AdminBlogQueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl BlogQueryParams {
    /// Clamps paging to sane bounds and drops blank filters.
    pub fn normalized(self) -> Self {
        BlogQueryParams {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
            search: non_blank(self.search),
            tag: non_blank(self.tag),
            author: self.author,
        }
    }

    /// Row offset of the page, widened so huge page numbers cannot overflow.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn get_default_page() -> u32 {
    1
}

fn get_default_limit() -> u32 {
    10
}

fn get_default_trending_limit() -> u32 {
    5
}
