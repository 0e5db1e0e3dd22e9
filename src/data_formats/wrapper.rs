use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct DataWrapper<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ListWrapper<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PageRef {
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PagedListWrapper<T> {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub pagination: Pagination,
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageWrapper {
    pub success: bool,
    pub message: String,
}

impl<T> DataWrapper<T> {
    pub fn wrap(data: T) -> DataWrapper<T> {
        DataWrapper {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> DataWrapper<T> {
        DataWrapper {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

impl<T> ListWrapper<T> {
    pub fn wrap(data: Vec<T>) -> ListWrapper<T> {
        ListWrapper {
            success: true,
            count: data.len(),
            data,
        }
    }
}

impl<T> PagedListWrapper<T> {
    pub fn wrap(data: Vec<T>, total: i64, page: u32, limit: u32) -> PagedListWrapper<T> {
        PagedListWrapper {
            success: true,
            count: data.len(),
            total,
            pagination: Pagination::new(total, page, limit),
            data,
        }
    }
}

impl MessageWrapper {
    pub fn new(message: impl Into<String>) -> MessageWrapper {
        MessageWrapper {
            success: true,
            message: message.into(),
        }
    }
}

impl Pagination {
    pub fn new(total: i64, page: u32, limit: u32) -> Pagination {
        let start = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let end = i64::from(page) * i64::from(limit);
        Pagination {
            next: (end < total).then_some(PageRef {
                page: page + 1,
                limit,
            }),
            prev: (start > 0).then_some(PageRef {
                page: page - 1,
                limit,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_links_only_where_pages_exist() {
        let first = Pagination::new(25, 1, 10);
        assert_eq!(first.next, Some(PageRef { page: 2, limit: 10 }));
        assert_eq!(first.prev, None);

        let last = Pagination::new(25, 3, 10);
        assert_eq!(last.next, None);
        assert_eq!(last.prev, Some(PageRef { page: 2, limit: 10 }));

        assert_eq!(Pagination::new(0, 1, 10), Pagination::default());
    }
}
