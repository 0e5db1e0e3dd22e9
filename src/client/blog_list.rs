use super::{ApiClient, ClientResult};
use crate::data_formats::{BlogQueryParams, BlogResponse};

/// One page of the public blog list plus the filters that produced it.
#[derive(Debug, Clone)]
pub struct BlogListState {
    pub blogs: Vec<BlogResponse>,
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
    pub loading: bool,
}

impl Default for BlogListState {
    fn default() -> Self {
        Self::new(10)
    }
}

impl BlogListState {
    pub fn new(limit: u32) -> Self {
        BlogListState {
            blogs: vec![],
            page: 1,
            limit,
            search: None,
            tag: None,
            total: 0,
            has_next: false,
            has_prev: false,
            loading: false,
        }
    }

    pub fn query(&self) -> BlogQueryParams {
        BlogQueryParams {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
            tag: self.tag.clone(),
            author: None,
        }
    }

    pub async fn refresh(&mut self, client: &ApiClient) -> ClientResult<()> {
        self.loading = true;
        let result = client.list_blogs(&self.query()).await;
        self.loading = false;
        let response = result?;
        self.blogs = response.data;
        self.total = response.total;
        self.has_next = response.pagination.next.is_some();
        self.has_prev = response.pagination.prev.is_some();
        Ok(())
    }

    /// Advances and re-fetches; does nothing on the last page.
    pub async fn next_page(&mut self, client: &ApiClient) -> ClientResult<()> {
        if !self.has_next {
            return Ok(());
        }
        self.page += 1;
        self.refresh(client).await
    }

    pub async fn prev_page(&mut self, client: &ApiClient) -> ClientResult<()> {
        if !self.has_prev || self.page <= 1 {
            return Ok(());
        }
        self.page -= 1;
        self.refresh(client).await
    }

    pub async fn set_search(
        &mut self,
        client: &ApiClient,
        search: Option<String>,
    ) -> ClientResult<()> {
        self.search = search.filter(|search| !search.trim().is_empty());
        self.page = 1;
        self.refresh(client).await
    }

    pub async fn set_tag(&mut self, client: &ApiClient, tag: Option<String>) -> ClientResult<()> {
        self.tag = tag.filter(|tag| !tag.trim().is_empty());
        self.page = 1;
        self.refresh(client).await
    }
}
