mod admin_helpers;
mod blog_helpers;
mod comment_helpers;
mod user_helpers;
mod view_helpers;

pub use admin_helpers::*;
pub use blog_helpers::*;
pub use comment_helpers::*;
pub use user_helpers::*;
pub use view_helpers::*;

/// Collects `column = ?` assignments for a partial `UPDATE`.
struct QueryBuilder {
    query: String,
    params: Vec<String>,
    seperator: &'static str,
}

impl QueryBuilder {
    fn new(seperator: &'static str) -> Self {
        Self {
            query: String::new(),
            params: vec![],
            seperator,
        }
    }

    fn add_param(mut self, column: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            if !self.params.is_empty() {
                self.query.push_str(self.seperator);
            }
            self.query.push_str(column);
            self.query.push_str(" = ?");
            self.params.push(value);
        }
        self
    }

    /// `None` when nothing was added.
    fn build(self) -> Option<(String, Vec<String>)> {
        if self.params.is_empty() {
            None
        } else {
            Some((self.query, self.params))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::QueryBuilder;

    #[test]
    fn builder_joins_only_present_params() {
        let (query, params) = QueryBuilder::new(", ")
            .add_param("title", Some("New".to_string()))
            .add_param("excerpt", None)
            .add_param("content", Some("Body".to_string()))
            .build()
            .unwrap();
        assert_eq!(query, "title = ?, content = ?");
        assert_eq!(params, vec!["New".to_string(), "Body".to_string()]);
    }

    #[test]
    fn empty_builder_builds_nothing() {
        assert!(QueryBuilder::new(", ")
            .add_param("title", None)
            .build()
            .is_none());
    }
}
