use serde::{Deserialize, Serialize};

/// The `{count, next, previous, results}` envelope every list endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages.
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_deserialize() {
        let json = r#"{"count": 13, "next": "http://x/?page=2", "previous": null, "results": [1, 2, 3]}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 13);
        assert_eq!(page.results, vec![1, 2, 3]);
        assert!(page.previous.is_none());
    }
}
