//! Request DTOs for the demo article service
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Request body for creating (POST /articles) or replacing
/// (PUT /articles/:id) an article.
///
/// # Fields
/// - `status`: Publication status, e.g. "active"
/// - `tag`: Single topic tag
/// - `title`: Title keyed by language variant
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleRequest {
    pub status: String,
    #[serde(default)]
    pub tag: String,
    pub title: BTreeMap<String, String>,
}

impl ArticleRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.status.trim().is_empty() {
            return Some("Status cannot be empty".to_string());
        }
        if self.title.is_empty() {
            return Some("At least one title translation is required".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_request_deserialize() {
        let json = r#"{"status": "active", "tag": "a", "title": {"en": "Hello"}}"#;
        let req: ArticleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.status, "active");
        assert_eq!(req.title["en"], "Hello");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_tag_defaults_to_empty() {
        let json = r#"{"status": "draft", "title": {"uz": "Salom"}}"#;
        let req: ArticleRequest = serde_json::from_str(json).unwrap();
        assert!(req.tag.is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let req = ArticleRequest {
            status: " ".to_string(),
            tag: String::new(),
            title: BTreeMap::from([("en".to_string(), "x".to_string())]),
        };
        assert!(req.validate().is_some());

        let req = ArticleRequest {
            status: "active".to_string(),
            tag: String::new(),
            title: BTreeMap::new(),
        };
        assert!(req.validate().is_some());
    }
}
