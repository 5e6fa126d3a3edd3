// Core structs: Post, ItemOutcome, RunSummary and error types
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One blog post record.
///
/// The record keeps every key it was loaded with, in its original order, so a
/// rewrite only ever touches `image`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Post {
    fields: Map<String, Value>,
}

impl Post {
    #[cfg(test)]
    pub fn new(url: &str, title: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("url".into(), Value::String(url.to_string()));
        fields.insert("title".into(), Value::String(title.to_string()));
        Self { fields }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn url(&self) -> Option<&str> {
        self.str_field("url")
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    pub fn image(&self) -> Option<&str> {
        self.fields.get("image").and_then(Value::as_str)
    }

    /// Title used for logging and file naming; `post-N` when the record has none.
    pub fn display_title(&self, position: usize) -> String {
        self.title()
            .map(str::to_string)
            .unwrap_or_else(|| format!("post-{}", position + 1))
    }

    /// Stores `path` as the record's image. Returns true if the value changed.
    pub fn set_image(&mut self, path: &str) -> bool {
        if self.image() == Some(path) {
            return false;
        }
        self.fields
            .insert("image".into(), Value::String(path.to_string()));
        true
    }
}

/// Result of processing a single post.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Skipped,
    Saved {
        used_fallback: bool,
        changed: bool,
    },
    Failed {
        title: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub saved: usize,
    pub changed: usize,
    pub fallbacks: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dataset_written: bool,
    /// `title: reason` for every failed post, in dataset order.
    pub failures: Vec<String>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Saved {
                used_fallback,
                changed,
            } => {
                self.saved += 1;
                if *used_fallback {
                    self.fallbacks += 1;
                }
                if *changed {
                    self.changed += 1;
                }
            }
            ItemOutcome::Failed { title, reason } => {
                self.failed += 1;
                self.failures.push(format!("{}: {}", title, reason));
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{primary}; proxy fallback also failed: {fallback}")]
    FallbackFailed {
        primary: Box<FetchError>,
        fallback: Box<FetchError>,
    },
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("image request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data: URL")]
    InvalidDataUrl,
}

/// Why a single post could not be given an image.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot access dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dataset {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot create images directory {path}: {source}")]
    ImagesDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid pattern for rule {name}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_survive_and_image_is_appended() {
        let raw = r#"{"title":"Zöpfe","url":"https://a.example/p","date":"2024-01-02"}"#;
        let mut post: Post = serde_json::from_str(raw).unwrap();
        assert!(post.set_image("images/blogs/zopfe.jpg"));
        let out = serde_json::to_string(&post).unwrap();
        assert_eq!(
            out,
            r#"{"title":"Zöpfe","url":"https://a.example/p","date":"2024-01-02","image":"images/blogs/zopfe.jpg"}"#
        );
    }

    #[test]
    fn set_image_reports_no_change_for_same_value() {
        let mut post = Post::new("https://a.example", "A");
        assert!(post.set_image("images/blogs/a.png"));
        assert!(!post.set_image("images/blogs/a.png"));
        assert!(post.set_image("images/blogs/a.jpg"));
    }

    #[test]
    fn missing_or_empty_title_falls_back_to_position() {
        let post: Post = serde_json::from_str(r#"{"url":"x","title":""}"#).unwrap();
        assert_eq!(post.display_title(2), "post-3");
        let post: Post = serde_json::from_str(r#"{"url":"x"}"#).unwrap();
        assert_eq!(post.display_title(0), "post-1");
    }

    #[test]
    fn non_string_url_counts_as_missing() {
        let post: Post = serde_json::from_str(r#"{"url":42,"title":"T"}"#).unwrap();
        assert_eq!(post.url(), None);
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = RunSummary::default();
        summary.record(&ItemOutcome::Skipped);
        summary.record(&ItemOutcome::Saved {
            used_fallback: true,
            changed: true,
        });
        summary.record(&ItemOutcome::Failed {
            title: "b".into(),
            reason: "boom".into(),
        });
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.saved, 1);
        assert_eq!(summary.fallbacks, 1);
        assert_eq!(summary.changed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures, vec!["b: boom"]);
    }
}
