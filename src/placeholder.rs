use crate::config::{KeywordTopic, PlaceholderConfig};
use url::form_urlencoded;

/// Builds deterministic placeholder image URLs for posts without a preview image.
pub struct FallbackResolver {
    base_url: String,
    width: u32,
    height: u32,
    keywords: Vec<KeywordTopic>,
    default_topic: String,
}

impl FallbackResolver {
    pub fn new(cfg: &PlaceholderConfig) -> Self {
        Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            width: cfg.width,
            height: cfg.height,
            keywords: cfg.keywords.clone(),
            default_topic: cfg.default_topic.clone(),
        }
    }

    /// Topic label for a title: first keyword contained in the lower-cased title.
    pub fn topic(&self, title: &str) -> &str {
        let title = title.to_lowercase();
        self.keywords
            .iter()
            .find(|k| title.contains(&k.keyword.to_lowercase()))
            .map(|k| k.topic.as_str())
            .unwrap_or(self.default_topic.as_str())
    }

    /// Placeholder URL seeded by the title. The topic does not take part.
    pub fn placeholder_url(&self, title: &str) -> String {
        let seed: String = form_urlencoded::byte_serialize(title.as_bytes()).collect();
        format!("{}/{}/{}/{}", self.base_url, seed, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> FallbackResolver {
        FallbackResolver::new(&PlaceholderConfig::default())
    }

    #[test]
    fn placeholder_is_seeded_by_title() {
        assert_eq!(
            resolver().placeholder_url("Chess Openings"),
            "https://picsum.photos/seed/Chess+Openings/800/500"
        );
    }

    #[test]
    fn placeholder_is_stable_across_resolvers() {
        let title = "Scaling ZooKeeper: notes & ideas?";
        assert_eq!(
            resolver().placeholder_url(title),
            FallbackResolver::new(&PlaceholderConfig::default()).placeholder_url(title)
        );
        assert_eq!(
            resolver().placeholder_url(title),
            "https://picsum.photos/seed/Scaling+ZooKeeper%3A+notes+%26+ideas%3F/800/500"
        );
    }

    #[test]
    fn topic_uses_first_matching_keyword() {
        let r = resolver();
        assert_eq!(r.topic("Chess Openings"), "chess,board");
        assert_eq!(r.topic("Running ZooKeeper and chess bots"), "zookeeper,distributed systems");
        assert_eq!(r.topic("Why small data matters"), "data,statistics,analytics");
        assert_eq!(r.topic("Gardening"), "technology,blog");
    }

    #[test]
    fn custom_dimensions() {
        let cfg = PlaceholderConfig {
            base_url: "https://img.example/seed/".into(),
            width: 320,
            height: 200,
            ..PlaceholderConfig::default()
        };
        assert_eq!(
            FallbackResolver::new(&cfg).placeholder_url("a b"),
            "https://img.example/seed/a+b/320/200"
        );
    }
}
