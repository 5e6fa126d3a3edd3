use crate::model::ConfigError;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Parser)]
#[command(name = "blog-image-fetcher", about = "Fetch preview images for blog posts")]
pub struct Cli {
    /// Optional JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Site root; dataset and image paths are resolved against it
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Dataset file (JSON array of posts)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Directory downloaded images are written to
    #[arg(long)]
    pub images: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub timeout_seconds: u64,
    /// Read-only rendering proxy; the original URL is appended verbatim.
    pub proxy_prefix: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_seconds: 20,
            proxy_prefix: "https://r.jina.ai/http/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordTopic {
    pub keyword: String,
    pub topic: String,
}

impl KeywordTopic {
    fn new(keyword: &str, topic: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            topic: topic.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub base_url: String,
    pub width: u32,
    pub height: u32,
    pub keywords: Vec<KeywordTopic>,
    pub default_topic: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://picsum.photos/seed".to_string(),
            width: 800,
            height: 500,
            keywords: vec![
                KeywordTopic::new("zookeeper", "zookeeper,distributed systems"),
                KeywordTopic::new("project management", "project management,ai,planning"),
                KeywordTopic::new("chess", "chess,board"),
                KeywordTopic::new("scikit", "machine learning,python,code"),
                KeywordTopic::new("small data", "data,statistics,analytics"),
            ],
            default_topic: "technology,blog".to_string(),
        }
    }
}

/// A named extraction pattern; the first capture group is the image URL.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    pub pattern: String,
    /// When set, a value that is blank after trimming does not count as a
    /// match and the next rule is tried. Otherwise a blank value resolves to
    /// the page URL itself.
    #[serde(default = "default_skip_blank")]
    pub skip_blank: bool,
}

fn default_skip_blank() -> bool {
    true
}

impl RuleConfig {
    fn new(name: &str, pattern: &str, skip_blank: bool) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            skip_blank,
        }
    }
}

pub fn default_rules() -> Vec<RuleConfig> {
    vec![
        RuleConfig::new(
            "og:image",
            r#"(?i)<meta[^>]+property=["']og:image["'][^>]+content=["']([^"']+)["']"#,
            true,
        ),
        RuleConfig::new(
            "twitter:image",
            r#"(?i)<meta[^>]+name=["']twitter:image["'][^>]+content=["']([^"']+)["']"#,
            true,
        ),
        RuleConfig::new(
            "og:image (content first)",
            r#"(?i)<meta[^>]+content=["']([^"']+)["'][^>]+property=["']og:image["']"#,
            true,
        ),
        RuleConfig::new(
            "link image_src",
            r#"(?i)<link[^>]+rel=["']image_src["'][^>]+href=["']([^"']+)["']"#,
            false,
        ),
        RuleConfig::new("first img", r#"(?i)<img[^>]+src=["']([^"']+)["']"#, false),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub root: PathBuf,
    pub data_path: PathBuf,
    pub images_dir: PathBuf,
    pub fetch: FetchConfig,
    pub placeholder: PlaceholderConfig,
    pub image_rules: Vec<RuleConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            data_path: PathBuf::from("data/blogs.json"),
            images_dir: PathBuf::from("images/blogs"),
            fetch: FetchConfig::default(),
            placeholder: PlaceholderConfig::default(),
            image_rules: default_rules(),
        }
    }
}

impl AppConfig {
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(root) = &cli.root {
            self.root = root.clone();
        }
        if let Some(data) = &cli.data {
            self.data_path = data.clone();
        }
        if let Some(images) = &cli.images {
            self.images_dir = images.clone();
        }
    }

    pub fn data_file(&self) -> PathBuf {
        self.root.join(&self.data_path)
    }

    pub fn images_path(&self) -> PathBuf {
        self.root.join(&self.images_dir)
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let config: AppConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;
    Ok(config)
}
