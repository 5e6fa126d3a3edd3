// Social-preview image extraction
use crate::config::RuleConfig;
#[cfg(test)]
use crate::config::default_rules;
use crate::model::ConfigError;
use regex::Regex;
use url::Url;

/// A compiled extraction rule. Capture group 1 holds the image URL.
#[derive(Debug, Clone)]
pub struct ImageRule {
    pub name: String,
    pattern: Regex,
    skip_blank: bool,
}

impl ImageRule {
    pub fn compile(cfg: &RuleConfig) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&cfg.pattern).map_err(|source| ConfigError::Pattern {
            name: cfg.name.clone(),
            source,
        })?;
        Ok(Self {
            name: cfg.name.clone(),
            pattern,
            skip_blank: cfg.skip_blank,
        })
    }

    fn capture<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !(self.skip_blank && s.is_empty()))
    }
}

/// Finds the preview image of a page by trying its rules in order.
pub struct ImageExtractor {
    rules: Vec<ImageRule>,
}

impl ImageExtractor {
    pub fn new(rules: Vec<ImageRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(rules: &[RuleConfig]) -> Result<Self, ConfigError> {
        let rules = rules
            .iter()
            .map(ImageRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    #[cfg(test)]
    pub fn with_default_rules() -> Result<Self, ConfigError> {
        Self::from_config(&default_rules())
    }

    /// Returns the absolute image URL and the name of the rule that found it.
    pub fn extract(&self, html: &[u8], base_url: &str) -> Option<(String, &str)> {
        let text = String::from_utf8_lossy(html);
        self.rules.iter().find_map(|rule| {
            rule.capture(&text)
                .map(|src| (resolve(base_url, src), rule.name.as_str()))
        })
    }
}

/// Resolves `src` against `base`; unresolvable input is returned unchanged.
pub fn resolve(base: &str, src: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(src))
        .map(String::from)
        .unwrap_or_else(|_| src.to_string())
}
