// Utility functions
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z0-9]+").expect("static pattern")
});

const DEFAULT_SLUG: &str = "image";
const DEFAULT_EXT: &str = ".jpg";
const MAX_EXT_LEN: usize = 5;

/// Hyphen-separated lower-case slug; `image` when nothing survives.
pub fn slugify(text: &str) -> String {
    let slug = NON_ALNUM
        .replace_all(text, "-")
        .trim_matches('-')
        .to_lowercase();
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}

/// Extension (with leading dot) from the last path segment of `url`, `.jpg` otherwise.
pub fn guess_ext(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let name = path.rsplit('/').next().unwrap_or_default();
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().count() <= MAX_EXT_LEN => {
            format!(".{}", ext)
        }
        _ => DEFAULT_EXT.to_string(),
    }
}

/// Local file name for a post's image.
pub fn image_filename(title: &str, image_url: &str) -> String {
    format!("{}{}", slugify(title), guess_ext(image_url))
}
