use crate::config::AppConfig;
use crate::model::{ConfigError, DatasetError, ItemError, ItemOutcome, Post, RunSummary};
use crate::parser::ImageExtractor;
use crate::placeholder::FallbackResolver;
use crate::scraper::PageFetcher;
use crate::storage::{load_dataset, save_dataset, ImageDownloader};
use crate::utils::image_filename;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Sequential fetch → extract → download → record loop over a dataset.
pub struct Pipeline {
    root: PathBuf,
    data_file: PathBuf,
    images_dir: PathBuf,
    fetcher: Box<dyn PageFetcher>,
    downloader: Box<dyn ImageDownloader>,
    extractor: ImageExtractor,
    fallback: FallbackResolver,
}

struct ResolvedImage {
    path: String,
    used_fallback: bool,
}

impl Pipeline {
    pub fn new(
        config: &AppConfig,
        fetcher: Box<dyn PageFetcher>,
        downloader: Box<dyn ImageDownloader>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            root: config.root.clone(),
            data_file: config.data_file(),
            images_dir: config.images_path(),
            fetcher,
            downloader,
            extractor: ImageExtractor::from_config(&config.image_rules)?,
            fallback: FallbackResolver::new(&config.placeholder),
        })
    }

    /// Processes every post in order. Only dataset and images-directory
    /// failures abort the run; per-post failures end up in the summary.
    pub async fn run(&self) -> Result<RunSummary, DatasetError> {
        fs::create_dir_all(&self.images_dir).map_err(|source| DatasetError::ImagesDir {
            path: self.images_dir.display().to_string(),
            source,
        })?;

        let mut posts = load_dataset(&self.data_file)?;
        info!("Loaded {} posts from {}", posts.len(), self.data_file.display());

        let mut summary = RunSummary::default();
        let mut dirty = false;
        for (position, post) in posts.iter_mut().enumerate() {
            let outcome = self.process_post(position, post).await;
            if let ItemOutcome::Saved { changed: true, .. } = outcome {
                dirty = true;
            }
            summary.record(&outcome);
        }

        if dirty {
            save_dataset(&self.data_file, &posts)?;
            summary.dataset_written = true;
            info!("Updated {}", self.data_file.display());
        } else {
            info!("No updates to {}", self.data_file.display());
        }

        info!(
            "Done: {} saved ({} changed, {} placeholders), {} failed, {} skipped",
            summary.saved, summary.changed, summary.fallbacks, summary.failed, summary.skipped
        );
        for failure in &summary.failures {
            warn!("  failed: {}", failure);
        }
        Ok(summary)
    }

    async fn process_post(&self, position: usize, post: &mut Post) -> ItemOutcome {
        let Some(url) = post.url().map(str::to_string) else {
            return ItemOutcome::Skipped;
        };
        let title = post.display_title(position);

        match self.fetch_image(&url, &title).await {
            Ok(resolved) => {
                let changed = post.set_image(&resolved.path);
                info!("[ok] {} -> {}", title, resolved.path);
                ItemOutcome::Saved {
                    used_fallback: resolved.used_fallback,
                    changed,
                }
            }
            Err(e) => {
                error!("[error] {}: {}", title, e);
                ItemOutcome::Failed {
                    title,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch_image(&self, url: &str, title: &str) -> Result<ResolvedImage, ItemError> {
        let html = self.fetcher.fetch_page(url).await?;

        let (image_url, used_fallback) = match self.extractor.extract(&html, url) {
            Some((image_url, rule)) => {
                debug!("{}: image found by rule {}", title, rule);
                (image_url, false)
            }
            None => {
                debug!("{}: placeholder topic {}", title, self.fallback.topic(title));
                info!("[info] Using fallback image for '{}'", title);
                (self.fallback.placeholder_url(title), true)
            }
        };

        let filename = image_filename(title, &image_url);
        let dest = self.images_dir.join(&filename);
        self.downloader.download(&image_url, &dest).await?;

        Ok(ResolvedImage {
            path: self.dataset_path(&dest),
            used_fallback,
        })
    }

    /// Path of a downloaded image as recorded in the dataset: relative to the
    /// site root, `/`-separated.
    fn dataset_path(&self, dest: &Path) -> String {
        let rel = dest.strip_prefix(&self.root).unwrap_or(dest);
        rel.to_string_lossy().replace('\\', "/")
    }
}
