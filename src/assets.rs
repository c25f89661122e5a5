//! Homepage image preload resolution.
//!
//! The landing page shows the first few portfolio projects above the fold.
//! Their hero images are announced to the browser with
//! `<link rel="preload" as="image">` so they start downloading before the
//! client bundle discovers them.
//!
//! Only the first [`PreloadConfig::count`] records are considered, in stored
//! order. A record whose image identifier is missing or unparseable is
//! skipped outright: it does not pull in a later record and leaves no empty
//! entry, so fewer hints than `count` may result.

use crate::config::{CmsConfig, PreloadConfig};
use crate::image_ref::{ImageRef, parse_image_ref};
use crate::types::ContentRecord;

/// Builds image CDN URLs with fixed transform parameters.
#[derive(Debug, Clone)]
pub struct ImageCdn {
    /// `<cdn_base>/<project>/<dataset>`, without trailing slash.
    base: String,
    width: u32,
    format: String,
    quality: u32,
    default_extension: String,
}

impl ImageCdn {
    pub fn new(preload: &PreloadConfig, cms: &CmsConfig) -> Self {
        let base = format!(
            "{}/{}/{}",
            preload.cdn_base.trim_end_matches('/'),
            cms.project_id,
            cms.dataset
        );
        Self {
            base,
            width: preload.width,
            format: preload.format.clone(),
            quality: preload.quality,
            default_extension: preload.default_extension.clone(),
        }
    }

    /// CDN URL for an image, resized to the configured output width.
    pub fn url_for(&self, image: &ImageRef) -> String {
        let ext = image
            .extension
            .as_deref()
            .unwrap_or(&self.default_extension);
        format!(
            "{}/{}-{}x{}.{}?w={}&fm={}&q={}",
            self.base,
            image.asset_id,
            image.width,
            image.height,
            ext,
            self.width,
            self.format,
            self.quality
        )
    }
}

/// Derive the landing-page preload URLs from content records.
///
/// Returns at most `count` URLs, in record order.
pub fn resolve_preloads(records: &[ContentRecord], cdn: &ImageCdn, count: usize) -> Vec<String> {
    records
        .iter()
        .take(count)
        .filter_map(|record| record.preferred_image_id())
        .filter_map(parse_image_ref)
        .map(|image| cdn.url_for(&image))
        .collect()
}
