//! Image reference resolution
//!
//! Image fields coming back from the store are opaque references with
//! optional crop/hotspot metadata. [`ImageResolver`] turns them into CDN
//! URLs; nothing else in the crate looks inside a reference.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::StoreConfig;

/// Default image CDN
const IMAGE_CDN: &str = "https://cdn.sanity.io";

lazy_static! {
    /// `image-<hash>-<width>x<height>-<ext>`
    static ref ASSET_ID: Regex =
        Regex::new(r"^image-([A-Za-z0-9]+)-(\d+)x(\d+)-([a-z0-9]+)$").unwrap();
}

/// Image resolution errors
#[derive(Error, Debug, PartialEq)]
pub enum ImageRefError {
    #[error("Malformed image asset reference: {0}")]
    MalformedAsset(String),
}

/// An image field as stored in the content store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub asset: AssetRef,
    #[serde(default)]
    pub crop: Option<Crop>,
    #[serde(default)]
    pub hotspot: Option<Hotspot>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageRef {
    /// Reference an asset id without crop or hotspot
    pub fn from_asset_id(id: &str) -> Self {
        Self {
            asset: AssetRef {
                reference: id.to_string(),
            },
            crop: None,
            hotspot: None,
            alt: None,
        }
    }
}

/// Pointer to an uploaded asset (`_ref`, or `_id` when dereferenced)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref", alias = "_id")]
    pub reference: String,
}

/// Crop insets, as fractions of the source dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Crop {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Crop {
    fn is_empty(&self) -> bool {
        self.top <= 0.0 && self.bottom <= 0.0 && self.left <= 0.0 && self.right <= 0.0
    }
}

/// Area of interest, as fractions of the source dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Hotspot {
    fn default() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            width: 1.0,
            height: 1.0,
        }
    }
}

/// How the CDN fits the image into the requested box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Clip,
    Crop,
    Fill,
    Max,
    Min,
    Scale,
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fit::Clip => "clip",
            Fit::Crop => "crop",
            Fit::Fill => "fill",
            Fit::Max => "max",
            Fit::Min => "min",
            Fit::Scale => "scale",
        };
        f.write_str(name)
    }
}

/// Output format override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpg,
    Png,
    Webp,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        };
        f.write_str(name)
    }
}

/// Parsed asset id
#[derive(Debug, Clone, PartialEq)]
struct AssetId<'a> {
    hash: &'a str,
    width: u32,
    height: u32,
    extension: &'a str,
}

fn parse_asset_id(reference: &str) -> Result<AssetId<'_>, ImageRefError> {
    let malformed = || ImageRefError::MalformedAsset(reference.to_string());
    let caps = ASSET_ID.captures(reference).ok_or_else(malformed)?;
    let group = |i: usize| caps.get(i).map(|m| m.as_str()).ok_or_else(malformed);

    Ok(AssetId {
        hash: group(1)?,
        width: group(2)?.parse().map_err(|_| malformed())?,
        height: group(3)?.parse().map_err(|_| malformed())?,
        extension: group(4)?,
    })
}

/// Resolves image references for one project/dataset
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
    project_id: String,
    dataset: String,
}

impl ImageResolver {
    /// Create a resolver for the configured project and dataset
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            base_url: IMAGE_CDN.to_string(),
            project_id: config.project_id.clone(),
            dataset: config.dataset.clone(),
        }
    }

    /// Start building a URL for an image
    pub fn resolve<'a>(&'a self, image: &'a ImageRef) -> ImageUrlBuilder<'a> {
        ImageUrlBuilder {
            resolver: self,
            image,
            width: None,
            height: None,
            fit: None,
            format: None,
        }
    }
}

/// Chained dimensional constraints for one image
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder<'a> {
    resolver: &'a ImageResolver,
    image: &'a ImageRef,
    width: Option<u32>,
    height: Option<u32>,
    fit: Option<Fit>,
    format: Option<ImageFormat>,
}

impl<'a> ImageUrlBuilder<'a> {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn fit(mut self, fit: Fit) -> Self {
        self.fit = Some(fit);
        self
    }

    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Produce the final URL
    pub fn url(&self) -> Result<String, ImageRefError> {
        let asset = parse_asset_id(&self.image.asset.reference)?;
        let resolver = self.resolver;

        let mut url = format!(
            "{}/images/{}/{}/{}-{}x{}.{}",
            resolver.base_url,
            resolver.project_id,
            resolver.dataset,
            asset.hash,
            asset.width,
            asset.height,
            asset.extension
        );

        let rect = self.crop_rect(&asset);
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(rect) = rect.filter(|r| !r.is_full(&asset)) {
            params.push((
                "rect",
                format!("{},{},{},{}", rect.left, rect.top, rect.width, rect.height),
            ));
        }
        if let Some(w) = self.width {
            params.push(("w", w.to_string()));
        }
        if let Some(h) = self.height {
            params.push(("h", h.to_string()));
        }

        // A hotspot only matters when the output box has a fixed aspect ratio
        let focal = match (self.image.hotspot, self.width, self.height) {
            (Some(hotspot), Some(_), Some(_)) => Some(hotspot),
            _ => None,
        };

        match (focal, self.fit) {
            (Some(_), None) | (Some(_), Some(Fit::Crop)) => params.push(("fit", Fit::Crop.to_string())),
            (_, Some(fit)) => params.push(("fit", fit.to_string())),
            (None, None) => {}
        }

        if let Some(hotspot) = focal {
            let rect = rect.unwrap_or(PixelRect::full(&asset));
            let fp_x = (hotspot.x * asset.width as f64 - rect.left as f64) / rect.width.max(1) as f64;
            let fp_y = (hotspot.y * asset.height as f64 - rect.top as f64) / rect.height.max(1) as f64;
            params.push(("crop", "focalpoint".to_string()));
            params.push(("fp-x", format_fraction(fp_x)));
            params.push(("fp-y", format_fraction(fp_y)));
        }

        if let Some(format) = self.format {
            params.push(("fm", format.to_string()));
        }

        if !params.is_empty() {
            let query: Vec<String> = params
                .into_iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }

        Ok(url)
    }

    /// Crop insets converted to source pixels
    fn crop_rect(&self, asset: &AssetId<'_>) -> Option<PixelRect> {
        let crop = self.image.crop.filter(|c| !c.is_empty())?;
        let (w, h) = (asset.width as f64, asset.height as f64);
        let left = (crop.left * w).round();
        let top = (crop.top * h).round();
        Some(PixelRect {
            left: left as u32,
            top: top as u32,
            width: (w - crop.right * w - left).round().max(1.0) as u32,
            height: (h - crop.bottom * h - top).round().max(1.0) as u32,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PixelRect {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl PixelRect {
    fn full(asset: &AssetId<'_>) -> Self {
        Self {
            left: 0,
            top: 0,
            width: asset.width,
            height: asset.height,
        }
    }

    fn is_full(&self, asset: &AssetId<'_>) -> bool {
        *self == Self::full(asset)
    }
}

/// Clamp to [0, 1] and print with at most three decimals
fn format_fraction(value: f64) -> String {
    let formatted = format!("{:.3}", value.clamp(0.0, 1.0));
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSET: &str = "image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg";

    fn resolver() -> ImageResolver {
        let config = StoreConfig {
            project_id: "zp7mbokg".to_string(),
            ..StoreConfig::default()
        };
        ImageResolver::new(&config)
    }

    #[test]
    fn test_plain_url() {
        let resolver = resolver();
        let image = ImageRef::from_asset_id(ASSET);
        assert_eq!(
            resolver.resolve(&image).url().unwrap(),
            "https://cdn.sanity.io/images/zp7mbokg/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg"
        );
    }

    #[test]
    fn test_width_and_height() {
        let resolver = resolver();
        let image = ImageRef::from_asset_id(ASSET);
        let url = resolver.resolve(&image).width(600).url().unwrap();
        assert!(url.ends_with(".jpg?w=600"));

        let url = resolver
            .resolve(&image)
            .width(320)
            .height(240)
            .format(ImageFormat::Webp)
            .url()
            .unwrap();
        assert!(url.ends_with("?w=320&h=240&fm=webp"));
    }

    #[test]
    fn test_crop_becomes_rect() {
        let resolver = resolver();
        let mut image = ImageRef::from_asset_id(ASSET);
        image.crop = Some(Crop {
            top: 0.1,
            bottom: 0.1,
            left: 0.25,
            right: 0.25,
        });
        let url = resolver.resolve(&image).width(100).url().unwrap();
        assert!(url.contains("?rect=500,300,1000,2400&w=100"), "{url}");
    }

    #[test]
    fn test_empty_crop_is_ignored() {
        let resolver = resolver();
        let mut image = ImageRef::from_asset_id(ASSET);
        image.crop = Some(Crop::default());
        let url = resolver.resolve(&image).url().unwrap();
        assert!(!url.contains("rect="));
    }

    #[test]
    fn test_hotspot_needs_both_dimensions() {
        let resolver = resolver();
        let mut image = ImageRef::from_asset_id(ASSET);
        image.hotspot = Some(Hotspot {
            x: 0.25,
            y: 0.75,
            width: 0.2,
            height: 0.2,
        });

        let url = resolver.resolve(&image).width(600).url().unwrap();
        assert!(!url.contains("fp-x"));

        let url = resolver.resolve(&image).width(600).height(600).url().unwrap();
        assert!(url.contains("fit=crop&crop=focalpoint&fp-x=0.25&fp-y=0.75"), "{url}");
    }

    #[test]
    fn test_malformed_asset() {
        let resolver = resolver();
        let image = ImageRef::from_asset_id("file-abc-pdf");
        assert_eq!(
            resolver.resolve(&image).url(),
            Err(ImageRefError::MalformedAsset("file-abc-pdf".to_string()))
        );
    }

    #[test]
    fn test_deserialize_image_field() {
        let json = serde_json::json!({
            "_type": "image",
            "asset": { "_ref": ASSET, "_type": "reference" },
            "hotspot": { "x": 0.4, "y": 0.6 }
        });
        let image: ImageRef = serde_json::from_value(json).unwrap();
        assert_eq!(image.asset.reference, ASSET);
        assert!(image.crop.is_none());
        assert_eq!(image.hotspot.unwrap().width, 1.0);
    }

    #[test]
    fn test_format_fraction() {
        assert_eq!(format_fraction(0.5), "0.5");
        assert_eq!(format_fraction(1.2), "1");
        assert_eq!(format_fraction(-0.1), "0");
        assert_eq!(format_fraction(0.12345), "0.123");
    }
}
