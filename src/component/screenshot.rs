//! Screenshots: either a set of locale-varying images, or a single video.
//! §3: the "default" screenshot must not be a video.

use serde::{Deserialize, Serialize};

use crate::locale::LocalizedText;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub url: String,
    pub codec: Option<String>,
    pub container: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenshotMedia {
    Images(Vec<Image>),
    Video(Video),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub is_default: bool,
    #[serde(default)]
    pub caption: LocalizedText,
    pub media: ScreenshotMedia,
}

impl Screenshot {
    pub fn is_video(&self) -> bool {
        matches!(self.media, ScreenshotMedia::Video(_))
    }

    /// Validates the §3 invariant. Parsers call this before accepting a
    /// `default="true"` screenshot that turns out to carry a video; on
    /// violation the default flag is dropped and an Issue recorded rather
    /// than rejecting the whole file.
    pub fn validate_default(&self) -> bool {
        !(self.is_default && self.is_video())
    }
}

/// Picks the default screenshot, falling back to the first non-video one
/// if no screenshot is explicitly flagged default.
pub fn default_screenshot(screenshots: &[Screenshot]) -> Option<&Screenshot> {
    screenshots
        .iter()
        .find(|s| s.is_default && !s.is_video())
        .or_else(|| screenshots.iter().find(|s| !s.is_video()))
}
