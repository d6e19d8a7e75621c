//! Icons (§3 invariants: cached/local/remote icons carry `(width, height,
//! scale)`; lookup prefers exact-scale matches, then the closest area).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum IconKind {
    Cached,
    Stock,
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub kind: IconKind,
    /// Stock icon name, filesystem path, or URL depending on `kind`.
    pub value: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: Option<u32>,
}

impl Icon {
    pub fn new(kind: IconKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            width: None,
            height: None,
            scale: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    fn area(&self) -> Option<u64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(w as u64 * h as u64),
            _ => None,
        }
    }
}

/// Picks the icon whose `(width*scale, height*scale)` area is closest to
/// the requested one, preferring an exact scale match over a cross-scale
/// one when areas tie in closeness.
pub fn closest<'a>(icons: &'a [Icon], width: u32, height: u32, scale: u32) -> Option<&'a Icon> {
    let target_area = width as u64 * height as u64 * (scale as u64 * scale as u64);

    icons
        .iter()
        .filter(|icon| icon.area().is_some())
        .min_by_key(|icon| {
            let icon_scale = icon.scale.unwrap_or(1) as u64;
            let icon_area = icon.area().unwrap() * icon_scale * icon_scale;
            let distance = icon_area.abs_diff(target_area);
            let exact_scale_penalty = u8::from(icon.scale.unwrap_or(1) != scale);
            (distance, exact_scale_penalty)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_exact_scale_on_tie() {
        let icons = vec![
            Icon::new(IconKind::Cached, "a").with_size(64, 64).with_scale(1),
            Icon::new(IconKind::Cached, "b").with_size(32, 32).with_scale(2),
        ];
        // Both represent an effective 64x64 area at scale 1 request target;
        // "b" is the scale-2 asset that matches scale=2 requests exactly.
        let found = closest(&icons, 32, 32, 2).unwrap();
        assert_eq!(found.value, "b");
    }

    #[test]
    fn picks_closest_area_when_no_exact_scale() {
        let icons = vec![
            Icon::new(IconKind::Cached, "small").with_size(16, 16).with_scale(1),
            Icon::new(IconKind::Cached, "big").with_size(128, 128).with_scale(1),
        ];
        let found = closest(&icons, 100, 100, 1).unwrap();
        assert_eq!(found.value, "big");
    }
}
