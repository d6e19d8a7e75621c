//! Bundle identity: how a component is packaged (flatpak, snap, tarball...).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum BundleKind {
    Limba,
    Flatpak,
    Snap,
    Tarball,
    Cabinet,
    #[strum(serialize = "linglong-layer")]
    LinglongLayer,
    #[strum(serialize = "appimage")]
    AppImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub kind: BundleKind,
    pub reference: String,
    pub runtime: Option<String>,
}

impl Bundle {
    pub fn new(kind: BundleKind, reference: impl Into<String>) -> Self {
        Self {
            kind,
            reference: reference.into(),
            runtime: None,
        }
    }
}
