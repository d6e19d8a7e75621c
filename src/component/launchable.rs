//! Launchables: handles by which a Component can be started.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum LaunchableKind {
    DesktopId,
    Service,
    CockpitManifest,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launchable {
    pub kind: LaunchableKind,
    pub entry: String,
}

impl Launchable {
    pub fn new(kind: LaunchableKind, entry: impl Into<String>) -> Self {
        Self {
            kind,
            entry: entry.into(),
        }
    }
}
