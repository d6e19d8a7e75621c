//! Project URLs keyed by role (`homepage`, `bugtracker`, `donation`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum UrlRole {
    Homepage,
    Bugtracker,
    FaqUrl,
    #[strum(serialize = "help")]
    Help,
    Donation,
    Translate,
    Contact,
    VcsBrowser,
    ContributionGuidelines,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Urls(BTreeMap<UrlRole, Url>);

impl Urls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: UrlRole, url: Url) {
        self.0.insert(role, url);
    }

    pub fn get(&self, role: UrlRole) -> Option<&Url> {
        self.0.get(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UrlRole, &Url)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
