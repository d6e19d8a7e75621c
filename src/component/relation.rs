//! Relations (requires/recommends/supports) between components or system
//! facts (kernel version, memory, display size, ...).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum RelationKind {
    Requires,
    Recommends,
    Supports,
    Suggests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum RelationItemKind {
    Id,
    Kernel,
    Memory,
    Modalias,
    Control,
    Display,
    Hardware,
    Internet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum VersionComparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    pub item_kind: RelationItemKind,
    pub value: String,
    pub version: Option<(VersionComparison, String)>,
}

impl Relation {
    pub fn new(kind: RelationKind, item_kind: RelationItemKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            item_kind,
            value: value.into(),
            version: None,
        }
    }
}
