//! Provided items: capabilities a Component offers to the system, the
//! primary key the Indexer's provides-lookup is built over.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum ProvideKind {
    Library,
    Binary,
    MimeType,
    Font,
    Modalias,
    PythonModule,
    Dbus,
    FirmwareFlashed,
    FirmwareRuntime,
    Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provide {
    pub kind: ProvideKind,
    pub value: String,
}

impl Provide {
    pub fn new(kind: ProvideKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
