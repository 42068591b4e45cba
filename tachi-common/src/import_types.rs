//! Catalogue of known import types
//!
//! Import types are written `kind/name`, e.g. `file/eamusement-iidx-csv`.
//! The catalogue is closed: adding a source means adding a variant here and
//! an extractor that handles it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// How an import reaches the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// User uploads a file
    File,
    /// Score pushed live by a game client hook or internet ranking
    Ir,
    /// Server pulls from a vendor API on the user's behalf
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImportType {
    FileEamusementIidxCsv,
    FileEamusementSdvxCsv,
    FileBatchManual,
    FileSolidStateSquad,
    FileMerIidx,
    FilePliIidxCsv,
    IrDirectManual,
    IrBarbatos,
    IrFervidex,
    IrFervidexStatic,
    IrBeatoraja,
    IrUsc,
    IrKshookSv6c,
    ApiArcIidx,
    ApiArcSdvx,
    ApiEagIidx,
    ApiEagSdvx,
    ApiFloIidx,
    ApiFloSdvx,
    ApiMinSdvx,
}

impl ImportType {
    pub const ALL: [ImportType; 20] = [
        ImportType::FileEamusementIidxCsv,
        ImportType::FileEamusementSdvxCsv,
        ImportType::FileBatchManual,
        ImportType::FileSolidStateSquad,
        ImportType::FileMerIidx,
        ImportType::FilePliIidxCsv,
        ImportType::IrDirectManual,
        ImportType::IrBarbatos,
        ImportType::IrFervidex,
        ImportType::IrFervidexStatic,
        ImportType::IrBeatoraja,
        ImportType::IrUsc,
        ImportType::IrKshookSv6c,
        ImportType::ApiArcIidx,
        ImportType::ApiArcSdvx,
        ImportType::ApiEagIidx,
        ImportType::ApiEagSdvx,
        ImportType::ApiFloIidx,
        ImportType::ApiFloSdvx,
        ImportType::ApiMinSdvx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::FileEamusementIidxCsv => "file/eamusement-iidx-csv",
            ImportType::FileEamusementSdvxCsv => "file/eamusement-sdvx-csv",
            ImportType::FileBatchManual => "file/batch-manual",
            ImportType::FileSolidStateSquad => "file/solid-state-squad",
            ImportType::FileMerIidx => "file/mer-iidx",
            ImportType::FilePliIidxCsv => "file/pli-iidx-csv",
            ImportType::IrDirectManual => "ir/direct-manual",
            ImportType::IrBarbatos => "ir/barbatos",
            ImportType::IrFervidex => "ir/fervidex",
            ImportType::IrFervidexStatic => "ir/fervidex-static",
            ImportType::IrBeatoraja => "ir/beatoraja",
            ImportType::IrUsc => "ir/usc",
            ImportType::IrKshookSv6c => "ir/kshook-sv6c",
            ImportType::ApiArcIidx => "api/arc-iidx",
            ImportType::ApiArcSdvx => "api/arc-sdvx",
            ImportType::ApiEagIidx => "api/eag-iidx",
            ImportType::ApiEagSdvx => "api/eag-sdvx",
            ImportType::ApiFloIidx => "api/flo-iidx",
            ImportType::ApiFloSdvx => "api/flo-sdvx",
            ImportType::ApiMinSdvx => "api/min-sdvx",
        }
    }

    pub fn kind(&self) -> ImportKind {
        match self.as_str().split_once('/') {
            Some(("file", _)) => ImportKind::File,
            Some(("ir", _)) => ImportKind::Ir,
            _ => ImportKind::Api,
        }
    }
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ImportType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown import type '{}'", s)))
    }
}

impl Serialize for ImportType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImportType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
