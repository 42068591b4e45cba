//! Version label tables
//!
//! External sources name game versions in their own way: e-amusement exports
//! use the marketing name ("HEROIC VERSE"), game-client hooks report a
//! software model datecode. These tables map such labels to ranked version
//! tokens so a batch's newest version is simply its maximum rank.
//!
//! Tables are built at startup and handed to the import pipeline.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Position of a label in its table. Higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VersionRank(pub u32);

impl fmt::Display for VersionRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, case-sensitive label table
///
/// Insertion order defines rank, starting at 1.
#[derive(Debug, Clone)]
pub struct VersionTable {
    labels: Vec<&'static str>,
    ranks: HashMap<&'static str, VersionRank>,
}

impl VersionTable {
    pub fn new(labels: &[&'static str]) -> Self {
        let ranks = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (*label, VersionRank(i as u32 + 1)))
            .collect();

        Self {
            labels: labels.to_vec(),
            ranks,
        }
    }

    /// e-amusement IIDX version names
    pub fn eamusement_iidx() -> Self {
        Self::new(EAMUSEMENT_IIDX_LABELS)
    }

    pub fn resolve(&self, label: &str) -> Option<VersionRank> {
        self.ranks.get(label).copied()
    }

    pub fn label(&self, rank: VersionRank) -> Option<&'static str> {
        let index = (rank.0 as usize).checked_sub(1)?;
        self.labels.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// e-amusement IIDX version names, oldest first (rank 1 = 1st style)
pub const EAMUSEMENT_IIDX_LABELS: &[&str] = &[
    "1st&substream",
    "2nd style",
    "3rd style",
    "4th style",
    "5th style",
    "6th style",
    "7th style",
    "8th style",
    "9th style",
    "10th style",
    "IIDX RED",
    "HAPPY SKY",
    "DistorteD",
    "GOLD",
    "DJ TROOPERS",
    "EMPRESS",
    "SIRIUS",
    "Resort Anthem",
    "Lincle",
    "tricoro",
    "SPADA",
    "PENDUAL",
    "copula",
    "SINOBUZ",
    "CANNON BALLERS",
    "Rootage",
    "HEROIC VERSE",
    "BISTROVER",
    "CastHour",
];

/// First datecode of each arcade IIDX release, oldest first
///
/// A hook reports `LDJ:<region>:<cabinet>:<revision>:<datecode>`; the version
/// is the newest release whose first datecode is not after the reported one.
pub const IIDX_ARCADE_RELEASES: &[(&str, &str)] = &[
    ("2018102200", "26"),
    ("2019101600", "27"),
    ("2020102800", "28"),
    ("2021101300", "29"),
];

/// Software model prefix used by INFINITAS
pub const IIDX_INFINITAS_MODEL: &str = "P2D";

/// Software model prefix used by arcade IIDX
pub const IIDX_ARCADE_MODEL: &str = "LDJ";

/// Maps a game client's software model string to a version token
///
/// Arcade models are resolved by datecode against a release table. Other
/// model codes (INFINITAS) name a single version outright.
#[derive(Debug, Clone)]
pub struct ModelVersionTable {
    arcade_model: &'static str,
    /// (first datecode, version), sorted by datecode
    releases: Vec<(&'static str, &'static str)>,
    fixed: HashMap<&'static str, &'static str>,
}

impl ModelVersionTable {
    pub fn new(arcade_model: &'static str, releases: &[(&'static str, &'static str)]) -> Self {
        let mut releases = releases.to_vec();
        releases.sort_by_key(|(datecode, _)| *datecode);

        Self {
            arcade_model,
            releases,
            fixed: HashMap::new(),
        }
    }

    /// Map every datecode of `model` to `version`
    pub fn with_fixed(mut self, model: &'static str, version: &'static str) -> Self {
        self.fixed.insert(model, version);
        self
    }

    /// Table for IIDX hooks: arcade releases plus INFINITAS
    pub fn iidx() -> Self {
        Self::new(IIDX_ARCADE_MODEL, IIDX_ARCADE_RELEASES).with_fixed(IIDX_INFINITAS_MODEL, "inf")
    }

    /// Resolve a model string to a version token
    ///
    /// Returns `None` for unknown model codes, malformed strings, and arcade
    /// datecodes older than every known release.
    pub fn resolve(&self, model: &str) -> Option<&'static str> {
        let parts: Vec<&str> = model.split(':').collect();
        let [code, _region, _cabinet, _revision, datecode] = parts.as_slice() else {
            return None;
        };

        if let Some(version) = self.fixed.get(*code) {
            return Some(*version);
        }

        if *code != self.arcade_model
            || datecode.len() != 10
            || !datecode.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        // Fixed-width digit strings compare the same as the numbers they encode.
        self.releases
            .iter()
            .rev()
            .find(|(first_datecode, _)| *first_datecode <= *datecode)
            .map(|(_, version)| *version)
    }
}
