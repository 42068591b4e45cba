//! Game and playtype model with per-game configuration
//!
//! A "GPT" is a (game, playtype) pair such as `iidx:SP`. Static configuration
//! for each GPT (lamps, grades, versions) lives in
//! [`GameConfigTable`], which is built once at startup and shared read-only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Supported games
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Iidx,
    Museca,
    Maimai,
    Jubeat,
    Popn,
    Sdvx,
    Ddr,
    Bms,
    Chunithm,
    Gitadora,
    Usc,
    Wacca,
    Pms,
    Itg,
}

impl Game {
    pub const ALL: [Game; 14] = [
        Game::Iidx,
        Game::Museca,
        Game::Maimai,
        Game::Jubeat,
        Game::Popn,
        Game::Sdvx,
        Game::Ddr,
        Game::Bms,
        Game::Chunithm,
        Game::Gitadora,
        Game::Usc,
        Game::Wacca,
        Game::Pms,
        Game::Itg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Game::Iidx => "iidx",
            Game::Museca => "museca",
            Game::Maimai => "maimai",
            Game::Jubeat => "jubeat",
            Game::Popn => "popn",
            Game::Sdvx => "sdvx",
            Game::Ddr => "ddr",
            Game::Bms => "bms",
            Game::Chunithm => "chunithm",
            Game::Gitadora => "gitadora",
            Game::Usc => "usc",
            Game::Wacca => "wacca",
            Game::Pms => "pms",
            Game::Itg => "itg",
        }
    }

    /// Human readable game name
    pub fn display_name(&self) -> &'static str {
        match self {
            Game::Iidx => "beatmania IIDX",
            Game::Museca => "MÚSECA",
            Game::Maimai => "maimai",
            Game::Jubeat => "jubeat",
            Game::Popn => "pop'n music",
            Game::Sdvx => "SOUND VOLTEX",
            Game::Ddr => "Dance Dance Revolution",
            Game::Bms => "BMS",
            Game::Chunithm => "CHUNITHM",
            Game::Gitadora => "GITADORA",
            Game::Usc => "USC",
            Game::Wacca => "WACCA",
            Game::Pms => "PMS",
            Game::Itg => "ITG",
        }
    }

    /// Playtypes this game can be played in
    pub fn valid_playtypes(&self) -> &'static [Playtype] {
        match self {
            Game::Iidx | Game::Ddr => &[Playtype::SP, Playtype::DP],
            Game::Bms => &[Playtype::Keys7, Playtype::Keys14],
            Game::Gitadora => &[Playtype::Gita, Playtype::Dora],
            Game::Usc | Game::Pms => &[Playtype::Controller, Playtype::Keyboard],
            Game::Popn => &[Playtype::Buttons9],
            Game::Itg => &[Playtype::Stamina],
            Game::Museca | Game::Maimai | Game::Jubeat | Game::Sdvx | Game::Chunithm | Game::Wacca => {
                &[Playtype::Single]
            }
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Game {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Game::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown game '{}'", s)))
    }
}

/// Playtypes across all games
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Playtype {
    SP,
    DP,
    Single,
    #[serde(rename = "7K")]
    Keys7,
    #[serde(rename = "14K")]
    Keys14,
    Gita,
    Dora,
    Controller,
    Keyboard,
    #[serde(rename = "9B")]
    Buttons9,
    Stamina,
}

impl Playtype {
    pub const ALL: [Playtype; 11] = [
        Playtype::SP,
        Playtype::DP,
        Playtype::Single,
        Playtype::Keys7,
        Playtype::Keys14,
        Playtype::Gita,
        Playtype::Dora,
        Playtype::Controller,
        Playtype::Keyboard,
        Playtype::Buttons9,
        Playtype::Stamina,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Playtype::SP => "SP",
            Playtype::DP => "DP",
            Playtype::Single => "Single",
            Playtype::Keys7 => "7K",
            Playtype::Keys14 => "14K",
            Playtype::Gita => "Gita",
            Playtype::Dora => "Dora",
            Playtype::Controller => "Controller",
            Playtype::Keyboard => "Keyboard",
            Playtype::Buttons9 => "9B",
            Playtype::Stamina => "Stamina",
        }
    }
}

impl fmt::Display for Playtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Playtype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Playtype::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown playtype '{}'", s)))
    }
}

/// A validated (game, playtype) pair, written `game:playtype`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GamePlaytype {
    pub game: Game,
    pub playtype: Playtype,
}

impl GamePlaytype {
    /// Pair a game with a playtype, rejecting playtypes the game doesn't have
    pub fn new(game: Game, playtype: Playtype) -> Result<Self> {
        if !game.valid_playtypes().contains(&playtype) {
            return Err(Error::InvalidInput(format!(
                "Playtype {} is not valid for {}",
                playtype, game
            )));
        }
        Ok(Self { game, playtype })
    }

    /// Parse from separate path segments, e.g. `("iidx", "SP")`
    pub fn parse(game: &str, playtype: &str) -> Result<Self> {
        Self::new(game.parse()?, playtype.parse()?)
    }

    /// e.g. "beatmania IIDX (SP)"
    pub fn format_human(&self) -> String {
        format!("{} ({})", self.game.display_name(), self.playtype)
    }
}

impl fmt::Display for GamePlaytype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.game, self.playtype)
    }
}

impl FromStr for GamePlaytype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (game, playtype) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidInput(format!("Invalid game:playtype '{}'", s)))?;
        Self::parse(game, playtype)
    }
}

/// IIDX chart difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Beginner,
    Normal,
    Hyper,
    Another,
    Leggendaria,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "BEGINNER",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hyper => "HYPER",
            Difficulty::Another => "ANOTHER",
            Difficulty::Leggendaria => "LEGGENDARIA",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static configuration for one game/playtype
#[derive(Debug, Clone)]
pub struct GptConfig {
    /// Lamp names ordered by lamp index
    pub lamps: &'static [&'static str],
    /// Grade names ordered by grade index
    pub grades: &'static [&'static str],
    /// Version tokens scores may be attributed to
    pub supported_versions: &'static [&'static str],
}

impl GptConfig {
    pub fn lamp_name(&self, index: usize) -> Option<&'static str> {
        self.lamps.get(index).copied()
    }

    pub fn grade_name(&self, index: usize) -> Option<&'static str> {
        self.grades.get(index).copied()
    }

    pub fn supports_version(&self, version: &str) -> bool {
        self.supported_versions.contains(&version)
    }
}

const IIDX_LAMPS: &[&str] = &[
    "NO PLAY",
    "FAILED",
    "ASSIST CLEAR",
    "EASY CLEAR",
    "CLEAR",
    "HARD CLEAR",
    "EX HARD CLEAR",
    "FULL COMBO",
];

const IIDX_GRADES: &[&str] = &["F", "E", "D", "C", "B", "A", "AA", "AAA", "MAX-", "MAX"];

const IIDX_VERSIONS: &[(&str, &str)] = &[
    ("20", "tricoro"),
    ("21", "SPADA"),
    ("22", "PENDUAL"),
    ("23", "copula"),
    ("24", "SINOBUZ"),
    ("25", "CANNON BALLERS"),
    ("26", "ROOTAGE"),
    ("27", "HEROIC VERSE"),
    ("28", "BISTROVER"),
    ("29", "CastHour"),
    ("3-cs", "3rd Style CS"),
    ("4-cs", "4th Style CS"),
    ("5-cs", "5th Style CS"),
    ("6-cs", "6th Style CS"),
    ("7-cs", "7th Style CS"),
    ("8-cs", "8th Style CS"),
    ("9-cs", "9th Style CS"),
    ("10-cs", "10th Style CS"),
    ("11-cs", "IIDX RED CS"),
    ("12-cs", "HAPPY SKY CS"),
    ("13-cs", "DISTORTED CS"),
    ("14-cs", "GOLD CS"),
    ("15-cs", "DJ TROOPERS CS"),
    ("16-cs", "EMPRESS CS"),
    ("26-omni", "ROOTAGE Omnimix"),
    ("27-omni", "HEROIC VERSE Omnimix"),
    ("28-omni", "BISTROVER Omnimix"),
    ("27-2dxtra", "HEROIC VERSE 2dxtra"),
    ("28-2dxtra", "BISTROVER 2dxtra"),
    ("bmus", "BEATMANIA US"),
    ("inf", "INFINITAS"),
];

const IIDX_VERSION_TOKENS: &[&str] = &[
    "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "3-cs", "4-cs", "5-cs", "6-cs",
    "7-cs", "8-cs", "9-cs", "10-cs", "11-cs", "12-cs", "13-cs", "14-cs", "15-cs", "16-cs",
    "26-omni", "27-omni", "28-omni", "27-2dxtra", "28-2dxtra", "bmus", "inf",
];

const SDVX_VERSIONS: &[(&str, &str)] = &[
    ("booth", "BOOTH"),
    ("inf", "Infinite Infection"),
    ("gw", "GRAVITY WARS"),
    ("heaven", "HEAVENLY HAVEN"),
    ("vivid", "VIVID WAVE"),
    ("exceed", "EXCEED GEAR"),
    ("konaste", "Konaste"),
];

const SDVX_VERSION_TOKENS: &[&str] = &["booth", "inf", "gw", "heaven", "vivid", "exceed", "konaste"];

/// Display names for the version tokens of a game/playtype
fn pretty_versions(gpt: GamePlaytype) -> &'static [(&'static str, &'static str)] {
    match gpt.game {
        Game::Iidx => IIDX_VERSIONS,
        Game::Sdvx => SDVX_VERSIONS,
        Game::Ddr => &[("a20", "A20")],
        Game::Gitadora => &[("nextage", "NEX+AGE")],
        Game::Popn => &[("peace", "peace"), ("kaimei", "Kaimei Riddles")],
        Game::Chunithm => &[("paradiselost", "Paradise Lost")],
        Game::Maimai => &[("finale", "FiNALE")],
        Game::Museca => &[("1.5", "1 + 1/2"), ("1.5-b", "1 + 1/2 Rev. B")],
        Game::Wacca => &[("reverse", "REVERSE")],
        Game::Jubeat => &[("festo", "festo"), ("clan", "clan"), ("qubell", "qubell")],
        Game::Bms | Game::Usc | Game::Pms | Game::Itg => &[],
    }
}

/// Look up the display name for a version token
pub fn pretty_version(gpt: GamePlaytype, version: &str) -> Option<&'static str> {
    pretty_versions(gpt)
        .iter()
        .find(|(token, _)| *token == version)
        .map(|(_, name)| *name)
}

/// Per-GPT configuration for every game/playtype this server can evaluate
#[derive(Debug, Clone, Default)]
pub struct GameConfigTable {
    configs: BTreeMap<GamePlaytype, GptConfig>,
}

impl GameConfigTable {
    /// Built-in configuration
    pub fn builtin() -> Self {
        let iidx = GptConfig {
            lamps: IIDX_LAMPS,
            grades: IIDX_GRADES,
            supported_versions: IIDX_VERSION_TOKENS,
        };
        let sdvx = GptConfig {
            lamps: &[
                "FAILED",
                "CLEAR",
                "EXCESSIVE CLEAR",
                "ULTIMATE CHAIN",
                "PERFECT ULTIMATE CHAIN",
            ],
            grades: &["D", "C", "B", "A", "A+", "AA", "AA+", "AAA", "AAA+", "S", "PUC"],
            supported_versions: SDVX_VERSION_TOKENS,
        };

        let mut configs = BTreeMap::new();
        configs.insert(GamePlaytype { game: Game::Iidx, playtype: Playtype::SP }, iidx.clone());
        configs.insert(GamePlaytype { game: Game::Iidx, playtype: Playtype::DP }, iidx);
        configs.insert(GamePlaytype { game: Game::Sdvx, playtype: Playtype::Single }, sdvx);

        Self { configs }
    }

    pub fn get(&self, gpt: GamePlaytype) -> Option<&GptConfig> {
        self.configs.get(&gpt)
    }

    /// Like [`get`](Self::get), but unconfigured GPTs are an input error
    pub fn require(&self, gpt: GamePlaytype) -> Result<&GptConfig> {
        self.get(gpt).ok_or_else(|| {
            Error::InvalidInput(format!("{} is not supported by this server", gpt.format_human()))
        })
    }

    pub fn supported(&self) -> impl Iterator<Item = &GamePlaytype> {
        self.configs.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_game_playtype() {
        let gpt: GamePlaytype = "iidx:SP".parse().unwrap();
        assert_eq!(gpt.game, Game::Iidx);
        assert_eq!(gpt.playtype, Playtype::SP);
        assert_eq!(gpt.to_string(), "iidx:SP");

        let bms = GamePlaytype::parse("bms", "14K").unwrap();
        assert_eq!(bms.playtype, Playtype::Keys14);
    }

    #[test]
    fn test_rejects_playtype_from_other_game() {
        assert!(GamePlaytype::parse("iidx", "Single").is_err());
        assert!("sdvx:SP".parse::<GamePlaytype>().is_err());
        assert!("iidx".parse::<GamePlaytype>().is_err());
    }

    #[test]
    fn test_playtype_serde_uses_wire_names() {
        let json = serde_json::to_string(&Playtype::Keys7).unwrap();
        assert_eq!(json, "\"7K\"");
        let pt: Playtype = serde_json::from_str("\"9B\"").unwrap();
        assert_eq!(pt, Playtype::Buttons9);
    }

    #[test]
    fn test_pretty_versions() {
        let gpt = GamePlaytype::parse("iidx", "DP").unwrap();
        assert_eq!(pretty_version(gpt, "27"), Some("HEROIC VERSE"));
        assert_eq!(pretty_version(gpt, "inf"), Some("INFINITAS"));
        assert_eq!(pretty_version(gpt, "99"), None);
    }

    #[test]
    fn test_builtin_config_lamps() {
        let table = GameConfigTable::builtin();
        let gpt = GamePlaytype::parse("iidx", "SP").unwrap();
        let config = table.require(gpt).unwrap();

        assert_eq!(config.lamp_name(5), Some("HARD CLEAR"));
        assert_eq!(config.grade_name(7), Some("AAA"));
        assert!(config.supports_version("28"));
        assert!(table.require(GamePlaytype::parse("bms", "7K").unwrap()).is_err());
    }

    #[test]
    fn test_every_version_token_has_a_pretty_name() {
        let table = GameConfigTable::builtin();
        for gpt in table.supported() {
            let config = table.get(*gpt).unwrap();
            for version in config.supported_versions {
                assert!(
                    pretty_version(*gpt, version).is_some(),
                    "{} version {} has no display name",
                    gpt,
                    version
                );
            }
        }
    }
}
