//! # Tachi Common Library
//!
//! Shared code for the Tachi score-import services including:
//! - Game and playtype model, per-game configuration tables
//! - Import type catalogue
//! - Version label tables used to infer game versions from imports
//! - Bootstrap configuration loading
//! - Logging initialisation

pub mod config;
pub mod error;
pub mod game;
pub mod import_types;
pub mod logging;
pub mod versions;

pub use error::{Error, Result};
pub use game::{Difficulty, Game, GamePlaytype, Playtype};
pub use import_types::{ImportKind, ImportType};
