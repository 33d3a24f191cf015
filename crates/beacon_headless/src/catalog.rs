//! Catalog file loading.
//!
//! `beacon_core::data` defines the records and resolves them into a
//! [`Catalog`]; this module owns the IO side: reading a RON catalog
//! document from disk (or the embedded default) and handing its records
//! to [`Catalog::from_records`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use beacon_core::data::{Catalog, SpriteData, UnitData, WeaponData};
use beacon_core::error::SimError;

/// Error type for catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File not found.
    #[error("Catalog file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read catalog file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Records parsed but did not resolve (duplicate or dangling ids).
    #[error("Failed to resolve catalog: {0}")]
    ResolveError(#[from] SimError),
}

/// An on-disk catalog document: raw records before resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Unit records.
    #[serde(default)]
    pub units: Vec<UnitData>,
    /// Weapon records.
    #[serde(default)]
    pub weapons: Vec<WeaponData>,
    /// Sprite records.
    #[serde(default)]
    pub sprites: Vec<SpriteData>,
}

impl CatalogFile {
    /// Load a catalog document from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let file: CatalogFile = ron::from_str(&contents)?;
        Ok(file)
    }

    /// Parse from a RON string (used for the embedded default).
    pub fn from_ron_str(ron: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = ron::from_str(ron)?;
        Ok(file)
    }

    /// Resolve the records into a match-ready catalog.
    pub fn resolve(self) -> Result<Catalog, CatalogError> {
        Ok(Catalog::from_records(self.units, self.weapons, self.sprites)?)
    }
}

/// The catalog compiled into the binary, used when no file is given.
pub const DEFAULT_CATALOG_RON: &str = include_str!("../data/catalog.ron");

/// Load and resolve a catalog: from `path` when given, else the
/// embedded default roster.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogError> {
    let file = match path {
        Some(path) => CatalogFile::load(path)?,
        None => CatalogFile::from_ron_str(DEFAULT_CATALOG_RON)?,
    };
    file.resolve()
}
