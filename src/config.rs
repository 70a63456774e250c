//! Species naming schemes.
//!
//! A naming scheme is the set of standard chromosome suffixes for a species
//! (`"1"`, `"X"`, `"M"`, ...). Canonical names are always `"chr"` + suffix.
//! The built-in table covers mouse and human; further schemes can be loaded
//! from a TOML file without touching code:
//!
//! ```toml
//! [species.rat]
//! autosomes = 20
//! extra = ["X", "Y", "M"]
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::bed::BedError;

/// Sex and mitochondrial suffixes shared by the built-in schemes.
const SEX_AND_MITO: [&str; 3] = ["X", "Y", "M"];

/// Standard chromosome suffixes per species.
#[derive(Debug, Clone)]
pub struct SpeciesTable {
    schemes: HashMap<String, HashSet<String>>,
}

#[derive(Debug, Deserialize)]
struct SpeciesFile {
    #[serde(default)]
    species: BTreeMap<String, SchemeSpec>,
}

/// One scheme as written in a TOML file.
#[derive(Debug, Deserialize)]
struct SchemeSpec {
    /// Autosomes are numbered 1..=autosomes.
    #[serde(default)]
    autosomes: u32,
    /// Any further suffixes.
    #[serde(default)]
    extra: Vec<String>,
}

impl SchemeSpec {
    fn suffixes(&self) -> HashSet<String> {
        (1..=self.autosomes)
            .map(|i| i.to_string())
            .chain(self.extra.iter().cloned())
            .collect()
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        let mut table = Self {
            schemes: HashMap::new(),
        };
        table.insert_numbered("mouse", 19, &SEX_AND_MITO);
        table.insert_numbered("human", 22, &SEX_AND_MITO);
        table
    }
}

impl SpeciesTable {
    /// Built-in table extended (or overridden) by the schemes in a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, BedError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            BedError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut table = Self::default();
        table.merge_toml(&text).map_err(|e| match e {
            BedError::Configuration(msg) => {
                BedError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        Ok(table)
    }

    /// Merge schemes from TOML text into this table.
    pub fn merge_toml(&mut self, text: &str) -> Result<(), BedError> {
        let file: SpeciesFile =
            toml::from_str(text).map_err(|e| BedError::Configuration(e.to_string()))?;

        for (species, spec) in file.species {
            let suffixes = spec.suffixes();
            if suffixes.is_empty() {
                return Err(BedError::Configuration(format!(
                    "species '{}' defines no standard chromosomes",
                    species
                )));
            }
            self.schemes.insert(species, suffixes);
        }
        Ok(())
    }

    fn insert_numbered(&mut self, species: &str, autosomes: u32, extra: &[&str]) {
        let suffixes = (1..=autosomes)
            .map(|i| i.to_string())
            .chain(extra.iter().map(|s| s.to_string()))
            .collect();
        self.schemes.insert(species.to_string(), suffixes);
    }

    /// Standard suffixes for a species.
    pub fn suffixes(&self, species: &str) -> Option<&HashSet<String>> {
        self.schemes.get(species)
    }

    /// Known species names, sorted.
    pub fn species(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
