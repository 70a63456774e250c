//! Chromosome name canonicalization.

use std::collections::HashSet;

use crate::bed::BedError;
use crate::config::SpeciesTable;

const CHR_PREFIX: &str = "chr";

/// Mitochondrial suffix used by Ensembl/NCBI style references.
const ENSEMBL_MITO: &str = "MT";

/// Maps raw chromosome tokens onto a species' canonical `chr`-prefixed names.
#[derive(Debug, Clone)]
pub struct ChromNameNormalizer {
    species: String,
    standard: HashSet<String>,
    keep_nonstandard: bool,
}

impl ChromNameNormalizer {
    /// Create a normalizer for one species from the built-in table.
    ///
    /// Fails with a configuration error for any species other than the
    /// ones the table knows about (`mouse`, `human`).
    pub fn new(species: &str) -> Result<Self, BedError> {
        Self::with_table(species, &SpeciesTable::default())
    }

    /// Create a normalizer from an explicit species table.
    pub fn with_table(species: &str, table: &SpeciesTable) -> Result<Self, BedError> {
        let standard = table.suffixes(species).cloned().ok_or_else(|| {
            BedError::Configuration(format!(
                "unrecognized species '{}' (expected one of: {})",
                species,
                table.species().join(", ")
            ))
        })?;
        Ok(Self {
            species: species.to_string(),
            standard,
            keep_nonstandard: false,
        })
    }

    /// Return non-standard names (prefix stripped) instead of dropping them.
    pub fn keep_nonstandard(mut self, keep: bool) -> Self {
        self.keep_nonstandard = keep;
        self
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    /// Canonical name for `raw`, or `None` if the record should be dropped.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let suffix = raw.strip_prefix(CHR_PREFIX).unwrap_or(raw);

        if self.standard.contains(suffix) {
            Some(format!("{}{}", CHR_PREFIX, suffix))
        } else if suffix == ENSEMBL_MITO {
            Some(format!("{}M", CHR_PREFIX))
        } else if self.keep_nonstandard {
            Some(suffix.to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human() -> ChromNameNormalizer {
        ChromNameNormalizer::new("human").unwrap()
    }

    #[test]
    fn test_adds_prefix() {
        assert_eq!(human().normalize("1").as_deref(), Some("chr1"));
        assert_eq!(human().normalize("X").as_deref(), Some("chrX"));
    }

    #[test]
    fn test_keeps_canonical() {
        assert_eq!(human().normalize("chr22").as_deref(), Some("chr22"));
        assert_eq!(human().normalize("chrM").as_deref(), Some("chrM"));
    }

    #[test]
    fn test_mitochondrial_alias() {
        for species in ["mouse", "human"] {
            let n = ChromNameNormalizer::new(species).unwrap();
            assert_eq!(n.normalize("MT").as_deref(), Some("chrM"));
            assert_eq!(n.normalize("chrMT").as_deref(), Some("chrM"));
        }
    }

    #[test]
    fn test_species_specific_autosomes() {
        let mouse = ChromNameNormalizer::new("mouse").unwrap();
        assert_eq!(mouse.normalize("19").as_deref(), Some("chr19"));
        assert_eq!(mouse.normalize("20"), None);
        assert_eq!(human().normalize("20").as_deref(), Some("chr20"));
    }

    #[test]
    fn test_nonstandard_dropped_or_kept() {
        assert_eq!(human().normalize("random_contig"), None);
        assert_eq!(
            human().keep_nonstandard(true).normalize("random_contig").as_deref(),
            Some("random_contig")
        );
        assert_eq!(
            human().keep_nonstandard(true).normalize("chrUn_gl000220").as_deref(),
            Some("Un_gl000220")
        );
    }

    #[test]
    fn test_prefix_strip_is_literal() {
        // Only the exact lowercase prefix is removed, and only once
        assert_eq!(human().normalize("Chr1"), None);
        assert_eq!(human().normalize("chrchr1"), None);
        assert_eq!(human().normalize("c1"), None);
    }

    #[test]
    fn test_idempotent_on_canonical() {
        let n = human();
        for raw in ["1", "chr5", "X", "MT", "chrM", "22"] {
            let once = n.normalize(raw).unwrap();
            assert_eq!(n.normalize(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn test_unknown_species_is_config_error() {
        let err = ChromNameNormalizer::new("yeast").unwrap_err();
        assert!(matches!(err, BedError::Configuration(_)));
        assert!(err.to_string().contains("yeast"));
    }

    #[test]
    fn test_custom_table() {
        let mut table = SpeciesTable::default();
        table
            .merge_toml("[species.fly]\nextra = [\"2L\", \"2R\", \"X\"]\n")
            .unwrap();
        let fly = ChromNameNormalizer::with_table("fly", &table).unwrap();
        assert_eq!(fly.normalize("2L").as_deref(), Some("chr2L"));
        assert_eq!(fly.species(), "fly");
    }
}
