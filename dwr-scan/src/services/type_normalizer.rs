//! Drone label normalization
//!
//! Raw labels come from folder and file names in the dataset and carry
//! historical inconsistencies (case, separators, the "membo" misspelling).
//! Every raw label resolves to exactly one [`DroneType`]; anything
//! unrecognized becomes [`DroneType::Unknown`] so the file stays visible in the
//! registry for manual follow-up.

use crate::error::ScanError;
use crate::models::DroneType;
use std::path::{Component, Path};

/// Built-in corrections, checked in order before canonical names
///
/// Keys are already in [`normalize_key`] form.
pub const BUILTIN_ALIASES: &[(&str, DroneType)] = &[
    ("membo", DroneType::Mambo),
    ("nodrone", DroneType::Unlabeled),
    ("background", DroneType::Unlabeled),
    ("ambient", DroneType::Unlabeled),
    ("unlabeled", DroneType::Unlabeled),
];

/// Normalize a raw label with the built-in alias table
///
/// Pure and total: never fails, never touches the filesystem.
pub fn normalize(raw_label: &str) -> DroneType {
    AliasTable::builtin().resolve(raw_label).drone_type
}

/// Reduce a raw label to its lookup key
///
/// Lowercases and drops every non-alphanumeric character, so `" Mem-bo_"`,
/// `"MEMBO"` and `"membo"` share the key `membo`.
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Outcome of resolving one raw label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub drone_type: DroneType,
    /// An alias rewrote the label to a different canonical name
    pub corrected: bool,
    /// More than one known label matched; the first in table order won
    pub ambiguous: bool,
}

impl Resolution {
    fn unknown() -> Self {
        Self {
            drone_type: DroneType::Unknown,
            corrected: false,
            ambiguous: false,
        }
    }
}

/// Ordered alias table: raw key → canonical type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(String, DroneType)>,
}

impl AliasTable {
    /// Table holding only [`BUILTIN_ALIASES`]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ALIASES
                .iter()
                .map(|(k, t)| (k.to_string(), *t))
                .collect(),
        }
    }

    /// Built-in table extended with configured overrides
    ///
    /// Overrides are applied in the order given. Targets are parsed strictly;
    /// a target that is not a canonical label is a configuration error.
    pub fn with_overrides(overrides: &[(String, String)]) -> Result<Self, ScanError> {
        let mut table = Self::builtin();
        for (raw, target) in overrides {
            let drone_type: DroneType = target
                .parse()
                .map_err(|e| ScanError::Config(format!("alias '{}': {}", raw, e)))?;
            if normalize_key(raw).is_empty() {
                return Err(ScanError::Config(format!(
                    "alias '{}' has no alphanumeric characters",
                    raw
                )));
            }
            table.insert(raw, drone_type);
        }
        Ok(table)
    }

    /// Add an alias, or retarget an existing key in place
    pub fn insert(&mut self, raw: &str, drone_type: DroneType) {
        let key = normalize_key(raw);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = drone_type,
            None => self.entries.push((key, drone_type)),
        }
    }

    pub fn entries(&self) -> &[(String, DroneType)] {
        &self.entries
    }

    /// Resolve one raw label: aliases first, then canonical names, then Unknown
    pub fn resolve(&self, raw_label: &str) -> Resolution {
        let key = normalize_key(raw_label);

        if let Some((_, drone_type)) = self.entries.iter().find(|(k, _)| *k == key) {
            return Resolution {
                drone_type: *drone_type,
                corrected: drone_type.as_str() != key,
                ambiguous: false,
            };
        }

        DroneType::ALL
            .iter()
            .find(|t| t.as_str() == key)
            .map(|t| Resolution {
                drone_type: *t,
                corrected: false,
                ambiguous: false,
            })
            .unwrap_or_else(Resolution::unknown)
    }

    /// Find a known label anywhere in a path
    ///
    /// Each component (file stem for the last one) is split into alphanumeric
    /// tokens; a token, or the whole component key, must equal an alias key or
    /// a canonical name. Candidates are tried in table order (aliases, then
    /// canonical names), and the first match wins. `None` when nothing matches.
    pub fn search(&self, path: &Path) -> Option<Resolution> {
        let tokens = path_tokens(path);
        if tokens.is_empty() {
            return None;
        }

        let candidates = self
            .entries
            .iter()
            .map(|(k, t)| (k.as_str(), *t))
            .chain(
                DroneType::ALL
                    .iter()
                    .filter(|t| !t.is_unknown())
                    .map(|t| (t.as_str(), *t)),
            );

        let mut matched: Vec<(&str, DroneType)> = Vec::new();
        for (key, drone_type) in candidates {
            if tokens.iter().any(|tok| tok == key) {
                matched.push((key, drone_type));
            }
        }

        let (key, drone_type) = *matched.first()?;
        let ambiguous = matched.iter().any(|(_, t)| *t != drone_type);
        Some(Resolution {
            drone_type,
            corrected: drone_type.as_str() != key,
            ambiguous,
        })
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lookup tokens for every component of a path
fn path_tokens(path: &Path) -> Vec<String> {
    let mut components: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let (Some(last), Some(stem)) = (components.last_mut(), path.file_stem()) {
        *last = stem.to_string_lossy().into_owned();
    }

    let mut tokens = Vec::new();
    for component in &components {
        let whole = normalize_key(component);
        if whole.is_empty() {
            continue;
        }
        for part in component
            .split(|c: char| !c.is_alphanumeric())
            .map(normalize_key)
            .filter(|p| !p.is_empty())
        {
            if part != whole {
                tokens.push(part);
            }
        }
        tokens.push(whole);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_membo_variants_normalize_to_mambo() {
        for raw in ["membo", "MEMBO", "Membo", " membo ", "mem-bo", "_membo_", "mambo", "MAMBO"] {
            assert_eq!(normalize(raw), DroneType::Mambo, "raw label {:?}", raw);
        }
    }

    #[test]
    fn test_canonical_labels_resolve_directly() {
        assert_eq!(normalize("bebop"), DroneType::Bebop);
        assert_eq!(normalize("Bebop"), DroneType::Bebop);
        assert_eq!(normalize("none"), DroneType::Unlabeled);
        assert_eq!(normalize("no_drone"), DroneType::Unlabeled);
        assert_eq!(normalize("unknown"), DroneType::Unknown);
    }

    #[test]
    fn test_unrecognized_labels_are_unknown() {
        for raw in ["", "___", "unknown_thing", "phantom4", "bebopx", "🚁"] {
            assert_eq!(normalize(raw), DroneType::Unknown, "raw label {:?}", raw);
        }
    }

    #[test]
    fn test_resolution_flags_corrections() {
        let table = AliasTable::builtin();
        assert!(table.resolve("membo").corrected);
        assert!(!table.resolve("mambo").corrected);
        assert!(!table.resolve("whatever").corrected);
    }

    #[test]
    fn test_overrides_extend_and_retarget() {
        let overrides = vec![
            ("Parot-Bebop".to_string(), "bebop".to_string()),
            ("ambient".to_string(), "unknown".to_string()),
        ];
        let table = AliasTable::with_overrides(&overrides).unwrap();

        assert_eq!(table.resolve("parot_bebop").drone_type, DroneType::Bebop);
        assert_eq!(table.resolve("ambient").drone_type, DroneType::Unknown);
        assert_eq!(table.entries().len(), BUILTIN_ALIASES.len() + 1);
        // retargeted key keeps its position
        assert_eq!(table.entries()[3], ("ambient".to_string(), DroneType::Unknown));
    }

    #[test]
    fn test_override_with_bad_target_is_config_error() {
        let overrides = vec![("parot".to_string(), "parrot".to_string())];
        assert!(matches!(
            AliasTable::with_overrides(&overrides),
            Err(ScanError::Config(_))
        ));
    }

    #[test]
    fn test_search_finds_label_in_path() {
        let table = AliasTable::builtin();
        let found = table
            .search(&PathBuf::from("yes_drone/Membo/extra_1.wav"))
            .unwrap();
        assert_eq!(found.drone_type, DroneType::Mambo);
        assert!(found.corrected);
        assert!(!found.ambiguous);

        let found = table.search(&PathBuf::from("B_S2_D1_067-bebop_000_.wav")).unwrap();
        assert_eq!(found.drone_type, DroneType::Bebop);

        assert!(table.search(&PathBuf::from("yes_drone/clip.wav")).is_none());
    }

    #[test]
    fn test_search_does_not_match_inside_words() {
        let table = AliasTable::builtin();
        assert!(table.search(&PathBuf::from("nonexistent/clip.wav")).is_none());
    }

    #[test]
    fn test_search_ambiguous_takes_first_in_table_order() {
        let table = AliasTable::builtin();
        let found = table
            .search(&PathBuf::from("bebop/membo_take.wav"))
            .unwrap();
        // "membo" is an alias, aliases are tried before canonical names
        assert_eq!(found.drone_type, DroneType::Mambo);
        assert!(found.ambiguous);
    }

    #[test]
    fn test_override_order_decides_search_ties() {
        let overrides = vec![
            ("zulu".to_string(), "bebop".to_string()),
            ("alpha".to_string(), "mambo".to_string()),
        ];
        let table = AliasTable::with_overrides(&overrides).unwrap();

        let found = table.search(&PathBuf::from("alpha/zulu_take.wav")).unwrap();
        assert_eq!(found.drone_type, DroneType::Bebop);
        assert!(found.ambiguous);
    }
}
