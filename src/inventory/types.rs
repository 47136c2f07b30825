use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Placeholder for a model that did not report its display name.
pub const UNKNOWN_DISPLAY_NAME: &str = "Desconhecido";
/// Placeholder for every other field a model did not report.
pub const NOT_AVAILABLE: &str = "N/D";

/// Filename prefix of first-tier ("root") models.
pub const ROOT_PREFIX: &str = "root_";
/// Filename prefix of second-tier ("leaves") models.
pub const LEAVES_PREFIX: &str = "leaves_";

fn unknown_display_name() -> String {
    UNKNOWN_DISPLAY_NAME.to_string()
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Classification tier, decided by the executable's filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Root,
    Leaves,
}

impl Tier {
    /// Returns the tier for an identifier, or `None` when it has neither prefix.
    pub fn classify(identifier: &str) -> Option<Self> {
        if identifier.starts_with(ROOT_PREFIX) {
            Some(Tier::Root)
        } else if identifier.starts_with(LEAVES_PREFIX) {
            Some(Tier::Leaves)
        } else {
            None
        }
    }
}

/// Metadata a model executable reports about itself.
///
/// Fields missing from a stored index deserialize to the same placeholders
/// used when an executable leaves a field blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDetails {
    #[serde(default = "unknown_display_name")]
    pub display_name: String,
    #[serde(default = "not_available")]
    pub architecture_name: String,
    #[serde(default = "not_available")]
    pub architecture_version: String,
    #[serde(default = "not_available")]
    pub dataset_name: String,
    #[serde(default = "not_available")]
    pub evaluation_binary_name: String,
}

impl ModelDetails {
    /// Builds details from positional fields, substituting placeholders for blanks.
    pub fn from_fields(fields: [&str; 5]) -> Self {
        let or = |value: &str, fallback: &str| {
            let value = value.trim();
            if value.is_empty() { fallback.to_string() } else { value.to_string() }
        };
        Self {
            display_name: or(fields[0], UNKNOWN_DISPLAY_NAME),
            architecture_name: or(fields[1], NOT_AVAILABLE),
            architecture_version: or(fields[2], NOT_AVAILABLE),
            dataset_name: or(fields[3], NOT_AVAILABLE),
            evaluation_binary_name: or(fields[4], NOT_AVAILABLE),
        }
    }
}

/// The persisted model index (`models.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelIndex {
    /// First-tier model identifiers
    #[serde(default)]
    pub root: Vec<String>,
    /// Second-tier model identifiers
    #[serde(default)]
    pub leaves: Vec<String>,
    /// Details keyed by identifier. A listed identifier without an entry here
    /// has not described itself (yet).
    #[serde(default)]
    pub details: BTreeMap<String, ModelDetails>,
}

impl ModelIndex {
    /// Index with tier lists filled from the candidates and no details.
    pub fn from_candidates(candidates: &[Candidate]) -> Self {
        let mut index = ModelIndex::default();
        for candidate in candidates {
            let list = match candidate.tier {
                Some(Tier::Root) => &mut index.root,
                Some(Tier::Leaves) => &mut index.leaves,
                None => continue,
            };
            // root_a.exe and root_a.EXE share an identifier on case-sensitive filesystems
            if !list.contains(&candidate.identifier) {
                list.push(candidate.identifier.clone());
            }
        }
        index
    }

    /// Number of tier entries that have details.
    pub fn described(&self) -> usize {
        self.root.iter()
            .chain(self.leaves.iter())
            .filter(|id| self.details.contains_key(*id))
            .count()
    }

    /// Identifiers the UI may enable: every tiered model plus extra operation ids.
    pub fn known_ids(&self, extra: &[String]) -> BTreeSet<String> {
        self.root.iter()
            .chain(self.leaves.iter())
            .chain(extra.iter())
            .cloned()
            .collect()
    }
}

/// A file in the models directory that carries the executable extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// File name including extension
    pub filename: String,
    /// File name without extension
    pub identifier: String,
    pub tier: Option<Tier>,
    /// Absolute or directory-relative path used to spawn the executable
    pub path: PathBuf,
}

/// Outcome of checking every executable for well-formed introspection output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResult {
    Good,
    Error {
        #[serde(rename = "invalidExecutables")]
        invalid_executables: Vec<String>,
    },
}

impl ValidationResult {
    pub fn is_good(&self) -> bool {
        matches!(self, ValidationResult::Good)
    }
}

/// Summary of one index rebuild, returned to whoever asked for the check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub root: usize,
    pub leaves: usize,
    /// Tiered models that reported details
    pub described: usize,
    /// Identifiers probed without producing details
    pub failed: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(filename: &str) -> Candidate {
        let identifier = filename.trim_end_matches(".exe").to_string();
        Candidate {
            filename: filename.to_string(),
            tier: Tier::classify(&identifier),
            identifier,
            path: PathBuf::from(filename),
        }
    }

    #[test]
    fn test_classify_by_prefix() {
        assert_eq!(Tier::classify("root_shape"), Some(Tier::Root));
        assert_eq!(Tier::classify("leaves_color"), Some(Tier::Leaves));
        assert_eq!(Tier::classify("rootshape"), None);
        assert_eq!(Tier::classify("leaf_color"), None);
        assert_eq!(Tier::classify("helper"), None);
    }

    #[test]
    fn test_blank_fields_get_distinct_placeholders() {
        let details = ModelDetails::from_fields(["", " ", "v2", "", "eval.exe"]);
        assert_eq!(details.display_name, "Desconhecido");
        assert_eq!(details.architecture_name, "N/D");
        assert_eq!(details.architecture_version, "v2");
        assert_eq!(details.dataset_name, "N/D");
        assert_eq!(details.evaluation_binary_name, "eval.exe");
    }

    #[test]
    fn test_index_from_candidates_skips_unprefixed() {
        let candidates = vec![
            candidate("leaves_color.exe"),
            candidate("root_shape.exe"),
            candidate("helper.exe"),
        ];
        let index = ModelIndex::from_candidates(&candidates);
        assert_eq!(index.root, vec!["root_shape"]);
        assert_eq!(index.leaves, vec!["leaves_color"]);
        assert!(index.details.is_empty());
    }

    #[test]
    fn test_identifier_listed_once() {
        let mut upper = candidate("root_shape.exe");
        upper.filename = "root_shape.EXE".to_string();
        let index = ModelIndex::from_candidates(&[candidate("root_shape.exe"), upper]);
        assert_eq!(index.root, vec!["root_shape"]);
    }

    #[test]
    fn test_index_json_shape() {
        let mut index = ModelIndex {
            root: vec!["root_a".to_string()],
            leaves: vec![],
            details: BTreeMap::new(),
        };
        index.details.insert(
            "root_a".to_string(),
            ModelDetails::from_fields(["A", "B", "C", "D", "E"]),
        );

        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value["root"][0], "root_a");
        assert!(value["leaves"].as_array().unwrap().is_empty());
        assert_eq!(value["details"]["root_a"]["dataset_name"], "D");
    }

    #[test]
    fn test_missing_detail_fields_deserialize_to_placeholders() {
        let json = r#"{"root":["root_a"],"leaves":[],"details":{"root_a":{"display_name":"A"}}}"#;
        let index: ModelIndex = serde_json::from_str(json).unwrap();
        let details = &index.details["root_a"];
        assert_eq!(details.display_name, "A");
        assert_eq!(details.architecture_name, NOT_AVAILABLE);
    }

    #[test]
    fn test_validation_result_wire_format() {
        assert_eq!(
            serde_json::to_string(&ValidationResult::Good).unwrap(),
            r#"{"status":"good"}"#
        );
        let error = ValidationResult::Error { invalid_executables: vec!["root_a.exe".to_string()] };
        assert_eq!(
            serde_json::to_string(&error).unwrap(),
            r#"{"status":"error","invalidExecutables":["root_a.exe"]}"#
        );
    }

    #[test]
    fn test_known_ids_merge_tiers_and_operations() {
        let index = ModelIndex {
            root: vec!["root_a".to_string()],
            leaves: vec!["leaves_b".to_string()],
            details: BTreeMap::new(),
        };
        let ids = index.known_ids(&["csv".to_string(), "root_a".to_string()]);
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["csv", "leaves_b", "root_a"]);
    }
}
