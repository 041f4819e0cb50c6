use serde::{Deserialize, Serialize};

use crate::transformer::TransformerDescriptor;

/// Package every generated file imports
pub const BASELINE_IMPORT: &str = "fmt";

/// Qualifier substrings and the package each one implies
const KNOWN_PACKAGES: &[(&str, &str)] = &[
    ("strconv.", "strconv"),
    ("time.", "time"),
    ("strings.", "strings"),
    ("errors.", "errors"),
];

/// Package paths in first-insertion order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ImportSet(Vec<String>);

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding only the baseline import
    pub fn baseline() -> Self {
        let mut set = Self::new();
        set.insert(BASELINE_IMPORT);
        set
    }

    /// Add a package; returns false if it was already present
    pub fn insert(&mut self, package: &str) -> bool {
        if self.contains(package) {
            return false;
        }
        self.0.push(package.to_string());
        true
    }

    pub fn contains(&self, package: &str) -> bool {
        self.0.iter().any(|p| p == package)
    }

    pub fn merge(&mut self, other: &ImportSet) {
        for package in other.iter() {
            self.insert(package);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ImportSet {
    fn from(packages: Vec<String>) -> Self {
        let mut set = Self::new();
        for package in &packages {
            set.insert(package);
        }
        set
    }
}

impl From<ImportSet> for Vec<String> {
    fn from(set: ImportSet) -> Self {
        set.0
    }
}

/// Baseline plus every package a transformer body refers to
pub fn detect_imports(transformers: &[TransformerDescriptor]) -> ImportSet {
    let mut imports = ImportSet::baseline();

    for transformer in transformers {
        for (needle, package) in KNOWN_PACKAGES {
            if transformer.body_text.contains(needle) {
                imports.insert(package);
            }
        }
    }

    imports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer(body: &str) -> TransformerDescriptor {
        TransformerDescriptor::new("t", "T", "", "", body)
    }

    #[test]
    fn test_baseline_only() {
        assert_eq!(detect_imports(&[]).as_slice(), &["fmt".to_string()]);
    }

    #[test]
    fn test_detection_order_and_dedupe() {
        let transformers = vec![
            transformer("func a(s string) string { return strings.ToUpper(s) }"),
            transformer("func b(s string) (int, error) { return strconv.Atoi(s) }"),
            transformer("func c(s string) string { return strings.TrimSpace(s) }"),
        ];
        let detected = detect_imports(&transformers);
        let imports: Vec<&str> = detected.iter().collect();
        assert_eq!(imports, vec!["fmt", "strings", "strconv"]);
    }

    #[test]
    fn test_time_and_errors() {
        let transformers = vec![transformer(
            "func d(ts int64) (time.Time, error) { if ts < 0 { return time.Time{}, errors.New(\"negative\") }; return time.Unix(ts, 0), nil }",
        )];
        let detected = detect_imports(&transformers);
        let imports: Vec<&str> = detected.iter().collect();
        assert_eq!(imports, vec!["fmt", "time", "errors"]);
    }

    #[test]
    fn test_deserialize_dedupes() {
        let set: ImportSet = serde_json::from_str(r#"["fmt","time","fmt"]"#).unwrap();
        assert_eq!(set.len(), 2);
    }
}
