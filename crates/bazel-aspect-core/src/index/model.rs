//! Code-location index model.
//!
//! A [`CodeLocationIndexEntry`] ties one artifact on disk to the classes a
//! scanner has reported inside it. Entries only grow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

// ────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────

/// Identity of a code location, e.g. `org.slf4j:slf4j-api:1.7.30`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeLocationIdentifier(String);

impl CodeLocationIdentifier {
    /// Creates an identifier from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a `group:artifact:version` identifier.
    #[must_use]
    pub fn from_coordinates(group: &str, artifact: &str, version: &str) -> Self {
        Self(format!("{group}:{artifact}:{version}"))
    }

    /// Splits a three-part identifier into `(group, artifact, version)`.
    #[must_use]
    pub fn coordinates(&self) -> Option<(&str, &str, &str)> {
        let mut parts = self.0.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(group), Some(artifact), Some(version), None) => Some((group, artifact, version)),
            _ => None,
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeLocationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified class name, e.g. `org.slf4j.Logger`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassIdentifier(String);

impl ClassIdentifier {
    /// Creates an identifier from a fully qualified class name.
    #[must_use]
    pub fn new(fqcn: impl Into<String>) -> Self {
        Self(fqcn.into())
    }

    /// Converts an archive entry name such as `org/slf4j/Logger.class`.
    ///
    /// Returns `None` for non-class entries, nested classes (`$`),
    /// `module-info`/`package-info`, and anything under `META-INF/`.
    #[must_use]
    pub fn from_class_entry(entry: &str) -> Option<Self> {
        Self::from_entry(entry, ".class")
    }

    /// Converts a source archive entry name such as `org/slf4j/Logger.java`.
    ///
    /// The same exclusions as [`ClassIdentifier::from_class_entry`] apply.
    #[must_use]
    pub fn from_source_entry(entry: &str) -> Option<Self> {
        Self::from_entry(entry, ".java")
    }

    fn from_entry(entry: &str, extension: &str) -> Option<Self> {
        if entry.starts_with("META-INF/") {
            return None;
        }
        let stem = entry.strip_suffix(extension)?;
        let simple = stem.rsplit('/').next().unwrap_or(stem);
        if simple.is_empty()
            || simple.contains('$')
            || simple == "module-info"
            || simple == "package-info"
        {
            return None;
        }
        Some(Self(stem.replace('/', ".")))
    }

    /// Package part, `None` for the default package.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(package, _)| package)
    }

    /// Class name without the package.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit_once('.').map_or(self.0.as_str(), |(_, name)| name)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ────────────────────────────────────────────
// Entries
// ────────────────────────────────────────────

/// One artifact on disk and the classes known to live in it.
///
/// `contained_classes` stays `None` until the first [`add_class`] call.
/// Classes are kept in insertion order and never removed; adding the same
/// class twice records it twice.
///
/// [`add_class`]: CodeLocationIndexEntry::add_class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeLocationIndexEntry {
    id: CodeLocationIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    bazel_label: Option<String>,
    location_on_disk: PathBuf,
    contained_classes: Option<Vec<ClassIdentifier>>,
}

impl CodeLocationIndexEntry {
    /// Creates an entry for an artifact with no known producing target.
    #[must_use]
    pub fn new(location_on_disk: impl Into<PathBuf>, id: CodeLocationIdentifier) -> Self {
        Self {
            id,
            bazel_label: None,
            location_on_disk: location_on_disk.into(),
            contained_classes: None,
        }
    }

    /// Sets the label of the local target that produced the artifact.
    #[must_use]
    pub fn with_bazel_label(mut self, label: impl Into<String>) -> Self {
        self.bazel_label = Some(label.into());
        self
    }

    /// Records a class found in the artifact.
    pub fn add_class(&mut self, class_id: ClassIdentifier) {
        self.contained_classes
            .get_or_insert_with(|| Vec::with_capacity(5))
            .push(class_id);
    }

    /// Identity of the location.
    #[must_use]
    pub fn id(&self) -> &CodeLocationIdentifier {
        &self.id
    }

    /// Label of the producing target, if it is a local build output.
    #[must_use]
    pub fn bazel_label(&self) -> Option<&str> {
        self.bazel_label.as_deref()
    }

    /// Path to the artifact.
    #[must_use]
    pub fn location_on_disk(&self) -> &Path {
        &self.location_on_disk
    }

    /// Classes added so far; `None` if none were ever added.
    #[must_use]
    pub fn contained_classes(&self) -> Option<&[ClassIdentifier]> {
        self.contained_classes.as_deref()
    }

    /// Classes added so far, empty if none were ever added.
    #[must_use]
    pub fn classes(&self) -> &[ClassIdentifier] {
        self.contained_classes.as_deref().unwrap_or_default()
    }

    /// Number of classes added.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes().len()
    }

    /// Returns true if `class_id` was added to this entry.
    #[must_use]
    pub fn contains(&self, class_id: &ClassIdentifier) -> bool {
        self.classes().contains(class_id)
    }
}

// ────────────────────────────────────────────
// Aggregate
// ────────────────────────────────────────────

/// In-memory collection of entries keyed by artifact path.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct CodeLocationIndex {
    entries: BTreeMap<PathBuf, CodeLocationIndexEntry>,
}

impl CodeLocationIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the one previously stored for the same path.
    pub fn insert(&mut self, entry: CodeLocationIndexEntry) -> Option<CodeLocationIndexEntry> {
        self.entries
            .insert(entry.location_on_disk().to_path_buf(), entry)
    }

    /// Entry for an artifact path.
    #[must_use]
    pub fn get(&self, location: &Path) -> Option<&CodeLocationIndexEntry> {
        self.entries.get(location)
    }

    /// Entries with the given identifier.
    pub fn find_by_id<'a>(
        &'a self,
        id: &'a CodeLocationIdentifier,
    ) -> impl Iterator<Item = &'a CodeLocationIndexEntry> + 'a {
        self.entries.values().filter(move |e| e.id() == id)
    }

    /// Entries containing the given class.
    pub fn find_class<'a>(
        &'a self,
        class_id: &'a ClassIdentifier,
    ) -> impl Iterator<Item = &'a CodeLocationIndexEntry> + 'a {
        self.entries.values().filter(move |e| e.contains(class_id))
    }

    /// Iterates entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &CodeLocationIndexEntry> {
        self.entries.values()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, id: &str) -> CodeLocationIndexEntry {
        CodeLocationIndexEntry::new(path, CodeLocationIdentifier::new(id))
    }

    // -- Identifiers --

    #[test]
    fn coordinates_round_trip_three_parts_only() {
        let id = CodeLocationIdentifier::from_coordinates("org.slf4j", "slf4j-api", "1.7.30");
        assert_eq!(id.as_str(), "org.slf4j:slf4j-api:1.7.30");
        assert_eq!(id.coordinates(), Some(("org.slf4j", "slf4j-api", "1.7.30")));
        assert!(CodeLocationIdentifier::new("libfoo").coordinates().is_none());
        assert!(CodeLocationIdentifier::new("a:b:c:d").coordinates().is_none());
    }

    #[test]
    fn class_from_entry_name() {
        let class = ClassIdentifier::from_class_entry("org/slf4j/Logger.class").unwrap();
        assert_eq!(class.as_str(), "org.slf4j.Logger");
        assert_eq!(class.package_name(), Some("org.slf4j"));
        assert_eq!(class.simple_name(), "Logger");
    }

    #[test]
    fn class_from_entry_skips_non_top_level_entries() {
        for entry in [
            "org/slf4j/Logger$1.class",
            "module-info.class",
            "org/slf4j/package-info.class",
            "META-INF/versions/9/org/slf4j/Logger.class",
            "org/slf4j/Logger.java",
            "org/slf4j/",
        ] {
            assert!(ClassIdentifier::from_class_entry(entry).is_none(), "{entry}");
        }
    }

    #[test]
    fn class_from_source_entry() {
        let class = ClassIdentifier::from_source_entry("org/slf4j/Logger.java").unwrap();
        assert_eq!(class.as_str(), "org.slf4j.Logger");
        assert!(ClassIdentifier::from_source_entry("org/slf4j/Logger.class").is_none());
    }

    #[test]
    fn default_package_class() {
        let class = ClassIdentifier::from_class_entry("Main.class").unwrap();
        assert_eq!(class.package_name(), None);
        assert_eq!(class.simple_name(), "Main");
    }

    // -- Entries --

    #[test]
    fn classes_are_absent_until_first_add() {
        let mut e = entry("/m2/a.jar", "g:a:1");
        assert!(e.contained_classes().is_none());
        assert_eq!(e.class_count(), 0);

        e.add_class(ClassIdentifier::new("a.A"));
        assert_eq!(e.contained_classes().map(<[_]>::len), Some(1));
    }

    #[test]
    fn add_class_preserves_call_order() {
        let mut e = entry("/m2/a.jar", "g:a:1");
        let names = ["a.C", "a.A", "a.B"];
        for name in names {
            e.add_class(ClassIdentifier::new(name));
        }
        let got: Vec<&str> = e.classes().iter().map(ClassIdentifier::as_str).collect();
        assert_eq!(got, names);
    }

    #[test]
    fn add_class_does_not_deduplicate() {
        let mut e = entry("/m2/a.jar", "g:a:1");
        e.add_class(ClassIdentifier::new("a.A"));
        e.add_class(ClassIdentifier::new("a.A"));
        assert_eq!(e.class_count(), 2);
    }

    #[test]
    fn bazel_label_is_optional() {
        let plain = entry("/m2/a.jar", "g:a:1");
        assert!(plain.bazel_label().is_none());

        let labeled = entry("bazel-out/bin/a/liba.jar", "liba").with_bazel_label("//a:a");
        assert_eq!(labeled.bazel_label(), Some("//a:a"));
        assert_eq!(labeled.location_on_disk(), Path::new("bazel-out/bin/a/liba.jar"));
    }

    // -- Index --

    #[test]
    fn index_finds_entries_by_class_and_id() {
        let mut a = entry("/m2/a-1.jar", "g:a:1");
        a.add_class(ClassIdentifier::new("g.Shared"));
        let mut b = entry("/m2/a-2.jar", "g:a:2");
        b.add_class(ClassIdentifier::new("g.Shared"));
        b.add_class(ClassIdentifier::new("g.Only"));

        let mut index = CodeLocationIndex::new();
        assert!(index.insert(a).is_none());
        assert!(index.insert(b).is_none());

        let shared = ClassIdentifier::new("g.Shared");
        assert_eq!(index.find_class(&shared).count(), 2);
        let only = ClassIdentifier::new("g.Only");
        let found: Vec<_> = index.find_class(&only).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id().as_str(), "g:a:2");

        let id = CodeLocationIdentifier::new("g:a:1");
        assert_eq!(index.find_by_id(&id).count(), 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn index_insert_replaces_same_path() {
        let mut index = CodeLocationIndex::new();
        index.insert(entry("/m2/a.jar", "old"));
        let previous = index.insert(entry("/m2/a.jar", "new"));
        assert_eq!(previous.map(|e| e.id().to_string()), Some("old".to_string()));
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get(Path::new("/m2/a.jar")).map(|e| e.id().as_str()),
            Some("new")
        );
    }
}
