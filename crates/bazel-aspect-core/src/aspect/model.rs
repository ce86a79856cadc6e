//! Pure domain model for decoded aspect output.
//!
//! Records are built once by the decoder and never mutated afterwards.
//! Optional fields are `Option`; collections are always present, possibly
//! empty.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

// ────────────────────────────────────────────
// Jar triple
// ────────────────────────────────────────────

/// The up-to-three artifacts produced for one JVM compilation unit.
///
/// Every member is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct JarTriple {
    interface_jar: Option<String>,
    jar: Option<String>,
    source_jar: Option<String>,
}

impl JarTriple {
    /// Creates a triple from its three members.
    #[must_use]
    pub fn new(
        interface_jar: Option<String>,
        jar: Option<String>,
        source_jar: Option<String>,
    ) -> Self {
        Self {
            interface_jar,
            jar,
            source_jar,
        }
    }

    /// Header-only compile jar (`interface_jar`).
    #[must_use]
    pub fn interface_jar(&self) -> Option<&str> {
        self.interface_jar.as_deref()
    }

    /// Full class jar (`jar`).
    #[must_use]
    pub fn jar(&self) -> Option<&str> {
        self.jar.as_deref()
    }

    /// Source jar (`source_jar`).
    #[must_use]
    pub fn source_jar(&self) -> Option<&str> {
        self.source_jar.as_deref()
    }

    /// Iterates the members that are present, in interface, jar, source order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        [&self.interface_jar, &self.jar, &self.source_jar]
            .into_iter()
            .filter_map(Option::as_deref)
    }

    /// Returns true if no member is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interface_jar.is_none() && self.jar.is_none() && self.source_jar.is_none()
    }
}

impl fmt::Display for JarTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JarTriple(interface_jar = {}, jar = {}, source_jar = {})",
            or_none(self.interface_jar.as_deref()),
            or_none(self.jar.as_deref()),
            or_none(self.source_jar.as_deref()),
        )
    }
}

// ────────────────────────────────────────────
// Kind classification
// ────────────────────────────────────────────

/// Rule kinds decoded as JVM targets without further configuration.
pub const JVM_RULE_KINDS: &[&str] = &[
    "java_library",
    "java_binary",
    "java_test",
    "java_import",
    "java_plugin",
    "java_proto_library",
    "java_lite_proto_library",
    "java_grpc_library",
    "java_export",
    "jvm_import",
    "kt_jvm_library",
    "kt_jvm_binary",
    "kt_jvm_test",
    "kt_jvm_import",
    "scala_library",
    "scala_binary",
    "scala_test",
    "scala_import",
];

/// Decoding variant selected for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// JVM rule carrying `java_ide_info`.
    Jvm,
    /// Any other rule.
    Generic,
}

/// Maps free-form rule kind strings to a [`TargetKind`].
#[derive(Debug, Clone, Default)]
pub struct KindClassifier {
    extra_jvm_kinds: BTreeSet<String>,
}

impl KindClassifier {
    /// Creates a classifier that knows only [`JVM_RULE_KINDS`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds rule kinds to treat as JVM.
    #[must_use]
    pub fn with_jvm_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_jvm_kinds
            .extend(kinds.into_iter().map(Into::into));
        self
    }

    /// Classifies a rule kind.
    #[must_use]
    pub fn classify(&self, kind: &str) -> TargetKind {
        if JVM_RULE_KINDS.contains(&kind) || self.extra_jvm_kinds.contains(kind) {
            TargetKind::Jvm
        } else {
            TargetKind::Generic
        }
    }
}

// ────────────────────────────────────────────
// Targets
// ────────────────────────────────────────────

/// The four identity fields extracted from the outer per-target record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetHeader {
    /// Target label, e.g. `//a:a`.
    pub label: String,
    /// Rule kind, e.g. `java_library`.
    pub kind: String,
    /// Workspace-relative path of the BUILD file.
    pub workspace_relative_path: String,
    /// Dependency labels in declaration order.
    pub deps: Vec<String>,
}

impl TargetHeader {
    /// Creates a header.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        kind: impl Into<String>,
        workspace_relative_path: impl Into<String>,
        deps: Vec<String>,
    ) -> Self {
        Self {
            label: label.into(),
            kind: kind.into(),
            workspace_relative_path: workspace_relative_path.into(),
            deps,
        }
    }
}

/// JVM-specific part of a decoded target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JvmTargetInfo {
    main_class: Option<String>,
    jars: Vec<JarTriple>,
    generated_jars: Vec<JarTriple>,
}

impl JvmTargetInfo {
    /// Creates the JVM part of a target.
    #[must_use]
    pub fn new(
        main_class: Option<String>,
        jars: Vec<JarTriple>,
        generated_jars: Vec<JarTriple>,
    ) -> Self {
        Self {
            main_class,
            jars,
            generated_jars,
        }
    }

    /// Value of `main_class`, absent when the target declares no entry point.
    #[must_use]
    pub fn main_class(&self) -> Option<&str> {
        self.main_class.as_deref()
    }

    /// Jars produced by building this target.
    #[must_use]
    pub fn jars(&self) -> &[JarTriple] {
        &self.jars
    }

    /// Jars produced by annotation processors while building this target.
    #[must_use]
    pub fn generated_jars(&self) -> &[JarTriple] {
        &self.generated_jars
    }

    /// Iterates regular then generated triples.
    pub fn output_jars(&self) -> impl Iterator<Item = &JarTriple> {
        self.jars.iter().chain(&self.generated_jars)
    }
}

/// Language-specific variant of a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum TargetDetails {
    /// JVM rule.
    Jvm(JvmTargetInfo),
    /// Rule kind this crate has no extra model for.
    Generic,
}

/// A decoded build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetInfo {
    label: String,
    kind: String,
    workspace_relative_path: String,
    deps: Vec<String>,
    sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_data_file: Option<PathBuf>,
    details: TargetDetails,
}

impl TargetInfo {
    /// Creates a target with no language-specific data.
    #[must_use]
    pub fn generic(header: TargetHeader) -> Self {
        Self::with_details(header, Vec::new(), TargetDetails::Generic)
    }

    /// Creates a JVM target.
    #[must_use]
    pub fn jvm(header: TargetHeader, sources: Vec<String>, jvm: JvmTargetInfo) -> Self {
        Self::with_details(header, sources, TargetDetails::Jvm(jvm))
    }

    fn with_details(header: TargetHeader, sources: Vec<String>, details: TargetDetails) -> Self {
        Self {
            label: header.label,
            kind: header.kind,
            workspace_relative_path: header.workspace_relative_path,
            deps: header.deps,
            sources,
            aspect_data_file: None,
            details,
        }
    }

    /// Records the aspect data file this target was loaded from.
    #[must_use]
    pub fn with_aspect_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.aspect_data_file = Some(path.into());
        self
    }

    /// Target label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rule kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Workspace-relative path of the BUILD file.
    #[must_use]
    pub fn workspace_relative_path(&self) -> &str {
        &self.workspace_relative_path
    }

    /// Dependency labels, in the order supplied.
    #[must_use]
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    /// Workspace-relative source paths.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// File the record was loaded from, if it came from disk.
    #[must_use]
    pub fn aspect_data_file(&self) -> Option<&Path> {
        self.aspect_data_file.as_deref()
    }

    /// Language-specific variant.
    #[must_use]
    pub fn details(&self) -> &TargetDetails {
        &self.details
    }

    /// JVM part, if this is a JVM target.
    #[must_use]
    pub fn as_jvm(&self) -> Option<&JvmTargetInfo> {
        match &self.details {
            TargetDetails::Jvm(jvm) => Some(jvm),
            TargetDetails::Generic => None,
        }
    }

    /// Returns true for JVM targets.
    #[must_use]
    pub fn is_jvm(&self) -> bool {
        matches!(self.details, TargetDetails::Jvm(_))
    }
}

impl fmt::Display for TargetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TargetInfo(")?;
        writeln!(f, "  label = {},", self.label)?;
        writeln!(
            f,
            "  build_file_artifact_location = {},",
            self.workspace_relative_path
        )?;
        writeln!(f, "  kind = {},", self.kind)?;
        if let TargetDetails::Jvm(jvm) = &self.details {
            writeln!(f, "  jars = [{}],", comma_join(&jvm.jars))?;
            writeln!(f, "  generated_jars = [{}],", comma_join(&jvm.generated_jars))?;
        }
        writeln!(f, "  dependencies = [{}],", comma_join(&self.deps))?;
        writeln!(f, "  sources = [{}],", comma_join(&self.sources))?;
        if let TargetDetails::Jvm(jvm) = &self.details {
            writeln!(f, "  main_class = {},", or_none(jvm.main_class()))?;
        }
        write!(f, ")")
    }
}

fn comma_join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("<none>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> TargetHeader {
        TargetHeader::new(
            "//a:a",
            "java_library",
            "a/BUILD",
            vec!["//b:b".to_string()],
        )
    }

    #[test]
    fn jar_triple_paths_skip_absent_members() {
        let triple = JarTriple::new(None, Some("out/a.jar".into()), Some("out/a-src.jar".into()));
        assert_eq!(
            triple.paths().collect::<Vec<_>>(),
            vec!["out/a.jar", "out/a-src.jar"]
        );
        assert!(!triple.is_empty());
        assert!(JarTriple::default().is_empty());
    }

    #[test]
    fn classifier_knows_builtin_and_extra_kinds() {
        let classifier = KindClassifier::new().with_jvm_kinds(["my_java_rule"]);
        assert_eq!(classifier.classify("java_library"), TargetKind::Jvm);
        assert_eq!(classifier.classify("kt_jvm_library"), TargetKind::Jvm);
        assert_eq!(classifier.classify("my_java_rule"), TargetKind::Jvm);
        assert_eq!(classifier.classify("cc_library"), TargetKind::Generic);
    }

    #[test]
    fn generic_target_has_empty_sources_and_no_jvm_part() {
        let target = TargetInfo::generic(header());
        assert!(target.sources().is_empty());
        assert!(target.as_jvm().is_none());
        assert!(!target.is_jvm());
    }

    #[test]
    fn output_jars_chain_regular_then_generated() {
        let jvm = JvmTargetInfo::new(
            None,
            vec![JarTriple::new(None, Some("a.jar".into()), None)],
            vec![JarTriple::new(None, Some("gen.jar".into()), None)],
        );
        let jars: Vec<_> = jvm.output_jars().filter_map(JarTriple::jar).collect();
        assert_eq!(jars, vec!["a.jar", "gen.jar"]);
    }

    #[test]
    fn render_jvm_target() {
        let target = TargetInfo::jvm(
            header(),
            vec!["a/A.java".to_string()],
            JvmTargetInfo::new(
                Some("a.Main".to_string()),
                vec![JarTriple::new(
                    Some("out/a-hjar.jar".into()),
                    Some("out/a.jar".into()),
                    None,
                )],
                Vec::new(),
            ),
        );

        insta::assert_snapshot!(target.to_string(), @r"
TargetInfo(
  label = //a:a,
  build_file_artifact_location = a/BUILD,
  kind = java_library,
  jars = [JarTriple(interface_jar = out/a-hjar.jar, jar = out/a.jar, source_jar = <none>)],
  generated_jars = [],
  dependencies = [//b:b],
  sources = [a/A.java],
  main_class = a.Main,
)
");
    }

    #[test]
    fn render_generic_target_omits_jvm_lines() {
        let rendered = TargetInfo::generic(header()).to_string();
        assert!(rendered.contains("label = //a:a"));
        assert!(!rendered.contains("jars"));
        assert!(!rendered.contains("main_class"));
    }
}
