//! JSON deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization of aspect output.
//! They are converted to domain model types via the decoder.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Outer per-target record: the identity fields every target carries.
///
/// Two shapes are accepted. The flat one:
///
/// ```json
/// {"label": "//a:a", "kind": "java_library",
///  "build_file_artifact_location": "a/BUILD", "dependencies": ["//b:b"]}
/// ```
///
/// and the nested one emitted by IDE aspects:
///
/// ```json
/// {"key": {"label": "//a:a"}, "kind_string": "java_library",
///  "build_file_artifact_location": {"relative_path": "a/BUILD"},
///  "deps": [{"target": {"label": "//b:b"}}]}
/// ```
///
/// Unknown fields (including `java_ide_info`) are ignored here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AspectEnvelopeDto {
    /// Flat target label.
    #[serde(default)]
    pub label: Option<String>,
    /// Nested target key carrying the label.
    #[serde(default)]
    pub key: Option<TargetKeyDto>,
    /// Flat rule kind.
    #[serde(default)]
    pub kind: Option<String>,
    /// Nested rule kind.
    #[serde(default)]
    pub kind_string: Option<String>,
    /// Location of the BUILD file that declared the target.
    #[serde(default)]
    pub build_file_artifact_location: Option<BuildFileLocationDto>,
    /// Flat dependency labels.
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,
    /// Nested dependency records.
    #[serde(default)]
    pub deps: Option<Vec<DependencyDto>>,
}

/// `{"label": ...}` object used by the nested envelope shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetKeyDto {
    /// Target label.
    #[serde(default)]
    pub label: Option<String>,
}

/// Either a plain path string or an artifact-location object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BuildFileLocationDto {
    /// `"a/BUILD"`
    Path(String),
    /// `{"relative_path": "a/BUILD", ...}`
    Artifact {
        /// Workspace-relative path.
        #[serde(default)]
        relative_path: Option<String>,
    },
}

/// One entry of the nested `deps` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyDto {
    /// The dependency target.
    #[serde(default)]
    pub target: Option<TargetKeyDto>,
}

/// The `java_ide_info` sub-record.
///
/// Every field is optional; `null` and absence are treated alike.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JavaIdeInfoDto {
    /// Source files of the target.
    #[serde(default)]
    pub sources: Option<Vec<SourceDto>>,
    /// Regular output jars, each an encoded sub-document.
    #[serde(default)]
    pub jars: Option<Vec<EncodedJarDto>>,
    /// Annotation-processor output jars, each an encoded sub-document.
    #[serde(default)]
    pub generated_jars: Option<Vec<EncodedJarDto>>,
    /// Entry-point class.
    #[serde(default)]
    pub main_class: Option<String>,
}

/// One entry of the `sources` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceDto {
    /// Workspace-relative path; entries without it are skipped.
    #[serde(default)]
    pub relative_path: Option<String>,
}

/// One element of a `jars` / `generated_jars` array.
///
/// Aspect output double-encodes these: the element is JSON text that must be
/// parsed a second time. Older writers inline the object instead, which is
/// re-serialized so both forms go through the same second pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EncodedJarDto {
    /// Serialized sub-document.
    Text(String),
    /// Inline sub-document.
    Object(Map<String, Value>),
}

impl EncodedJarDto {
    /// Returns the serialized text of this sub-document.
    ///
    /// # Errors
    ///
    /// Returns an error if an inline object cannot be re-serialized.
    pub fn document(&self) -> Result<Cow<'_, str>, serde_json::Error> {
        match self {
            Self::Text(text) => Ok(Cow::Borrowed(text)),
            Self::Object(map) => serde_json::to_string(map).map(Cow::Owned),
        }
    }
}

/// A decoded jar sub-document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JarTripleDto {
    /// Header-only compile jar.
    #[serde(default)]
    pub interface_jar: Option<String>,
    /// Full class jar.
    #[serde(default)]
    pub jar: Option<String>,
    /// Source jar.
    #[serde(default)]
    pub source_jar: Option<String>,
}
