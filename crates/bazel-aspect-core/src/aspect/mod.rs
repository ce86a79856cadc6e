//! Decoding of per-target aspect output.
//!
//! # Pipeline
//!
//! ```text
//! aspect data file (JSON text)
//!   ↓ serde_json
//! serde_json::Value
//!   ↓ decode_header (dto::AspectEnvelopeDto)
//! TargetHeader
//!   ↓ decode_target (dto::JavaIdeInfoDto, per-jar second parse)
//! TargetInfo
//! ```
//!
//! Failures are scoped to one target: [`loader::AspectLoader::load_files`]
//! records a malformed file and keeps going.

use miette::Diagnostic;
use std::path::PathBuf;

pub mod decoder;
pub mod dto;
pub mod loader;
pub mod model;

pub use decoder::{decode_header, decode_jar_triple, decode_jvm_target, decode_target};
pub use loader::{AspectLoader, AspectLoaderBuilder, LoadFailure, LoadReport, LoaderError};
pub use model::{
    JarTriple, JvmTargetInfo, KindClassifier, TargetDetails, TargetHeader, TargetInfo,
    TargetKind, JVM_RULE_KINDS,
};

/// Errors from decoding one target record.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum DecodeError {
    /// Text that should be JSON is not.
    #[error("invalid JSON in {context}: {source}")]
    #[diagnostic(code(bazel_aspect::decode::syntax))]
    Syntax {
        /// Where the text came from (e.g. `java_ide_info.jars[0]`).
        context: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A value has the wrong shape (e.g. a string where an array is expected).
    #[error("malformed {context}: {source}")]
    #[diagnostic(
        code(bazel_aspect::decode::shape),
        help("the aspect that produced this file may be a different version")
    )]
    Shape {
        /// Where the value was found.
        context: String,
        /// Underlying type error.
        source: serde_json::Error,
    },

    /// The target record itself is not a JSON object.
    #[error("target record must be a JSON object, found {found}")]
    #[diagnostic(code(bazel_aspect::decode::not_an_object))]
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// The aspect data file could not be read.
    #[error("failed to read aspect data file {path}: {source}")]
    #[diagnostic(code(bazel_aspect::decode::io))]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl DecodeError {
    /// Wraps a type error found at `context`.
    pub(crate) fn shape(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Shape {
            context: context.into(),
            source,
        }
    }

    /// Wraps an error from parsing text, keeping syntax and type errors apart.
    pub(crate) fn from_json(context: impl Into<String>, source: serde_json::Error) -> Self {
        if source.is_syntax() || source.is_eof() {
            Self::Syntax {
                context: context.into(),
                source,
            }
        } else {
            Self::shape(context, source)
        }
    }
}
