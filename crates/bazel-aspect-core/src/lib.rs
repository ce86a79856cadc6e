//! # bazel-aspect-core
//!
//! Typed model of Bazel aspect output and a code-location index.
//!
//! This crate provides:
//!
//! - [`aspect`]: decoding of per-target aspect records into [`TargetInfo`],
//!   with a JVM variant carrying [`JarTriple`]s
//! - [`index`]: [`CodeLocationIndexEntry`] records tying artifacts on disk
//!   to the classes inside them, and a [`JarScanner`] that fills them
//! - [`Config`] for both halves
//!
//! ## Example
//!
//! ```ignore
//! use bazel_aspect_core::{AspectLoader, JarScanner, ScannerConfig, label_map_from_targets};
//!
//! let report = AspectLoader::builder().build().load_dir("bazel-bin".as_ref())?;
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.path.display(), failure.error);
//! }
//!
//! let scanner = JarScanner::new(&ScannerConfig::default())?
//!     .with_labels(label_map_from_targets(report.targets.values()));
//! let index = scanner.scan(".".as_ref())?.index;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aspect;
mod config;
pub mod index;

pub use aspect::{
    AspectLoader, AspectLoaderBuilder, DecodeError, JarTriple, JvmTargetInfo, KindClassifier,
    LoadFailure, LoadReport, LoaderError, TargetDetails, TargetHeader, TargetInfo, TargetKind,
    JVM_RULE_KINDS,
};
pub use config::{Config, ConfigError, DecoderConfig, ScannerConfig};
pub use index::{
    identifier_for, label_map_from_targets, ClassIdentifier, CodeLocationIdentifier,
    CodeLocationIndex, CodeLocationIndexEntry, JarScanner, ScanError, ScanFailure, ScanReport,
};
