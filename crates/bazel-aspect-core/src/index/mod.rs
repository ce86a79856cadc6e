//! Index of which classes live in which artifact.

pub mod model;
pub mod scanner;

pub use model::{
    ClassIdentifier, CodeLocationIdentifier, CodeLocationIndex, CodeLocationIndexEntry,
};
pub use scanner::{
    identifier_for, label_map_from_targets, JarScanner, ScanError, ScanFailure, ScanReport,
};
