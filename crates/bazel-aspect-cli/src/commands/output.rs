//! Shared output formatting for decoded targets and jar indexes.

use anyhow::Result;
use bazel_aspect_core::{CodeLocationIndexEntry, LoadReport, ScanReport, TargetInfo};
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct DecodeOutput<'a> {
    files_loaded: usize,
    targets: Vec<&'a TargetInfo>,
    failures: Vec<FailureOutput>,
}

#[derive(Serialize)]
struct IndexOutput<'a> {
    entries: Vec<&'a CodeLocationIndexEntry>,
    failures: Vec<FailureOutput>,
}

#[derive(Serialize)]
struct FailureOutput {
    path: String,
    error: String,
}

/// Print decoded targets in the specified format.
pub fn print_targets(report: &LoadReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_targets_text(report),
        OutputFormat::Json => {
            let output = DecodeOutput {
                files_loaded: report.files_loaded,
                targets: report.targets.values().collect(),
                failures: report
                    .failures
                    .iter()
                    .map(|f| FailureOutput {
                        path: f.path.display().to_string(),
                        error: f.error.to_string(),
                    })
                    .collect(),
            };
            return print_json(&output);
        }
        OutputFormat::Compact => print_targets_compact(report),
    }
    Ok(())
}

/// Print a jar index in the specified format.
pub fn print_index(report: &ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_index_text(report),
        OutputFormat::Json => {
            let output = IndexOutput {
                entries: report.index.iter().collect(),
                failures: report
                    .failures
                    .iter()
                    .map(|f| FailureOutput {
                        path: f.path.display().to_string(),
                        error: f.error.to_string(),
                    })
                    .collect(),
            };
            return print_json(&output);
        }
        OutputFormat::Compact => print_index_compact(report),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn print_targets_text(report: &LoadReport) {
    for target in report.targets.values() {
        println!("{target}");
        println!();
    }

    let jvm = report.targets.values().filter(|t| t.is_jvm()).count();
    let summary_color = if report.has_failures() {
        "\x1b[31m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Decoded {} target(s) ({} JVM) from {} file(s), {} failure(s)\x1b[0m",
        summary_color,
        report.targets.len(),
        jvm,
        report.files_loaded,
        report.failures.len()
    );
}

fn print_targets_compact(report: &LoadReport) {
    for target in report.targets.values() {
        let jars = target.as_jvm().map_or(0, |j| j.output_jars().count());
        println!(
            "{}\t{}\t{}\t{} source(s)\t{} jar(s)",
            target.label(),
            target.kind(),
            target.workspace_relative_path(),
            target.sources().len(),
            jars,
        );
    }
}

fn print_index_text(report: &ScanReport) {
    for entry in report.index.iter() {
        println!(
            "{} at {}",
            entry.id(),
            entry.location_on_disk().display()
        );
        if let Some(label) = entry.bazel_label() {
            println!("  label: {label}");
        }
        match entry.contained_classes() {
            Some(classes) => {
                for class in classes {
                    println!("  {class}");
                }
            }
            None => println!("  (no classes)"),
        }
        println!();
    }

    let classes: usize = report
        .index
        .iter()
        .map(CodeLocationIndexEntry::class_count)
        .sum();
    let summary_color = if report.failures.is_empty() {
        "\x1b[32m"
    } else {
        "\x1b[31m"
    };

    println!(
        "{}Indexed {} class(es) in {} jar(s), {} failure(s)\x1b[0m",
        summary_color,
        classes,
        report.index.len(),
        report.failures.len()
    );
}

fn print_index_compact(report: &ScanReport) {
    for entry in report.index.iter() {
        for class in entry.classes() {
            println!(
                "{}\t{}\t{}",
                class,
                entry.id(),
                entry.location_on_disk().display()
            );
        }
    }
}
