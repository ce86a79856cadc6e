//! Raw JSON → domain model conversion.
//!
//! Each nesting level is decoded into its DTO before being converted, so a
//! wrong shape is reported with the path at which it was found.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::dto::{
    AspectEnvelopeDto, BuildFileLocationDto, EncodedJarDto, JarTripleDto, JavaIdeInfoDto,
    SourceDto,
};
use super::model::{
    JarTriple, JvmTargetInfo, KindClassifier, TargetHeader, TargetInfo, TargetKind,
};
use super::DecodeError;

/// Key of the JVM sub-record inside a target record.
pub const JAVA_IDE_INFO_KEY: &str = "java_ide_info";

/// Extracts the identity fields from an outer per-target record.
///
/// Missing fields become empty strings / an empty list.
///
/// # Errors
///
/// Returns an error if `raw` is not an object or a field has the wrong shape.
pub fn decode_header(raw: &Value) -> Result<TargetHeader, DecodeError> {
    require_object(raw)?;
    let dto = AspectEnvelopeDto::deserialize(raw)
        .map_err(|e| DecodeError::shape("target envelope", e))?;
    Ok(header_from_dto(dto))
}

fn header_from_dto(dto: AspectEnvelopeDto) -> TargetHeader {
    let label = dto
        .label
        .or_else(|| dto.key.and_then(|k| k.label))
        .unwrap_or_default();
    let kind = dto.kind.or(dto.kind_string).unwrap_or_default();
    let workspace_relative_path = match dto.build_file_artifact_location {
        Some(BuildFileLocationDto::Path(path)) => path,
        Some(BuildFileLocationDto::Artifact { relative_path }) => {
            relative_path.unwrap_or_default()
        }
        None => String::new(),
    };

    let mut deps = dto.dependencies.unwrap_or_default();
    deps.extend(
        dto.deps
            .unwrap_or_default()
            .into_iter()
            .filter_map(|d| d.target.and_then(|t| t.label)),
    );

    TargetHeader {
        label,
        kind,
        workspace_relative_path,
        deps,
    }
}

/// Decodes one target, choosing the variant from its kind.
///
/// A record carrying `java_ide_info` is decoded as JVM whatever its kind.
///
/// # Errors
///
/// Returns an error if the JVM sub-record is malformed.
pub fn decode_target(
    raw: &Value,
    header: TargetHeader,
    classifier: &KindClassifier,
) -> Result<TargetInfo, DecodeError> {
    require_object(raw)?;
    let has_ide_info = raw.get(JAVA_IDE_INFO_KEY).is_some_and(|v| !v.is_null());
    match classifier.classify(&header.kind) {
        TargetKind::Jvm => decode_jvm_target(raw, header),
        TargetKind::Generic if has_ide_info => decode_jvm_target(raw, header),
        TargetKind::Generic => Ok(TargetInfo::generic(header)),
    }
}

/// Decodes one target as a JVM target.
///
/// Without a `java_ide_info` sub-record the result has empty sources and
/// jars and no main class.
///
/// # Errors
///
/// Returns an error if `raw` is not an object or the sub-record is malformed.
pub fn decode_jvm_target(raw: &Value, header: TargetHeader) -> Result<TargetInfo, DecodeError> {
    require_object(raw)?;

    let Some(ide_info) = raw.get(JAVA_IDE_INFO_KEY).filter(|v| !v.is_null()) else {
        debug!("{} has no {JAVA_IDE_INFO_KEY}", header.label);
        return Ok(TargetInfo::jvm(header, Vec::new(), JvmTargetInfo::default()));
    };

    let dto = JavaIdeInfoDto::deserialize(ide_info)
        .map_err(|e| DecodeError::shape(JAVA_IDE_INFO_KEY, e))?;

    let sources = collect_sources(dto.sources.unwrap_or_default());
    let jars = decode_jar_array(dto.jars, "jars")?;
    let generated_jars = decode_jar_array(dto.generated_jars, "generated_jars")?;

    Ok(TargetInfo::jvm(
        header,
        sources,
        JvmTargetInfo::new(dto.main_class, jars, generated_jars),
    ))
}

/// Decodes one serialized jar sub-document.
///
/// # Errors
///
/// Returns an error if `document` is not JSON or not an object of strings.
pub fn decode_jar_triple(document: &str) -> Result<JarTriple, DecodeError> {
    decode_jar_document(document, "jar triple")
}

fn collect_sources(sources: Vec<SourceDto>) -> Vec<String> {
    sources
        .into_iter()
        .filter_map(|s| s.relative_path)
        .collect()
}

/// Second decode pass over an array of encoded jar sub-documents.
fn decode_jar_array(
    array: Option<Vec<EncodedJarDto>>,
    key: &str,
) -> Result<Vec<JarTriple>, DecodeError> {
    array
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, encoded)| {
            let context = format!("{JAVA_IDE_INFO_KEY}.{key}[{i}]");
            let document = encoded
                .document()
                .map_err(|e| DecodeError::shape(&context, e))?;
            decode_jar_document(&document, &context)
        })
        .collect()
}

fn decode_jar_document(document: &str, context: &str) -> Result<JarTriple, DecodeError> {
    let dto: JarTripleDto =
        serde_json::from_str(document).map_err(|e| DecodeError::from_json(context, e))?;
    Ok(JarTriple::new(dto.interface_jar, dto.jar, dto.source_jar))
}

fn require_object(raw: &Value) -> Result<(), DecodeError> {
    if raw.is_object() {
        Ok(())
    } else {
        Err(DecodeError::NotAnObject {
            found: json_type_name(raw),
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
