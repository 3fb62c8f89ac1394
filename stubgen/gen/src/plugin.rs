//! The `protoc` plugin protocol.
//!
//! `protoc` runs a plugin with a serialized `CodeGeneratorRequest` on stdin
//! and expects a serialized `CodeGeneratorResponse` on stdout. Generation
//! failures are not process failures: they travel back in
//! `CodeGeneratorResponse.error` and `protoc` prints them for the user.
//!
//! ## Examples
//!
//! ```
//! use prost_types::compiler::CodeGeneratorRequest;
//! use stubgen_gen::diagnostics::CollectingSink;
//! use stubgen_gen::plugin::generate_response;
//!
//! let request = CodeGeneratorRequest {
//!     parameter: Some("colour=blue".to_string()),
//!     ..Default::default()
//! };
//! let response = generate_response(&request, &CollectingSink::default());
//! assert!(response.error.unwrap().contains("unknown plugin parameter"));
//! ```

use std::io::{Read, Write};

use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse, Version};
use prost_types::{GeneratedCodeInfo, generated_code_info};
use tracing::{debug, error};

use crate::diagnostics::DiagnosticSink;
use crate::errors::GeneratorError;
use crate::frontend::compilation_units;
use crate::options::GeneratorOptions;
use crate::output::{GeneratedArtifact, generate_all};

/// Reads and decodes a request.
///
/// ## Errors
///
/// `GeneratorError::Io` if reading fails, `GeneratorError::DecodeError` if
/// the bytes are not a `CodeGeneratorRequest`.
pub fn read_request(mut reader: impl Read) -> Result<CodeGeneratorRequest, GeneratorError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    CodeGeneratorRequest::decode(buf.as_slice()).map_err(|source| GeneratorError::DecodeError {
        what: "CodeGeneratorRequest",
        source,
    })
}

/// Encodes and writes a response.
///
/// ## Errors
///
/// `GeneratorError::Io` if writing fails.
pub fn write_response(
    mut writer: impl Write,
    response: &CodeGeneratorResponse,
) -> Result<(), GeneratorError> {
    writer.write_all(&response.encode_to_vec())?;
    writer.flush()?;
    Ok(())
}

/// Formats the compiler version the way file headers show it
/// (`v3.21.12`, `v25.0-rc1`).
///
/// ## Examples
///
/// ```
/// use prost_types::compiler::Version;
/// use stubgen_gen::plugin::format_compiler_version;
///
/// let version = Version {
///     major: Some(4),
///     minor: Some(25),
///     patch: Some(1),
///     suffix: Some("rc2".to_string()),
/// };
/// assert_eq!(format_compiler_version(&version), "v4.25.1-rc2");
/// ```
pub fn format_compiler_version(version: &Version) -> String {
    let suffix = match version.suffix() {
        "" => String::new(),
        s => format!("-{}", s),
    };
    format!(
        "v{}.{}.{}{}",
        version.major(),
        version.minor(),
        version.patch(),
        suffix
    )
}

/// Runs generation for a request, always producing a response.
pub fn generate_response(
    request: &CodeGeneratorRequest,
    sink: &dyn DiagnosticSink,
) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };

    match generate_files(request, sink) {
        Ok(files) => response.file = files,
        Err(e) => {
            error!("generation failed: {}", e);
            response.error = Some(e.to_string());
        }
    }
    response
}

fn generate_files(
    request: &CodeGeneratorRequest,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<File>, GeneratorError> {
    let options = GeneratorOptions::from_parameter(request.parameter.as_deref())?
        .with_compiler_version(request.compiler_version.as_ref().map(format_compiler_version));
    debug!(
        files = request.file_to_generate.len(),
        proto_root = %options.proto_root,
        "plugin request"
    );

    let units = compilation_units(&request.proto_file, &request.file_to_generate);
    let artifacts = generate_all(&units, &options, sink)?;
    artifacts.iter().map(response_file).collect()
}

fn response_file(artifact: &GeneratedArtifact) -> Result<File, GeneratorError> {
    let annotation = artifact
        .annotations
        .iter()
        .map(|a| {
            Ok(generated_code_info::Annotation {
                path: a.path.clone(),
                source_file: Some(a.source_file.clone()),
                begin: Some(offset(a.begin, artifact)?),
                end: Some(offset(a.end, artifact)?),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    Ok(File {
        name: Some(artifact.file_name.clone()),
        content: Some(artifact.content.clone()),
        generated_code_info: Some(GeneratedCodeInfo { annotation }),
        ..Default::default()
    })
}

fn offset(value: usize, artifact: &GeneratedArtifact) -> Result<i32, GeneratorError> {
    i32::try_from(value).map_err(|_| {
        GeneratorError::CodeGenError(format!(
            "{} is too large for annotation offsets",
            artifact.file_name
        ))
    })
}
