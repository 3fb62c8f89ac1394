//! Output assembly and file writing for generated code.
//!
//! This module handles the final phase of code generation: assembling the
//! generated pieces of one compilation unit into a complete Rust file,
//! validating it, formatting it, locating source-mapping annotations and
//! writing it to disk atomically.
//!
//! ## Output Structure
//!
//! One file per compilation unit that declares at least one service:
//! ```text
//! <output>/
//! ├── echo_grpc_client.rs          # from echo.proto
//! └── admin/v1/admin_grpc_client.rs # from admin/v1/admin.proto
//! ```
//!
//! Each file holds the provenance header, then a single
//! `pub mod <namespace> { ... }` with the `use` block, the shared items and
//! one client block per service.
//!
//! ## Safety Guarantees
//!
//! - **Validation**: All generated code is validated with `syn` before writing
//! - **Formatting**: Output is formatted with `prettyplease` for consistent style
//! - **Determinism**: No timestamps or unordered maps reach the output
//! - **Atomic writes**: Uses temp file + rename pattern to prevent partial writes

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::TokenStream;
use quote::quote;
use stubgen_define::{CompilationUnit, SourceLocation};
use tracing::{debug, info};

use crate::codegen::{
    CodegenContext, LOCAL_ITEMS, PRELUDE_NAMES, generate_header, generate_service,
    generate_shared_items,
};
use crate::diagnostics::DiagnosticSink;
use crate::errors::GeneratorError;
use crate::naming::{
    client_name, default_namespace, is_valid_ident, message_name, method_name, sanitize,
    stub_module, stub_type, to_ident, wrapper_name,
};
use crate::options::GeneratorOptions;
use crate::references::{Reference, ReferenceTable};

/// Maps a generated identifier back to the declaration it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// `EchoServiceClient` or `EchoServiceClient.say`.
    pub symbol: String,
    pub source_file: String,
    /// Descriptor path of the declaration (`[6, s]` or `[6, s, 2, m]`).
    pub path: Vec<i32>,
    /// Byte offset of the identifier in the artifact content.
    pub begin: usize,
    /// Byte offset one past the identifier.
    pub end: usize,
}

/// One finished output file.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    /// Path relative to the output directory.
    pub file_name: String,
    pub source_path: String,
    pub content: String,
    /// External symbols the file imports, in first-use order.
    pub references: Vec<Reference>,
    pub annotations: Vec<Annotation>,
    pub methods_generated: usize,
    pub methods_skipped: usize,
}

/// Returns the module name a unit's code is wrapped in.
///
/// Uses `unit.namespace` when set, otherwise derives it from the package or
/// the file name.
pub fn unit_namespace(unit: &CompilationUnit) -> String {
    if unit.namespace.is_empty() {
        default_namespace(&unit.package, &unit.output_prefix)
    } else {
        sanitize(&unit.namespace)
    }
}

/// Assembles the module code for a unit.
///
/// The `use` block is rendered last, after every service and method has
/// resolved what it needs, and placed first in the module.
///
/// ## Returns
///
/// The tokens plus the number of wrappers generated and streaming methods
/// skipped.
pub fn assemble_unit_module(
    unit: &CompilationUnit,
    options: &GeneratorOptions,
    refs: &mut ReferenceTable,
    sink: &dyn DiagnosticSink,
) -> (TokenStream, usize, usize) {
    for name in LOCAL_ITEMS.iter().chain(PRELUDE_NAMES) {
        refs.reserve(*name);
    }
    for service in &unit.services {
        refs.reserve(client_name(&service.name));
    }

    let ctx = CodegenContext::new(&options.proto_root, &unit.package);
    let shared = generate_shared_items(refs);

    let mut generated = 0;
    let mut skipped = 0;
    let services: Vec<TokenStream> = unit
        .services
        .iter()
        .map(|service| {
            let out = generate_service(service, ctx, refs, sink);
            generated += out.generated;
            skipped += out.skipped;
            out.tokens
        })
        .collect();

    let namespace = to_ident(&unit_namespace(unit));
    let uses = refs.use_declarations();

    let tokens = quote! {
        pub mod #namespace {
            #![allow(clippy::result_large_err)]

            #uses

            #shared

            #(#services)*
        }
    };
    (tokens, generated, skipped)
}

/// Generates the artifact for one unit.
///
/// Returns `Ok(None)` for a unit without services; nothing is reported in
/// that case.
///
/// ## Errors
///
/// Returns `GeneratorError::InvalidName` or `GeneratorError::NameClash`
/// when the unit's names cannot be turned into distinct Rust items (see
/// [`check_unit_names`]), and `GeneratorError::CodeGenError` if the
/// assembled code does not parse, which indicates a generator bug.
pub fn generate_unit(
    unit: &CompilationUnit,
    options: &GeneratorOptions,
    sink: &dyn DiagnosticSink,
) -> Result<Option<GeneratedArtifact>, GeneratorError> {
    if !unit.has_services() {
        debug!(source = %unit.source_path, "no services, skipping");
        return Ok(None);
    }

    check_unit_names(unit)?;

    let mut refs = ReferenceTable::new();
    let (tokens, methods_generated, methods_skipped) =
        assemble_unit_module(unit, options, &mut refs, sink);

    let file = validate_code(&tokens)?;
    let header = generate_header(unit, options.compiler_version.as_deref());
    let content = format_code(&header, &file);
    let annotations = locate_annotations(&content, unit);

    info!(
        source = %unit.source_path,
        file = %unit.output_file_name(),
        methods_generated,
        methods_skipped,
        "generated client file"
    );

    Ok(Some(GeneratedArtifact {
        file_name: unit.output_file_name(),
        source_path: unit.source_path.clone(),
        content,
        references: refs.references().to_vec(),
        annotations,
        methods_generated,
        methods_skipped,
    }))
}

/// Generates artifacts for every unit that qualifies, in input order.
///
/// ## Errors
///
/// Stops at the first unit that fails; see [`generate_unit`].
pub fn generate_all(
    units: &[CompilationUnit],
    options: &GeneratorOptions,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<GeneratedArtifact>, GeneratorError> {
    let mut artifacts = Vec::new();
    for unit in units {
        if let Some(artifact) = generate_unit(unit, options, sink)? {
            artifacts.push(artifact);
        }
    }
    Ok(artifacts)
}

/// Checks that every name `unit` contributes to generated code is a Rust
/// identifier and that no two declarations generate the same item.
///
/// Descriptors from `protoc` always pass; hand-written JSON models may not.
///
/// ## Errors
///
/// Returns `GeneratorError::InvalidName` for the first name that is not an
/// identifier, and `GeneratorError::NameClash` when two services share a
/// client name or two unary methods of one service share a wrapper name.
pub fn check_unit_names(unit: &CompilationUnit) -> Result<(), GeneratorError> {
    let invalid = |what: &'static str, name: &str| GeneratorError::InvalidName {
        source_path: unit.source_path.clone(),
        what,
        name: name.to_string(),
    };
    let clash = |first: &str, second: &str, generated: &str| GeneratorError::NameClash {
        source_path: unit.source_path.clone(),
        first: first.to_string(),
        second: second.to_string(),
        generated: generated.to_string(),
    };

    if !is_valid_ident(&unit_namespace(unit)) {
        let name = if unit.namespace.is_empty() {
            &unit.package
        } else {
            &unit.namespace
        };
        return Err(invalid("namespace", name));
    }
    check_package(&unit.package, &invalid)?;

    let mut clients: BTreeMap<String, &str> = BTreeMap::new();
    for service in &unit.services {
        let client = client_name(&service.name);
        let derived = [
            client.clone(),
            stub_type(&service.name),
            stub_module(&service.name),
        ];
        if service.name.to_upper_camel_case().is_empty()
            || !derived.iter().all(|name| is_valid_ident(name))
        {
            return Err(invalid("service name", &service.name));
        }
        if let Some(first) = clients.insert(client.clone(), &service.name) {
            return Err(clash(first, &service.name, &client));
        }

        let mut wrappers: BTreeMap<String, &str> = BTreeMap::new();
        for method in service.methods.iter().filter(|m| !m.is_streaming()) {
            if !is_valid_ident(&method_name(&method.name)) {
                return Err(invalid("method name", &method.name));
            }
            for ty in [&method.input, &method.output] {
                check_package(&ty.package, &invalid)?;
                for part in ty.parents() {
                    if !is_valid_ident(&sanitize(&part.to_snake_case())) {
                        return Err(invalid("message name", &ty.full_name()));
                    }
                }
                if !is_valid_ident(&message_name(ty.name())) {
                    return Err(invalid("message name", &ty.full_name()));
                }
            }

            let wrapper = wrapper_name(&method.name);
            if let Some(first) = wrappers.insert(wrapper.clone(), &method.name) {
                return Err(clash(
                    &format!("{}.{}", service.name, first),
                    &format!("{}.{}", service.name, method.name),
                    &wrapper,
                ));
            }
        }
    }
    Ok(())
}

fn check_package(
    package: &str,
    invalid: &impl Fn(&'static str, &str) -> GeneratorError,
) -> Result<(), GeneratorError> {
    let valid = package
        .split('.')
        .filter(|s| !s.is_empty())
        .all(|segment| is_valid_ident(&sanitize(&segment.to_snake_case())));
    if valid {
        Ok(())
    } else {
        Err(invalid("package", package))
    }
}

/// Validates generated code using syn.
///
/// Parses the token stream as a complete Rust file to ensure it's syntactically
/// valid before writing to disk.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if the code fails to parse.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGenError(format!("Generated code is invalid: {}", e)))
}

/// Formats generated code using prettyplease and prepends `header`.
pub fn format_code(header: &str, file: &syn::File) -> String {
    let formatted = prettyplease::unparse(file);
    format!("{}{}", header, formatted)
}

/// Finds the client structs and wrappers of `unit` in `content`.
///
/// Declarations without a location are skipped.
fn locate_annotations(content: &str, unit: &CompilationUnit) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    let mut cursor = 0;

    for service in &unit.services {
        let client = to_ident(&client_name(&service.name)).to_string();
        let Some(struct_at) = find_ident(content, "pub struct ", &client, cursor) else {
            continue;
        };
        if let Some(location) = &service.location {
            annotations.push(annotation(client.clone(), location, struct_at, client.len()));
        }

        let Some(impl_at) = find_ident(content, "impl ", &client, struct_at) else {
            continue;
        };
        cursor = impl_at;

        for method in service.methods.iter().filter(|m| !m.is_streaming()) {
            let wrapper = to_ident(&wrapper_name(&method.name)).to_string();
            let Some(fn_at) = find_ident(content, "pub fn ", &wrapper, cursor) else {
                continue;
            };
            cursor = fn_at;
            if let Some(location) = &method.location {
                annotations.push(annotation(
                    format!("{}.{}", client, wrapper),
                    location,
                    fn_at,
                    wrapper.len(),
                ));
            }
        }
    }

    annotations
}

fn annotation(symbol: String, location: &SourceLocation, begin: usize, len: usize) -> Annotation {
    Annotation {
        symbol,
        source_file: location.source_file.clone(),
        path: location.path.clone(),
        begin,
        end: begin + len,
    }
}

/// Byte offset of `ident` in the first `prefix` + `ident` occurrence at or
/// after `from` that is not followed by another identifier character.
fn find_ident(content: &str, prefix: &str, ident: &str, from: usize) -> Option<usize> {
    let needle = format!("{}{}", prefix, ident);
    let mut start = from;
    while let Some(pos) = content.get(start..)?.find(&needle) {
        let at = start + pos;
        let end = at + needle.len();
        let boundary = content[end..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        if boundary {
            return Some(at + prefix.len());
        }
        start = end;
    }
    None
}

/// Writes content to a file atomically using temp file + rename.
///
/// This pattern ensures that:
/// - The file is never left in a partially-written state
/// - Other processes see either the old or new content, never a mix
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if:
/// - Parent directories cannot be created
/// - The temp file cannot be written
/// - The rename operation fails
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| GeneratorError::WriteError {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Writes every artifact below `output_dir`.
///
/// ## Returns
///
/// The paths written, in artifact order.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` for the first file that cannot be
/// written.
pub fn write_artifacts(
    artifacts: &[GeneratedArtifact],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, GeneratorError> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = output_dir.join(&artifact.file_name);
        write_atomic(&path, &artifact.content)?;
        debug!(path = %path.display(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}
