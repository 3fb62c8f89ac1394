//! Conversion of `protoc` file descriptors into the descriptor model.
//!
//! `protoc` has already parsed and linked the `.proto` sources by the time
//! its descriptors reach us. This module only reshapes them: services and
//! methods keep declaration order, message references are split into
//! package and nesting path using an index of every known message, and
//! leading comments and declaration paths are carried over from
//! `SourceCodeInfo`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use prost::Message;
use prost_types::{DescriptorProto, FileDescriptorProto, FileDescriptorSet};
use stubgen_define::{
    CompilationUnit, MethodDescriptor, ServiceDescriptor, SourceLocation, TypeRef,
};
use tracing::{debug, trace, warn};

use crate::errors::GeneratorError;
use crate::naming::default_namespace;

/// Field number of `FileDescriptorProto.service`.
const FILE_SERVICE_FIELD: i32 = 6;
/// Field number of `ServiceDescriptorProto.method`.
const SERVICE_METHOD_FIELD: i32 = 2;

/// Every message known to a request, keyed by fully-qualified name
/// (`.pkg.Outer.Inner`).
#[derive(Debug, Default)]
pub struct TypeIndex {
    types: BTreeMap<String, TypeRef>,
}

impl TypeIndex {
    /// Indexes all messages, nested ones included, of `files`.
    pub fn from_files(files: &[FileDescriptorProto]) -> Self {
        let mut index = Self::default();
        for file in files {
            let package = file.package();
            for message in &file.message_type {
                index.insert(package, &[], message);
            }
        }
        debug!(types = index.len(), "indexed message types");
        index
    }

    fn insert(&mut self, package: &str, parents: &[String], message: &DescriptorProto) {
        let mut path = parents.to_vec();
        path.push(message.name().to_string());

        let ty = TypeRef::nested(package, path.iter().cloned());
        trace!(name = %ty.full_name(), "indexed message");
        self.types.insert(ty.full_name(), ty);

        for nested in &message.nested_type {
            self.insert(package, &path, nested);
        }
    }

    /// Looks up a fully-qualified type name as it appears in a method
    /// descriptor.
    ///
    /// Unknown names are split at the last dot: everything before it is
    /// taken as the package.
    ///
    /// ## Examples
    ///
    /// ```
    /// use stubgen_gen::frontend::TypeIndex;
    ///
    /// let index = TypeIndex::default();
    /// let ty = index.resolve(".google.protobuf.Empty");
    /// assert_eq!(ty.package, "google.protobuf");
    /// assert_eq!(ty.name(), "Empty");
    /// ```
    pub fn resolve(&self, full_name: &str) -> TypeRef {
        if let Some(ty) = self.types.get(full_name) {
            return ty.clone();
        }
        let name = full_name.trim_start_matches('.');
        match name.rsplit_once('.') {
            Some((package, symbol)) => TypeRef::new(package, symbol),
            None => TypeRef::new("", name),
        }
    }

    /// Number of indexed messages.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// `true` if no message is indexed.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Converts one file descriptor into a compilation unit.
pub fn compilation_unit(file: &FileDescriptorProto, index: &TypeIndex) -> CompilationUnit {
    let source_path = file.name().to_string();
    let output_prefix = source_path
        .strip_suffix(".proto")
        .unwrap_or(&source_path)
        .to_string();
    let package = file.package().to_string();
    let comments = leading_comments(file);

    let services = file
        .service
        .iter()
        .enumerate()
        .map(|(s, service)| {
            let methods = service
                .method
                .iter()
                .enumerate()
                .map(|(m, method)| {
                    let location = SourceLocation::method(&source_path, s, m);
                    let mut out = MethodDescriptor::new(
                        method.name(),
                        index.resolve(method.input_type()),
                        index.resolve(method.output_type()),
                    );
                    out.client_streaming = method.client_streaming();
                    out.server_streaming = method.server_streaming();
                    out.deprecated = method.options.as_ref().is_some_and(|o| o.deprecated());
                    out.leading_comments = comments.get(&location.path).cloned();
                    out.location = Some(location);
                    out
                })
                .collect();

            let mut out = ServiceDescriptor::new(service.name(), methods);
            out.deprecated = service.options.as_ref().is_some_and(|o| o.deprecated());
            out.location = Some(SourceLocation::service(&source_path, s));
            out
        })
        .collect();

    CompilationUnit {
        namespace: default_namespace(&package, &output_prefix),
        deprecated: file.options.as_ref().is_some_and(|o| o.deprecated()),
        source_path,
        output_prefix,
        package,
        services,
    }
}

/// Converts the files named in `targets`, in `targets` order, using every
/// file in `files` for type resolution.
///
/// An empty `targets` converts every file. Names that match no file are
/// ignored with a warning.
pub fn compilation_units(files: &[FileDescriptorProto], targets: &[String]) -> Vec<CompilationUnit> {
    let index = TypeIndex::from_files(files);
    if targets.is_empty() {
        return files.iter().map(|f| compilation_unit(f, &index)).collect();
    }

    targets
        .iter()
        .filter_map(|target| {
            let file = files.iter().find(|f| f.name() == target);
            if file.is_none() {
                warn!(file = %target, "file to generate not found in descriptor set");
            }
            file
        })
        .map(|f| compilation_unit(f, &index))
        .collect()
}

/// Reads a serialized `FileDescriptorSet` (`protoc --descriptor_set_out`).
///
/// ## Errors
///
/// `GeneratorError::Io` if the file cannot be read,
/// `GeneratorError::DecodeError` if it is not a descriptor set.
pub fn read_descriptor_set(path: &Path) -> Result<FileDescriptorSet, GeneratorError> {
    let bytes = fs::read(path)?;
    FileDescriptorSet::decode(bytes.as_slice()).map_err(|source| GeneratorError::DecodeError {
        what: "FileDescriptorSet",
        source,
    })
}

/// Reads compilation units from a JSON model file.
///
/// ## Errors
///
/// `GeneratorError::Io` if the file cannot be read,
/// `GeneratorError::ModelError` if it is not a JSON array of units.
pub fn read_model(path: &Path) -> Result<Vec<CompilationUnit>, GeneratorError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| GeneratorError::ModelError {
        path: path.display().to_string(),
        source,
    })
}

/// Loads compilation units from `path`.
///
/// Files ending in `.json` are read as a model via [`read_model`]; anything
/// else as a descriptor set. `targets` selects units by source path; empty
/// means all.
///
/// ## Errors
///
/// See [`read_model`] and [`read_descriptor_set`].
pub fn load_units(path: &Path, targets: &[String]) -> Result<Vec<CompilationUnit>, GeneratorError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let units = read_model(path)?;
        debug!(units = units.len(), path = %path.display(), "loaded JSON model");
        if targets.is_empty() {
            return Ok(units);
        }
        return Ok(targets
            .iter()
            .filter_map(|t| {
                let unit = units.iter().find(|u| &u.source_path == t).cloned();
                if unit.is_none() {
                    warn!(file = %t, "file to generate not found in model");
                }
                unit
            })
            .collect());
    }

    let set = read_descriptor_set(path)?;
    debug!(files = set.file.len(), path = %path.display(), "loaded descriptor set");
    Ok(compilation_units(&set.file, targets))
}

/// Leading comments of services and methods, keyed by descriptor path.
fn leading_comments(file: &FileDescriptorProto) -> BTreeMap<Vec<i32>, String> {
    let Some(info) = &file.source_code_info else {
        return BTreeMap::new();
    };
    info.location
        .iter()
        .filter(|loc| {
            loc.path.first() == Some(&FILE_SERVICE_FIELD)
                && (loc.path.len() == 2
                    || (loc.path.len() == 4 && loc.path[2] == SERVICE_METHOD_FIELD))
        })
        .filter_map(|loc| {
            loc.leading_comments
                .as_ref()
                .map(|comments| (loc.path.clone(), comments.clone()))
        })
        .collect()
}
