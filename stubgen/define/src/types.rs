//! Core types for RPC service definitions.
//!
//! This module provides the descriptor model the generator reads:
//!
//! - [`CompilationUnit`] - One input file with its services and metadata
//! - [`ServiceDescriptor`] - A named RPC service and its methods
//! - [`MethodDescriptor`] - A single RPC method
//! - [`MethodKind`] - Unary or one of the streaming shapes
//! - [`TypeRef`] - Reference to a message type in some package
//! - [`SourceLocation`] - Where a declaration lives in its source file

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The call shape of an RPC method, derived from its two streaming flags.
///
/// ## Examples
///
/// ```
/// use stubgen_define::MethodKind;
///
/// assert_eq!(MethodKind::from_flags(false, false), MethodKind::Unary);
/// assert_eq!(MethodKind::from_flags(true, true), MethodKind::BidiStreaming);
/// assert_eq!(MethodKind::ClientStreaming.to_string(), "client-streaming");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MethodKind {
    /// One request, one response.
    Unary,
    /// The client sends a stream of requests.
    ClientStreaming,
    /// The server sends a stream of responses.
    ServerStreaming,
    /// Both sides stream.
    BidiStreaming,
}

impl MethodKind {
    /// Maps the `(client_streaming, server_streaming)` flag pair to a kind.
    pub fn from_flags(client_streaming: bool, server_streaming: bool) -> Self {
        match (client_streaming, server_streaming) {
            (false, false) => Self::Unary,
            (true, false) => Self::ClientStreaming,
            (false, true) => Self::ServerStreaming,
            (true, true) => Self::BidiStreaming,
        }
    }

    /// Returns `true` for every kind except [`MethodKind::Unary`].
    pub fn is_streaming(self) -> bool {
        self != Self::Unary
    }
}

/// Location of a declaration inside its source file.
///
/// `path` follows the descriptor path convention used by protobuf source
/// info: `[6, service_index]` for a service and
/// `[6, service_index, 2, method_index]` for a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path of the file that declares the item (e.g. `echo/v1/echo.proto`).
    pub source_file: String,
    /// Descriptor path of the declaration within that file.
    pub path: Vec<i32>,
}

impl SourceLocation {
    /// Location of the service at `service_index` in `source_file`.
    pub fn service(source_file: impl Into<String>, service_index: usize) -> Self {
        Self {
            source_file: source_file.into(),
            path: vec![6, service_index as i32],
        }
    }

    /// Location of a method at `method_index` within a service.
    pub fn method(
        source_file: impl Into<String>,
        service_index: usize,
        method_index: usize,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            path: vec![6, service_index as i32, 2, method_index as i32],
        }
    }
}

/// Reference to a message type.
///
/// A type is identified by the package that declares it plus the chain of
/// message names leading to it. Nested messages have more than one element
/// in `path` (e.g. `Outer.Inner` is `["Outer", "Inner"]`).
///
/// ## Examples
///
/// ```
/// use stubgen_define::TypeRef;
///
/// let ty = TypeRef::new("echo.v1", "EchoRequest");
/// assert_eq!(ty.name(), "EchoRequest");
/// assert_eq!(ty.full_name(), ".echo.v1.EchoRequest");
///
/// let nested = TypeRef::nested("echo.v1", ["Envelope", "Header"]);
/// assert_eq!(nested.to_string(), ".echo.v1.Envelope.Header");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Dotted package name, empty for the root package.
    #[serde(default)]
    pub package: String,
    /// Message names from the outermost enclosing message to the type itself.
    pub path: Vec<String>,
}

impl TypeRef {
    /// A top-level message in `package`.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            path: vec![name.into()],
        }
    }

    /// A message nested inside one or more enclosing messages.
    pub fn nested<I, S>(package: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            package: package.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// The unqualified message name.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Names of the messages enclosing this one, outermost first.
    pub fn parents(&self) -> &[String] {
        match self.path.split_last() {
            Some((_, parents)) => parents,
            None => &[],
        }
    }

    /// Fully-qualified name with a leading dot, as protobuf writes it.
    pub fn full_name(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push('.');
            out.push_str(&self.package);
        }
        for segment in &self.path {
            out.push('.');
            out.push_str(segment);
        }
        out
    }

    /// Whether the type belongs to the `google.protobuf` well-known types.
    pub fn is_well_known(&self) -> bool {
        self.package == "google.protobuf"
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// A single RPC method.
///
/// ## Examples
///
/// ```
/// use stubgen_define::{MethodDescriptor, MethodKind, TypeRef};
///
/// let say = MethodDescriptor::new(
///     "Say",
///     TypeRef::new("echo", "EchoRequest"),
///     TypeRef::new("echo", "EchoResponse"),
/// );
/// assert_eq!(say.kind(), MethodKind::Unary);
///
/// let upload = say.clone().with_kind(MethodKind::ClientStreaming);
/// assert!(upload.is_streaming());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name as declared (e.g. `SayHello`).
    pub name: String,
    /// Request message type.
    pub input: TypeRef,
    /// Response message type.
    pub output: TypeRef,
    /// The client sends a stream of messages.
    #[serde(default)]
    pub client_streaming: bool,
    /// The server sends a stream of messages.
    #[serde(default)]
    pub server_streaming: bool,
    /// Marked `deprecated = true` in the method options.
    #[serde(default)]
    pub deprecated: bool,
    /// Comment text directly above the declaration, without comment markers.
    ///
    /// Lines keep their leading space, matching protobuf source info.
    #[serde(default)]
    pub leading_comments: Option<String>,
    /// Declaration location, used for source-mapping annotations.
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl MethodDescriptor {
    /// A non-deprecated unary method with no comments or location.
    pub fn new(name: impl Into<String>, input: TypeRef, output: TypeRef) -> Self {
        Self {
            name: name.into(),
            input,
            output,
            client_streaming: false,
            server_streaming: false,
            deprecated: false,
            leading_comments: None,
            location: None,
        }
    }

    /// Sets both streaming flags from `kind`.
    pub fn with_kind(mut self, kind: MethodKind) -> Self {
        self.client_streaming =
            matches!(kind, MethodKind::ClientStreaming | MethodKind::BidiStreaming);
        self.server_streaming =
            matches!(kind, MethodKind::ServerStreaming | MethodKind::BidiStreaming);
        self
    }

    /// The call shape implied by the streaming flags.
    pub fn kind(&self) -> MethodKind {
        MethodKind::from_flags(self.client_streaming, self.server_streaming)
    }

    /// `true` if either side streams.
    pub fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

/// A named RPC service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Service name as declared (e.g. `Echo`).
    pub name: String,
    /// Methods in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    /// Marked `deprecated = true` in the service options.
    #[serde(default)]
    pub deprecated: bool,
    /// Declaration location, used for source-mapping annotations.
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl ServiceDescriptor {
    /// A non-deprecated service with the given methods.
    pub fn new(name: impl Into<String>, methods: Vec<MethodDescriptor>) -> Self {
        Self {
            name: name.into(),
            methods,
            deprecated: false,
            location: None,
        }
    }
}

/// One input file handed to the generator.
///
/// Besides its services, a unit carries the metadata the generator needs
/// to name and label its output.
///
/// ## Examples
///
/// ```
/// use stubgen_define::{CompilationUnit, MethodDescriptor, ServiceDescriptor, TypeRef};
///
/// let unit = CompilationUnit {
///     source_path: "echo.proto".to_string(),
///     output_prefix: "echo".to_string(),
///     package: "echo".to_string(),
///     namespace: "echo_grpc_client".to_string(),
///     deprecated: false,
///     services: vec![ServiceDescriptor::new(
///         "Echo",
///         vec![MethodDescriptor::new(
///             "Say",
///             TypeRef::new("echo", "EchoRequest"),
///             TypeRef::new("echo", "EchoResponse"),
///         )],
///     )],
/// };
///
/// assert!(unit.has_services());
/// assert_eq!(unit.output_file_name(), "echo_grpc_client.rs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Path of the source file as the front-end reported it.
    pub source_path: String,
    /// Prefix for generated file names (the source path without extension).
    pub output_prefix: String,
    /// Dotted package the file declares.
    #[serde(default)]
    pub package: String,
    /// Identifier of the module the generated code is wrapped in.
    ///
    /// Empty means the generator derives one from the package.
    #[serde(default)]
    pub namespace: String,
    /// The whole file is marked deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Services in declaration order.
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
}

/// Suffix appended to a unit's output prefix to form the artifact file name.
pub const OUTPUT_FILE_SUFFIX: &str = "_grpc_client.rs";

impl CompilationUnit {
    /// Whether the unit declares at least one service.
    pub fn has_services(&self) -> bool {
        !self.services.is_empty()
    }

    /// File name of the artifact generated for this unit.
    pub fn output_file_name(&self) -> String {
        format!("{}{}", self.output_prefix, OUTPUT_FILE_SUFFIX)
    }
}
