//! Stubgen Definition Library
//!
//! This crate provides the descriptor model for RPC services. Front-ends
//! (the `protoc` adapter in `stubgen-gen`, or a hand-written JSON model)
//! produce these values; the `stubgen-gen` generator consumes them to emit
//! synchronous client wrappers.
//!
//! ## Core Types
//!
//! - [`CompilationUnit`] - One input file: services plus output metadata
//! - [`ServiceDescriptor`] - A named service with ordered methods
//! - [`MethodDescriptor`] - Method name, request/response types, flags
//! - [`MethodKind`] - Unary, client-, server- or bidi-streaming
//! - [`TypeRef`] - A message type reference (package + nesting path)
//! - [`SourceLocation`] - Descriptor path of a declaration
//!
//! The model is read-only to the generator and carries no behavior beyond
//! small derived properties (streaming detection, file naming).
//!
//! ## Examples
//!
//! ```
//! use stubgen_define::prelude::*;
//!
//! let echo = ServiceDescriptor::new(
//!     "Echo",
//!     vec![
//!         MethodDescriptor::new(
//!             "Say",
//!             TypeRef::new("echo", "EchoRequest"),
//!             TypeRef::new("echo", "EchoResponse"),
//!         ),
//!         MethodDescriptor::new(
//!             "Listen",
//!             TypeRef::new("echo", "EchoRequest"),
//!             TypeRef::new("echo", "EchoResponse"),
//!         )
//!         .with_kind(MethodKind::ServerStreaming),
//!     ],
//! );
//!
//! let unary: Vec<_> = echo.methods.iter().filter(|m| !m.is_streaming()).collect();
//! assert_eq!(unary.len(), 1);
//! ```

pub mod prelude;
pub mod types;

pub use types::{
    CompilationUnit, MethodDescriptor, MethodKind, OUTPUT_FILE_SUFFIX, ServiceDescriptor,
    SourceLocation, TypeRef,
};
