//! Convenient re-exports for building descriptor models.
//!
//! ## Examples
//!
//! ```
//! use stubgen_define::prelude::*;
//!
//! let unit = CompilationUnit {
//!     source_path: "health.proto".to_string(),
//!     output_prefix: "health".to_string(),
//!     package: "health".to_string(),
//!     namespace: "health_grpc_client".to_string(),
//!     deprecated: false,
//!     services: vec![ServiceDescriptor::new("Health", vec![])],
//! };
//!
//! assert_eq!(unit.services.len(), 1);
//! ```

pub use crate::types::{
    CompilationUnit, MethodDescriptor, MethodKind, ServiceDescriptor, SourceLocation, TypeRef,
};
