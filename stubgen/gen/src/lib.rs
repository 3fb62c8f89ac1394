//! Stubgen code generator library.
//!
//! This crate generates synchronous Rust client wrappers for gRPC services
//! described with `stubgen-define`. For each input file that declares at
//! least one service it emits one Rust file containing:
//!
//! - A `ServiceConfig` read from a section of a TOML file (`ip`, `port`)
//! - A `ClientError` type for config and connection failures
//! - Per service, a `<Service>ServiceClient` with `new()`, `init()` and `close()`
//! - Per unary method, a blocking wrapper bounded by a 10 second deadline
//!
//! Streaming methods are skipped and reported through a
//! [`DiagnosticSink`](diagnostics::DiagnosticSink).
//!
//! ## Modules
//!
//! - [`codegen`] - Code generation for individual components (shared items, services, methods)
//! - [`output`] - Final assembly, validation, annotations and file writing
//! - [`references`] - Per-file table of imported symbols and their aliases
//! - [`naming`] - Rust names for services, methods, stubs and messages
//! - [`diagnostics`] - Reports about skipped streaming methods
//! - [`frontend`] - `protoc` descriptors to descriptor model
//! - [`plugin`] - The `protoc` plugin request/response protocol
//! - [`options`] - Generator options and plugin parameter parsing
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```
//! use stubgen_define::prelude::*;
//! use stubgen_gen::diagnostics::CollectingSink;
//! use stubgen_gen::options::GeneratorOptions;
//! use stubgen_gen::output::generate_unit;
//!
//! let unit = CompilationUnit {
//!     source_path: "echo.proto".to_string(),
//!     output_prefix: "echo".to_string(),
//!     package: "echo".to_string(),
//!     namespace: "echo_grpc_client".to_string(),
//!     deprecated: false,
//!     services: vec![ServiceDescriptor::new(
//!         "Echo",
//!         vec![MethodDescriptor::new(
//!             "Say",
//!             TypeRef::new("echo", "EchoRequest"),
//!             TypeRef::new("echo", "EchoResponse"),
//!         )],
//!     )],
//! };
//!
//! let sink = CollectingSink::default();
//! let artifact = generate_unit(&unit, &GeneratorOptions::default(), &sink)
//!     .unwrap()
//!     .expect("unit has a service");
//! assert_eq!(artifact.file_name, "echo_grpc_client.rs");
//! assert!(artifact.content.contains("pub struct EchoServiceClient"));
//! ```
//!
//! ## Generated Code Structure
//!
//! For `service Echo { rpc Say(EchoRequest) returns (EchoResponse); }`:
//!
//! ```text
//! pub mod echo_grpc_client {
//!     use crate::echo::echo_client::EchoClient;
//!     // ...
//!
//!     pub const CALL_TIMEOUT: Duration = Duration::from_secs(10u64);
//!     pub struct ServiceConfig { pub ip: String, pub port: u16 }
//!     pub enum ClientError { ... }
//!
//!     pub struct EchoServiceClient { ... }
//!
//!     impl EchoServiceClient {
//!         pub fn new() -> Self;
//!         pub fn init(&mut self, config_file: &str, config_section: &str) -> Result<(), ClientError>;
//!         pub fn close(&mut self) -> Result<(), ClientError>;
//!         pub fn say(&self, req: EchoRequest) -> Result<EchoResponse, Status>;
//!     }
//! }
//! ```

pub mod codegen;
pub mod diagnostics;
pub mod errors;
pub mod frontend;
pub mod naming;
pub mod options;
pub mod output;
pub mod plugin;
pub mod references;

#[cfg(test)]
pub(crate) mod test_utils;
