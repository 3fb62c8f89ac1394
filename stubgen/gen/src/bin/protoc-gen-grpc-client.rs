//! `protoc` plugin entry point.
//!
//! ```text
//! protoc --plugin=protoc-gen-grpc-client --grpc-client_out=src/gen \
//!     --grpc-client_opt=proto_root=crate::pb echo.proto
//! ```
//!
//! Logs go to stderr; stdout carries the plugin response. Set `RUST_LOG`
//! (default `warn`) to see more.

use std::io;

use stubgen_gen::diagnostics::TracingSink;
use stubgen_gen::errors::GeneratorError;
use stubgen_gen::plugin::{generate_response, read_request, write_response};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), GeneratorError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let request = read_request(io::stdin().lock())?;
    let response = generate_response(&request, &TracingSink);
    write_response(io::stdout().lock(), &response)
}
