//! Code generation modules for stubgen.
//!
//! This module contains generators that produce Rust source code from RPC
//! service descriptors. Each submodule handles one part of a generated
//! client file.
//!
//! ## Submodules
//!
//! - [`header`] - The provenance comment block at the top of every file
//! - [`shared`] - Items shared by all clients in a file (config, errors, connection)
//! - [`service`] - Per-service client struct with `new`, `init` and `close`
//! - [`method`] - Per-method call wrappers with a fixed deadline
//!
//! ## Code Generation Flow
//!
//! 1. Local item and prelude names are reserved in the [`ReferenceTable`]
//! 2. Shared items are generated once via [`generate_shared_items`]
//! 3. Each service is generated via [`generate_service`], which calls
//!    [`generate_method`] for every unary method in declaration order
//! 4. The reference table renders the `use` block for everything resolved
//!
//! ## Output Format
//!
//! Generators return `proc_macro2::TokenStream`; see [`crate::output`] for
//! validation, formatting and header assembly.

pub mod header;
pub mod method;
pub mod service;
pub mod shared;

pub use header::generate_header;
pub use method::generate_method;
pub use service::{ServiceOutput, generate_service};
pub use shared::{LOCAL_ITEMS, PRELUDE_NAMES, generate_shared_items};

use stubgen_define::TypeRef;

use crate::naming::{RustType, package_path, rust_type, stub_module, stub_type};
use crate::references::ReferenceTable;

/// Where one unit's generated stubs and messages live in the Rust module tree.
#[derive(Debug, Clone, Copy)]
pub struct CodegenContext<'a> {
    /// Root of the `prost`/`tonic` generated module tree.
    pub proto_root: &'a str,
    /// Package of the unit being generated.
    pub package: &'a str,
}

impl<'a> CodegenContext<'a> {
    pub fn new(proto_root: &'a str, package: &'a str) -> Self {
        Self {
            proto_root,
            package,
        }
    }

    /// Resolves the low-level `tonic` client stub of `service`.
    pub fn stub_alias(&self, service: &str, refs: &mut ReferenceTable) -> String {
        let namespace = format!(
            "{}::{}",
            package_path(self.proto_root, self.package),
            stub_module(service)
        );
        refs.resolve(&namespace, &stub_type(service))
    }

    /// Whether `ty` is spelled `()` in generated code.
    pub fn is_unit(&self, ty: &TypeRef) -> bool {
        rust_type(self.proto_root, ty) == RustType::Unit
    }

    /// Resolves a message type, returning its spelling in generated code.
    pub fn message_tokens(
        &self,
        ty: &TypeRef,
        refs: &mut ReferenceTable,
    ) -> proc_macro2::TokenStream {
        match rust_type(self.proto_root, ty) {
            RustType::Unit => quote::quote!(()),
            RustType::Path { namespace, symbol } => {
                let ident = refs.ident(&namespace, &symbol);
                quote::quote!(#ident)
            }
        }
    }
}
