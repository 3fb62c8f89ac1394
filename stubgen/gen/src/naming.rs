//! Name derivation for generated items.
//!
//! Generated clients sit next to the code `tonic-build` and `prost-build`
//! emit, so every name that points into that code has to be derived the way
//! those tools derive it: `snake_case` modules and methods,
//! `UpperCamelCase` types, and keywords escaped as raw identifiers (or with
//! a trailing underscore where raw identifiers are not allowed).

use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use stubgen_define::TypeRef;

/// Suffix appended to a service name to form the wrapper struct name.
pub const CLIENT_SUFFIX: &str = "ServiceClient";

/// Suffix of the module wrapping each generated artifact.
pub const NAMESPACE_SUFFIX: &str = "_grpc_client";

const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

const UNDERSCORE_KEYWORDS: &[&str] = &["self", "super", "crate", "Self"];

/// Escapes `name` if it is a Rust keyword.
///
/// ## Examples
///
/// ```
/// use stubgen_gen::naming::sanitize;
///
/// assert_eq!(sanitize("type"), "r#type");
/// assert_eq!(sanitize("self"), "self_");
/// assert_eq!(sanitize("echo"), "echo");
/// ```
pub fn sanitize(name: &str) -> String {
    if RAW_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else if UNDERSCORE_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Builds an [`Ident`], honoring the `r#` prefix produced by [`sanitize`].
pub fn to_ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

/// Returns whether `name` can be passed to [`to_ident`].
///
/// ## Examples
///
/// ```
/// use stubgen_gen::naming::is_valid_ident;
///
/// assert!(is_valid_ident("echo_v1"));
/// assert!(is_valid_ident("r#match"));
/// assert!(!is_valid_ident("echo.v1"));
/// assert!(!is_valid_ident(""));
/// ```
pub fn is_valid_ident(name: &str) -> bool {
    syn::parse_str::<syn::Ident>(name).is_ok()
}

/// Turns a `::`-separated Rust path into tokens.
pub fn path_tokens(path: &str) -> TokenStream {
    let segments = path.split("::").filter(|s| !s.is_empty()).map(to_ident);
    let leading = if path.starts_with("::") {
        quote!(::)
    } else {
        TokenStream::new()
    };
    quote!(#leading #(#segments)::*)
}

/// Name of the generated wrapper struct for a service.
///
/// ## Examples
///
/// ```
/// use stubgen_gen::naming::client_name;
///
/// assert_eq!(client_name("Echo"), "EchoServiceClient");
/// assert_eq!(client_name("user_admin"), "UserAdminServiceClient");
/// ```
pub fn client_name(service: &str) -> String {
    format!("{}{}", service.to_upper_camel_case(), CLIENT_SUFFIX)
}

/// Name of the wrapper method for an RPC method, matching tonic's stub.
pub fn method_name(method: &str) -> String {
    sanitize(&method.to_snake_case())
}

/// Methods every generated client defines itself.
pub const LIFECYCLE_METHODS: &[&str] = &["new", "init", "close"];

/// Name of the generated wrapper for an RPC method.
///
/// Same as [`method_name`] unless that would clash with a lifecycle method,
/// in which case `_rpc` is appended.
///
/// ## Examples
///
/// ```
/// use stubgen_gen::naming::wrapper_name;
///
/// assert_eq!(wrapper_name("Say"), "say");
/// assert_eq!(wrapper_name("Close"), "close_rpc");
/// ```
pub fn wrapper_name(method: &str) -> String {
    let name = method_name(method);
    if LIFECYCLE_METHODS.contains(&name.as_str()) {
        format!("{}_rpc", name)
    } else {
        name
    }
}

/// Module `tonic-build` puts a service's client stub in.
pub fn stub_module(service: &str) -> String {
    sanitize(&format!("{}_client", service.to_snake_case()))
}

/// Type name `tonic-build` gives a service's client stub.
pub fn stub_type(service: &str) -> String {
    format!("{}Client", service.to_upper_camel_case())
}

/// Rust module path of a protobuf package below `root`.
///
/// ## Examples
///
/// ```
/// use stubgen_gen::naming::package_path;
///
/// assert_eq!(package_path("crate", "echo.v1"), "crate::echo::v1");
/// assert_eq!(package_path("crate::pb", ""), "crate::pb");
/// assert_eq!(package_path("crate", "my.type"), "crate::my::r#type");
/// ```
pub fn package_path(root: &str, package: &str) -> String {
    let mut path = root.to_string();
    for segment in package.split('.').filter(|s| !s.is_empty()) {
        path.push_str("::");
        path.push_str(&sanitize(&segment.to_snake_case()));
    }
    path
}

/// Rust type name prost gives a message.
pub fn message_name(message: &str) -> String {
    let name = message.to_upper_camel_case();
    if name == "Self" { format!("{}_", name) } else { name }
}

/// How a protobuf message type is spelled in generated Rust code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    /// `.google.protobuf.Empty`, which prost maps to `()`.
    Unit,
    /// A named type reachable as `namespace::symbol`.
    Path { namespace: String, symbol: String },
}

/// Maps a message reference to its Rust spelling.
///
/// Well-known types resolve to `prost_types`, everything else lives under
/// `root` in the module tree `prost-build` generates (nested messages go in
/// a `snake_case` module named after their parent).
///
/// ## Examples
///
/// ```
/// use stubgen_define::TypeRef;
/// use stubgen_gen::naming::{RustType, rust_type};
///
/// assert_eq!(
///     rust_type("crate", &TypeRef::nested("echo", ["Envelope", "Header"])),
///     RustType::Path {
///         namespace: "crate::echo::envelope".to_string(),
///         symbol: "Header".to_string(),
///     }
/// );
/// assert_eq!(
///     rust_type("crate", &TypeRef::new("google.protobuf", "Empty")),
///     RustType::Unit
/// );
/// ```
pub fn rust_type(root: &str, ty: &TypeRef) -> RustType {
    if ty.is_well_known() {
        if ty.name() == "Empty" && ty.parents().is_empty() {
            return RustType::Unit;
        }
        return RustType::Path {
            namespace: "prost_types".to_string(),
            symbol: message_name(ty.name()),
        };
    }

    let mut namespace = package_path(root, &ty.package);
    for parent in ty.parents() {
        namespace.push_str("::");
        namespace.push_str(&sanitize(&parent.to_snake_case()));
    }
    RustType::Path {
        namespace,
        symbol: message_name(ty.name()),
    }
}

/// Default module name for a unit's generated code.
///
/// Uses the package when there is one and the file stem otherwise.
///
/// ## Examples
///
/// ```
/// use stubgen_gen::naming::default_namespace;
///
/// assert_eq!(default_namespace("echo.v1", "echo/v1/echo"), "echo_v1_grpc_client");
/// assert_eq!(default_namespace("", "protos/health"), "health_grpc_client");
/// ```
pub fn default_namespace(package: &str, output_prefix: &str) -> String {
    let base = if package.is_empty() {
        output_prefix
            .rsplit('/')
            .next()
            .unwrap_or(output_prefix)
            .to_snake_case()
    } else {
        package
            .split('.')
            .map(|s| s.to_snake_case())
            .collect::<Vec<_>>()
            .join("_")
    };
    format!("{}{}", base, NAMESPACE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_match_tonic_snake_case() {
        assert_eq!(method_name("Say"), "say");
        assert_eq!(method_name("GetUserByID"), "get_user_by_id");
        assert_eq!(method_name("Match"), "r#match");
    }

    #[test]
    fn stub_names_follow_tonic_build() {
        assert_eq!(stub_module("Echo"), "echo_client");
        assert_eq!(stub_module("UserAdmin"), "user_admin_client");
        assert_eq!(stub_type("UserAdmin"), "UserAdminClient");
    }

    #[test]
    fn self_message_is_suffixed() {
        assert_eq!(message_name("Self"), "Self_");
        assert_eq!(message_name("HTTPRequest"), "HttpRequest");
    }

    #[test]
    fn raw_idents_round_trip_through_tokens() {
        let ident = to_ident(&sanitize("type"));
        assert_eq!(ident.to_string(), "r#type");
    }

    #[test]
    fn path_tokens_keep_leading_colons() {
        assert_eq!(path_tokens("::prost_types").to_string(), ":: prost_types");
        assert_eq!(
            path_tokens("crate::pb::r#type").to_string(),
            "crate :: pb :: r#type"
        );
    }

    #[test]
    fn other_well_known_types_come_from_prost_types() {
        assert_eq!(
            rust_type("crate", &TypeRef::new("google.protobuf", "Timestamp")),
            RustType::Path {
                namespace: "prost_types".to_string(),
                symbol: "Timestamp".to_string(),
            }
        );
    }

    #[test]
    fn root_package_types_sit_directly_under_root() {
        assert_eq!(
            rust_type("crate::pb", &TypeRef::new("", "Ping")),
            RustType::Path {
                namespace: "crate::pb".to_string(),
                symbol: "Ping".to_string(),
            }
        );
    }
}
