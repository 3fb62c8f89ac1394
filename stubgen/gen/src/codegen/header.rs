//! Provenance header for generated files.

use stubgen_define::CompilationUnit;

/// Name the generator identifies itself with in file headers.
pub const GENERATOR_NAME: &str = "protoc-gen-grpc-client";

/// Version of the generator written into file headers.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder used when the upstream compiler did not report a version.
pub const UNKNOWN_VERSION: &str = "(unknown)";

/// Renders the comment block that opens every generated file.
///
/// The block is a pure function of `unit` and `compiler_version`: it
/// carries no timestamps, so reruns over the same input are byte-identical.
///
/// ## Examples
///
/// ```
/// use stubgen_define::CompilationUnit;
/// use stubgen_gen::codegen::generate_header;
///
/// let unit = CompilationUnit {
///     source_path: "echo.proto".to_string(),
///     output_prefix: "echo".to_string(),
///     package: "echo".to_string(),
///     namespace: "echo_grpc_client".to_string(),
///     deprecated: false,
///     services: vec![],
/// };
/// let header = generate_header(&unit, Some("v3.21.12"));
/// assert!(header.starts_with("// Code generated by protoc-gen-grpc-client. DO NOT EDIT."));
/// assert!(header.contains("// - protoc                 v3.21.12\n"));
/// assert!(header.contains("// source: echo.proto\n"));
/// ```
pub fn generate_header(unit: &CompilationUnit, compiler_version: Option<&str>) -> String {
    let width = GENERATOR_NAME.len();
    let mut lines = vec![
        format!("// Code generated by {}. DO NOT EDIT.", GENERATOR_NAME),
        "// versions:".to_string(),
        format!("// - {:<width$} v{}", GENERATOR_NAME, GENERATOR_VERSION),
        format!(
            "// - {:<width$} {}",
            "protoc",
            compiler_version.unwrap_or(UNKNOWN_VERSION)
        ),
    ];

    if unit.deprecated {
        lines.push(format!("// {} is a deprecated file.", unit.source_path));
    } else {
        lines.push(format!("// source: {}", unit.source_path));
    }

    let mut header = lines.join("\n");
    header.push_str("\n\n");
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::echo_unit;

    #[test]
    fn unknown_compiler_version_is_spelled_out() {
        let header = generate_header(&echo_unit(), None);
        assert!(header.contains("// - protoc                 (unknown)\n"));
    }

    #[test]
    fn generator_version_is_aligned_with_compiler_version() {
        let header = generate_header(&echo_unit(), Some("v25.1"));
        let expected = format!("// - protoc-gen-grpc-client v{}\n", GENERATOR_VERSION);
        assert!(header.contains(&expected));
    }

    #[test]
    fn deprecated_unit_replaces_source_line() {
        let mut unit = echo_unit();
        unit.deprecated = true;
        let header = generate_header(&unit, None);
        assert!(header.contains("// echo.proto is a deprecated file.\n"));
        assert!(!header.contains("// source:"));
    }

    #[test]
    fn header_ends_with_blank_line() {
        assert!(generate_header(&echo_unit(), None).ends_with("\n\n"));
    }
}
