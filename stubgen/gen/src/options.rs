//! Generator configuration.
//!
//! Options reach the generator from two places: the comma-separated
//! parameter string `protoc` passes to plugins (`--grpc-client_opt=...`),
//! and the `stubgen` command-line flags. Both end up as a
//! [`GeneratorOptions`] value.

use crate::errors::GeneratorError;

/// Default Rust path under which the `tonic-build` output is mounted.
pub const DEFAULT_PROTO_ROOT: &str = "crate";

/// Settings shared by every artifact of one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Rust path of the module tree holding `prost`/`tonic` generated code.
    ///
    /// Package `echo.v1` is expected at `<proto_root>::echo::v1`.
    pub proto_root: String,
    /// Upstream compiler version for the file header (e.g. `v3.21.12`).
    ///
    /// `None` renders as `(unknown)`.
    pub compiler_version: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            proto_root: DEFAULT_PROTO_ROOT.to_string(),
            compiler_version: None,
        }
    }
}

impl GeneratorOptions {
    /// Parses a `protoc` plugin parameter string.
    ///
    /// Recognized keys: `proto_root`. Empty segments are ignored.
    ///
    /// ## Examples
    ///
    /// ```
    /// use stubgen_gen::options::GeneratorOptions;
    ///
    /// let opts = GeneratorOptions::from_parameter(Some("proto_root=crate::pb")).unwrap();
    /// assert_eq!(opts.proto_root, "crate::pb");
    ///
    /// let defaults = GeneratorOptions::from_parameter(None).unwrap();
    /// assert_eq!(defaults.proto_root, "crate");
    ///
    /// assert!(GeneratorOptions::from_parameter(Some("colour=blue")).is_err());
    /// ```
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` for unknown keys, segments
    /// without `=`, or an invalid `proto_root`.
    pub fn from_parameter(param: Option<&str>) -> Result<Self, GeneratorError> {
        let mut opts = Self::default();
        let Some(param) = param else {
            return Ok(opts);
        };

        for part in param.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = part.split_once('=') else {
                return Err(GeneratorError::ConfigError(format!(
                    "expected key=value in plugin parameter, got '{}'",
                    part
                )));
            };
            match key.trim() {
                "proto_root" => opts.proto_root = value.trim().to_string(),
                other => {
                    return Err(GeneratorError::ConfigError(format!(
                        "unknown plugin parameter '{}'",
                        other
                    )));
                }
            }
        }

        opts.validate()?;
        Ok(opts)
    }

    /// Replaces the proto root, validating it.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` if `root` is not a Rust path.
    pub fn with_proto_root(mut self, root: impl Into<String>) -> Result<Self, GeneratorError> {
        self.proto_root = root.into();
        self.validate()?;
        Ok(self)
    }

    /// Sets the compiler version shown in file headers.
    pub fn with_compiler_version(mut self, version: Option<String>) -> Self {
        self.compiler_version = version;
        self
    }

    /// Checks that `proto_root` parses as a plain Rust path.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` when it does not, or when it
    /// carries generic arguments.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        let path: syn::Path = syn::parse_str(&self.proto_root).map_err(|e| {
            GeneratorError::ConfigError(format!(
                "proto_root '{}' is not a Rust path: {}",
                self.proto_root, e
            ))
        })?;
        if path
            .segments
            .iter()
            .any(|s| !matches!(s.arguments, syn::PathArguments::None))
        {
            return Err(GeneratorError::ConfigError(format!(
                "proto_root '{}' must not have generic arguments",
                self.proto_root
            )));
        }
        Ok(())
    }
}
