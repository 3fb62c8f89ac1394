//! Items emitted once per generated file and shared by every client in it.
//!
//! A generated file holds one deadline constant, the config schema, the
//! client error type, the connection handle and the lifecycle state enum.
//! Every service block in the file refers to these same items, so the config
//! schema is identical for all services by construction.

use proc_macro2::TokenStream;
use quote::quote;

use crate::references::ReferenceTable;

/// Names of the items [`generate_shared_items`] defines.
///
/// These must be reserved in the reference table before anything is
/// resolved so imported symbols never shadow them.
pub const LOCAL_ITEMS: &[&str] = &[
    "CALL_TIMEOUT",
    "ServiceConfig",
    "ClientError",
    "Connection",
    "ClientState",
];

/// Prelude names generated code uses unqualified.
///
/// Reserved alongside [`LOCAL_ITEMS`] so a message called `Result` or
/// `Option` is imported under an alias instead of shadowing the prelude.
pub const PRELUDE_NAMES: &[&str] = &[
    "Option", "Some", "None", "Result", "Ok", "Err", "String", "Default", "Debug", "Clone",
    "PartialEq", "Eq", "Self", "drop", "format",
];

/// Deadline of every generated RPC wrapper, in seconds.
pub const CALL_TIMEOUT_SECS: u64 = 10;

/// Generates the shared items of one file.
///
/// Output is the same for every file apart from the aliases handed out by
/// `refs`.
pub fn generate_shared_items(refs: &mut ReferenceTable) -> TokenStream {
    let duration = refs.ident("std::time", "Duration");
    let read_to_string = refs.ident("std::fs", "read_to_string");
    let io = refs.ident("std", "io");
    let deserialize = refs.ident("serde", "Deserialize");
    let error_derive = refs.ident("thiserror", "Error");
    let table = refs.ident("toml", "Table");
    let de = refs.ident("toml", "de");
    let runtime = refs.ident("tokio::runtime", "Runtime");
    let builder = refs.ident("tokio::runtime", "Builder");
    let transport = refs.ident("tonic", "transport");
    let channel = refs.ident("tonic::transport", "Channel");
    let endpoint = refs.ident("tonic::transport", "Endpoint");
    let secs = CALL_TIMEOUT_SECS;

    quote! {
        /// Deadline applied to every RPC issued by the clients in this module.
        pub const CALL_TIMEOUT: #duration = #duration::from_secs(#secs);

        /// Connection settings read from one section of a TOML config file.
        ///
        /// The section holds two keys, `ip` and `port`:
        ///
        /// ```toml
        /// [echo]
        /// ip = "127.0.0.1"
        /// port = 50051
        /// ```
        #[derive(Debug, Clone, PartialEq, Eq, #deserialize)]
        pub struct ServiceConfig {
            pub ip: String,
            pub port: u16,
        }

        impl ServiceConfig {
            /// Reads the `section` table of the TOML file at `path`.
            pub fn load(path: &str, section: &str) -> Result<Self, ClientError> {
                let text = #read_to_string(path).map_err(|source| ClientError::ConfigRead {
                    path: path.to_string(),
                    source,
                })?;
                let mut doc: #table = text.parse().map_err(|source| ClientError::ConfigParse {
                    path: path.to_string(),
                    source,
                })?;
                let value = doc.remove(section).ok_or_else(|| ClientError::MissingSection {
                    path: path.to_string(),
                    section: section.to_string(),
                })?;
                value.try_into().map_err(|source| ClientError::ConfigParse {
                    path: path.to_string(),
                    source,
                })
            }

            /// URI the connection is dialed at.
            pub fn endpoint_uri(&self) -> String {
                format!("http://{}:{}", self.ip, self.port)
            }
        }

        /// Errors returned by `init` and `close`.
        #[derive(Debug, #error_derive)]
        pub enum ClientError {
            #[error("failed to read config file '{path}': {source}")]
            ConfigRead {
                path: String,
                #[source]
                source: #io::Error,
            },
            #[error("invalid config in '{path}': {source}")]
            ConfigParse {
                path: String,
                #[source]
                source: #de::Error,
            },
            #[error("config file '{path}' has no section '{section}'")]
            MissingSection { path: String, section: String },
            #[error("failed to start client runtime: {0}")]
            Runtime(#[source] #io::Error),
            #[error("failed to connect to '{uri}': {source}")]
            Connect {
                uri: String,
                #[source]
                source: #transport::Error,
            },
        }

        /// A dialed channel and the runtime that drives it.
        #[derive(Debug)]
        pub struct Connection {
            runtime: #runtime,
            channel: #channel,
        }

        impl Connection {
            /// Starts a runtime and connects to the configured endpoint.
            pub fn dial(conf: &ServiceConfig) -> Result<Self, ClientError> {
                let uri = conf.endpoint_uri();
                let runtime = #builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .map_err(ClientError::Runtime)?;
                let endpoint = #endpoint::from_shared(uri.clone())
                    .map_err(|source| ClientError::Connect {
                        uri: uri.clone(),
                        source,
                    })?
                    .connect_timeout(CALL_TIMEOUT);
                let channel = runtime
                    .block_on(endpoint.connect())
                    .map_err(|source| ClientError::Connect { uri, source })?;
                Ok(Self { runtime, channel })
            }

            /// Drops the channel and stops the runtime without waiting on in-flight work.
            pub fn close(self) {
                drop(self.channel);
                self.runtime.shutdown_background();
            }
        }

        /// Lifecycle of a generated client.
        #[derive(Debug, Default)]
        pub enum ClientState<C> {
            /// `init` has not succeeded yet, or `close` has run.
            #[default]
            Uninitialized,
            /// Connected, with `client` bound to `conn`.
            Ready { conn: Connection, client: C },
        }
    }
}
