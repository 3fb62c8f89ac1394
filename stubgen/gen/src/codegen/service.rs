//! Client struct and lifecycle generation.
//!
//! Every service becomes a `<Service>ServiceClient` struct holding the
//! loaded config and a [`ClientState`](super::shared) with the connection
//! and typed stub. `init` loads and dials at most once; `close` tears down
//! whatever exists and resets the struct so it can be initialized again.

use proc_macro2::TokenStream;
use quote::quote;
use stubgen_define::ServiceDescriptor;
use tracing::debug;

use super::CodegenContext;
use super::method::generate_method;
use super::shared::CALL_TIMEOUT_SECS;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::naming::{client_name, to_ident};
use crate::references::ReferenceTable;

/// Generated code for one service plus what happened to its methods.
#[derive(Debug)]
pub struct ServiceOutput {
    pub tokens: TokenStream,
    /// Wrappers emitted.
    pub generated: usize,
    /// Streaming methods left out.
    pub skipped: usize,
}

/// Generates the client block for `service`.
///
/// Unary methods get a wrapper each, in declaration order. Streaming
/// methods are reported to `sink` and skipped without affecting their
/// siblings.
pub fn generate_service(
    service: &ServiceDescriptor,
    ctx: CodegenContext<'_>,
    refs: &mut ReferenceTable,
    sink: &dyn DiagnosticSink,
) -> ServiceOutput {
    let name = client_name(&service.name);
    let client_ident = to_ident(&name);

    let info = refs.ident("tracing", "info");
    let error = refs.ident("tracing", "error");
    let mem = refs.ident("std", "mem");
    let channel = refs.ident("tonic::transport", "Channel");
    let stub_name = ctx.stub_alias(&service.name, refs);
    let stub = to_ident(&stub_name);

    let mut methods = Vec::new();
    let mut skipped = 0;
    for method in &service.methods {
        if method.is_streaming() {
            skipped += 1;
            sink.report(Diagnostic::StreamingMethodSkipped {
                service: service.name.clone(),
                method: method.name.clone(),
                kind: method.kind(),
            });
            continue;
        }
        methods.push(generate_method(method, &name, &stub_name, ctx, refs));
    }
    debug!(
        service = %service.name,
        generated = methods.len(),
        skipped,
        "generated service client"
    );

    let docs = service_docs(service, &name);
    let deprecation = service.deprecated.then(|| quote!(#[deprecated]));
    let allow_deprecated = (service.deprecated || service.methods.iter().any(|m| m.deprecated))
        .then(|| quote!(#[allow(deprecated)]));

    let conf_reused = format!("{}: conf already loaded. conf = {{:?}}", name);
    let conf_failed = format!("{}: ServiceConfig::load failed. err = {{}}", name);
    let conf_loaded = format!("{}: conf loaded. conf = {{:?}}", name);
    let conn_reused = format!("{}: conn already established. conn = {{:?}}", name);
    let dial_failed = format!("{}: dial failed. err = {{}}", name);
    let conn_ready = format!("{}: conn established. conn = {{:?}}", name);
    let closing = format!("{}: close. conf = {{:?}}", name);
    let no_conn = format!("{}: no conn to close", name);

    let generated = methods.len();
    let tokens = quote! {
        #(#[doc = #docs])*
        #deprecation
        #[derive(Debug, Default)]
        pub struct #client_ident {
            conf: Option<ServiceConfig>,
            state: ClientState<#stub<#channel>>,
        }

        #allow_deprecated
        impl #client_ident {
            /// Creates a client that is not connected yet.
            pub fn new() -> Self {
                Self::default()
            }

            /// Loads `config_section` from `config_file` and connects.
            ///
            /// Does nothing for parts that already succeeded: a loaded config is
            /// not reloaded and an established connection is not redialed.
            pub fn init(&mut self, config_file: &str, config_section: &str) -> Result<(), ClientError> {
                let conf = match self.conf.take() {
                    Some(conf) => {
                        #info!(#conf_reused, conf);
                        conf
                    }
                    None => {
                        let conf = ServiceConfig::load(config_file, config_section).map_err(|err| {
                            #error!(#conf_failed, err);
                            err
                        })?;
                        #info!(#conf_loaded, conf);
                        conf
                    }
                };
                let conf = self.conf.insert(conf);

                if let ClientState::Ready { conn, .. } = &self.state {
                    #info!(#conn_reused, conn);
                    return Ok(());
                }

                let conn = Connection::dial(conf).map_err(|err| {
                    #error!(#dial_failed, err);
                    err
                })?;
                #info!(#conn_ready, conn);
                let client = #stub::new(conn.channel.clone());
                self.state = ClientState::Ready { conn, client };
                Ok(())
            }

            /// Closes the connection, if any, and clears all state.
            ///
            /// The client can be initialized again afterwards.
            pub fn close(&mut self) -> Result<(), ClientError> {
                #info!(#closing, self.conf);
                match #mem::take(&mut self.state) {
                    ClientState::Ready { conn, client } => {
                        drop(client);
                        conn.close();
                    }
                    ClientState::Uninitialized => #info!(#no_conn),
                }
                self.conf = None;
                Ok(())
            }

            #(#methods)*
        }
    };

    ServiceOutput {
        tokens,
        generated,
        skipped,
    }
}

fn service_docs(service: &ServiceDescriptor, client: &str) -> Vec<String> {
    let mut docs = vec![
        format!(
            " `{}` is the synchronous client API for the `{}` service.",
            client, service.name
        ),
        String::new(),
        " Call `init` before issuing RPCs and `close` when done. Both take".to_string(),
        " `&mut self`; the RPC wrappers take `&self` and may run concurrently.".to_string(),
        format!(
            " Every RPC blocks the calling thread for at most `CALL_TIMEOUT` ({} seconds)",
            CALL_TIMEOUT_SECS
        ),
        " and cannot be cancelled by the caller. Do not call from inside an async runtime."
            .to_string(),
    ];
    if service.deprecated {
        docs.push(String::new());
        docs.push(" Deprecated: Do not use.".to_string());
    }
    docs
}
