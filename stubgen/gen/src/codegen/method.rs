//! RPC call wrappers.
//!
//! Each unary method of a service becomes one blocking wrapper on the
//! generated client. The wrapper logs the request, runs the `tonic` stub call
//! on the client's runtime under [`CALL_TIMEOUT`](super::shared::CALL_TIMEOUT_SECS),
//! and hands back the response or the unmodified `tonic::Status`.

use proc_macro2::TokenStream;
use quote::quote;
use stubgen_define::MethodDescriptor;

use super::CodegenContext;
use super::shared::CALL_TIMEOUT_SECS;
use crate::naming::{method_name, to_ident, wrapper_name};
use crate::references::ReferenceTable;

/// Generates the wrapper for one unary method of `client_name`, calling
/// through the `tonic` stub named `stub_name` in the generated file.
///
/// The caller is responsible for only passing non-streaming methods.
/// Methods taking or returning `google.protobuf.Empty` use `()` directly.
///
/// ## Examples
///
/// ```
/// use stubgen_define::{MethodDescriptor, TypeRef};
/// use stubgen_gen::codegen::{CodegenContext, generate_method};
/// use stubgen_gen::references::ReferenceTable;
///
/// let say = MethodDescriptor::new(
///     "Say",
///     TypeRef::new("echo", "EchoRequest"),
///     TypeRef::new("echo", "EchoResponse"),
/// );
/// let mut refs = ReferenceTable::new();
/// let ctx = CodegenContext::new("crate", "echo");
/// let code = generate_method(&say, "EchoServiceClient", "EchoClient", ctx, &mut refs).to_string();
///
/// assert!(code.contains("pub fn say (& self , req : EchoRequest)"));
/// assert!(code.contains("client . say (request)"));
/// ```
pub fn generate_method(
    method: &MethodDescriptor,
    client_name: &str,
    stub_name: &str,
    ctx: CodegenContext<'_>,
    refs: &mut ReferenceTable,
) -> TokenStream {
    let wrapper = to_ident(&wrapper_name(&method.name));
    let stub_call = to_ident(&method_name(&method.name));

    let info = refs.ident("tracing", "info");
    let debug = refs.ident("tracing", "debug");
    let error = refs.ident("tracing", "error");
    let request = refs.ident("tonic", "Request");
    let status = refs.ident("tonic", "Status");
    let timeout = refs.ident("tokio::time", "timeout");
    let input = ctx.message_tokens(&method.input, refs);
    let output = ctx.message_tokens(&method.output, refs);

    let request_body = if ctx.is_unit(&method.input) {
        quote!(())
    } else {
        quote!(req.clone())
    };

    let docs = method_docs(method, stub_name);
    let deprecation = method.deprecated.then(|| quote!(#[deprecated]));

    let qualified = format!("{}.{}", client_name, wrapper);
    let request_log = format!("{}. req = {{:?}}", qualified);
    let response_log = format!("{}. resp = {{:?}}", qualified);
    let not_ready = format!("{} is not initialized, call init first", client_name);
    let deadline = format!("{} exceeded the {}s deadline", qualified, CALL_TIMEOUT_SECS);
    let failure_log = format!("client.{}() failed. req = {{:?}}, status = {{}}", stub_call);

    let on_response = if ctx.is_unit(&method.output) {
        let unit_log = format!("{}. resp = ()", qualified);
        quote! {
            Ok(_) => {
                #debug!(#unit_log);
                Ok(())
            }
        }
    } else {
        quote! {
            Ok(resp) => {
                let resp = resp.into_inner();
                #debug!(#response_log, resp);
                Ok(resp)
            }
        }
    };

    quote! {
        #(#[doc = #docs])*
        #deprecation
        pub fn #wrapper(&self, req: #input) -> Result<#output, #status> {
            #info!(#request_log, req);
            let ClientState::Ready { conn, client } = &self.state else {
                #error!(#not_ready);
                return Err(#status::failed_precondition(#not_ready));
            };

            let mut client = client.clone();
            let mut request = #request::new(#request_body);
            request.set_timeout(CALL_TIMEOUT);

            let result = conn.runtime.block_on(async move {
                match #timeout(CALL_TIMEOUT, client.#stub_call(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(#status::deadline_exceeded(#deadline)),
                }
            });

            match result {
                #on_response
                Err(status) => {
                    #error!(#failure_log, req, status);
                    Err(status)
                }
            }
        }
    }
}

/// Doc lines for a wrapper: the method's leading comments kept verbatim, or
/// a one-line summary when it has none.
fn method_docs(method: &MethodDescriptor, stub_name: &str) -> Vec<String> {
    let mut docs: Vec<String> = match method.leading_comments.as_deref() {
        Some(comments) if !comments.trim().is_empty() => comments
            .trim_end_matches('\n')
            .split('\n')
            .map(str::to_string)
            .collect(),
        _ => vec![format!(
            " Calls `{}` on the `{}` stub with a {} second deadline.",
            method.name, stub_name, CALL_TIMEOUT_SECS
        )],
    };
    if method.deprecated {
        docs.push(String::new());
        docs.push(" Deprecated: Do not use.".to_string());
    }
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{say_method, unary};
    use stubgen_define::TypeRef;

    fn render(method: &MethodDescriptor) -> (String, ReferenceTable) {
        let mut refs = ReferenceTable::new();
        let ctx = CodegenContext::new("crate", "echo");
        let code = generate_method(method, "EchoServiceClient", "EchoClient", ctx, &mut refs).to_string();
        (code, refs)
    }

    #[test]
    fn wrapper_is_bounded_by_the_call_timeout() {
        let (code, _) = render(&say_method());
        assert!(code.contains("request . set_timeout (CALL_TIMEOUT)"));
        assert!(code.contains("timeout (CALL_TIMEOUT , client . say (request))"));
        assert!(code.contains("deadline_exceeded"));
    }

    #[test]
    fn wrapper_refuses_to_run_before_init() {
        let (code, _) = render(&say_method());
        assert!(code.contains("let ClientState :: Ready { conn , client } = & self . state else"));
        assert!(code.contains("failed_precondition"));
    }

    #[test]
    fn failures_are_logged_with_request_and_returned_unchanged() {
        let (code, _) = render(&say_method());
        assert!(code.contains("\"client.say() failed. req = {:?}, status = {}\" , req , status"));
        assert!(code.contains("Err (status)"));
    }

    #[test]
    fn leading_comments_are_kept_verbatim() {
        let mut method = say_method();
        method.leading_comments = Some(" Say echoes the request.\n Twice.\n".to_string());
        let (code, _) = render(&method);
        assert!(code.contains("# [doc = \" Say echoes the request.\"]"));
        assert!(code.contains("# [doc = \" Twice.\"]"));
        assert!(!code.contains("stub with a 10 second deadline"));
    }

    #[test]
    fn deprecated_method_is_marked() {
        let mut method = say_method();
        method.deprecated = true;
        let (code, _) = render(&method);
        assert!(code.contains("# [deprecated]"));
        assert!(code.contains("Deprecated: Do not use."));
    }

    #[test]
    fn empty_maps_to_unit() {
        let ping = unary(
            "Ping",
            TypeRef::new("google.protobuf", "Empty"),
            TypeRef::new("google.protobuf", "Empty"),
        );
        let (code, refs) = render(&ping);
        assert!(code.contains("pub fn ping (& self , req : ()) -> Result < () , Status >"));
        assert!(refs.references().iter().all(|r| r.namespace != "prost_types"));
    }

    #[test]
    fn unit_messages_are_not_cloned_or_bound() {
        let ping = unary(
            "Ping",
            TypeRef::new("google.protobuf", "Empty"),
            TypeRef::new("google.protobuf", "Empty"),
        );
        let (code, _) = render(&ping);
        assert!(code.contains("Request :: new (())"));
        assert!(!code.contains("req . clone ()"));
        assert!(!code.contains("into_inner"));
        assert!(code.contains("Ok (_) => {"));
        assert!(code.contains("\"EchoServiceClient.ping. resp = ()\""));
    }

    #[test]
    fn only_the_unit_side_is_special_cased() {
        let log = unary(
            "Log",
            TypeRef::new("echo", "EchoRequest"),
            TypeRef::new("google.protobuf", "Empty"),
        );
        let (code, _) = render(&log);
        assert!(code.contains("Request :: new (req . clone ())"));
        assert!(!code.contains("into_inner"));

        let (code, _) = render(&say_method());
        assert!(code.contains("Request :: new (req . clone ())"));
        assert!(code.contains("let resp = resp . into_inner ()"));
    }

    #[test]
    fn default_docs_name_the_tonic_stub() {
        let (code, _) = render(&say_method());
        assert!(code.contains("Calls `Say` on the `EchoClient` stub with a 10 second deadline."));
        assert!(!code.contains("`EchoServiceClient` stub"));
    }

    #[test]
    fn lifecycle_names_are_not_shadowed() {
        let close = unary(
            "Close",
            TypeRef::new("echo", "EchoRequest"),
            TypeRef::new("echo", "EchoResponse"),
        );
        let (code, _) = render(&close);
        assert!(code.contains("pub fn close_rpc (& self"));
        assert!(code.contains("client . close (request)"));
    }

    #[test]
    fn message_named_like_a_tonic_type_gets_an_alias() {
        let method = unary(
            "Send",
            TypeRef::new("echo", "Request"),
            TypeRef::new("echo", "Status"),
        );
        let (code, mut refs) = render(&method);
        assert!(code.contains("req : Request1"));
        assert!(code.contains("Result < Status1 , Status >"));
        assert_eq!(refs.resolve("crate::echo", "Request"), "Request1");
    }
}
