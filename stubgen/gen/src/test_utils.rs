//! Shared test utilities for stubgen-gen tests.
//!
//! Fixtures for the descriptor model and for the `protoc` descriptors the
//! front-end consumes, so unit tests across modules build the same inputs.

use prost_types::{
    DescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto,
};
use stubgen_define::{CompilationUnit, MethodDescriptor, ServiceDescriptor, TypeRef};

/// A unary method named `name`.
pub fn unary(name: &str, input: TypeRef, output: TypeRef) -> MethodDescriptor {
    MethodDescriptor::new(name, input, output)
}

/// `Say(EchoRequest) -> EchoResponse` in package `echo`.
pub fn say_method() -> MethodDescriptor {
    unary(
        "Say",
        TypeRef::new("echo", "EchoRequest"),
        TypeRef::new("echo", "EchoResponse"),
    )
}

/// Service `Echo` with the given methods.
pub fn echo_service(methods: Vec<MethodDescriptor>) -> ServiceDescriptor {
    ServiceDescriptor::new("Echo", methods)
}

/// `echo.proto` in package `echo` with the given services.
pub fn unit_with(services: Vec<ServiceDescriptor>) -> CompilationUnit {
    CompilationUnit {
        source_path: "echo.proto".to_string(),
        output_prefix: "echo".to_string(),
        package: "echo".to_string(),
        namespace: "echo_grpc_client".to_string(),
        deprecated: false,
        services,
    }
}

/// `echo.proto` declaring `Echo` with one unary `Say` method.
pub fn echo_unit() -> CompilationUnit {
    unit_with(vec![echo_service(vec![say_method()])])
}

/// A message descriptor with no fields.
pub fn message(name: &str, nested: Vec<DescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        nested_type: nested,
        ..Default::default()
    }
}

/// A method descriptor as `protoc` would send it.
pub fn method_proto(
    name: &str,
    input: &str,
    output: &str,
    client_streaming: bool,
    server_streaming: bool,
) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(input.to_string()),
        output_type: Some(output.to_string()),
        client_streaming: Some(client_streaming),
        server_streaming: Some(server_streaming),
        ..Default::default()
    }
}

/// `echo.proto`: package `echo`, messages `EchoRequest` and `EchoResponse`,
/// service `Echo` with unary `Say` and server-streaming `Listen`.
pub fn echo_file_proto() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("echo.proto".to_string()),
        package: Some("echo".to_string()),
        message_type: vec![message("EchoRequest", vec![]), message("EchoResponse", vec![])],
        service: vec![ServiceDescriptorProto {
            name: Some("Echo".to_string()),
            method: vec![
                method_proto("Say", ".echo.EchoRequest", ".echo.EchoResponse", false, false),
                method_proto("Listen", ".echo.EchoRequest", ".echo.EchoResponse", false, true),
            ],
            ..Default::default()
        }],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// Parses generated output, panicking with the source on failure.
pub fn parse_generated(content: &str) -> syn::File {
    match syn::parse_file(content) {
        Ok(file) => file,
        Err(e) => panic!("generated code does not parse: {}\n{}", e, content),
    }
}
