//! Tests that drive the two binaries the way users do.
//!
//! `protoc-gen-grpc-client` gets a serialized request on stdin; `stubgen`
//! gets a JSON model and an output directory.

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use prost::Message;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::{
    DescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto,
};
use stubgen_define::{CompilationUnit, MethodDescriptor, MethodKind, ServiceDescriptor, TypeRef};
use tempfile::TempDir;

fn echo_file() -> FileDescriptorProto {
    let method = |name: &str, server_streaming: bool| MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(".echo.EchoRequest".to_string()),
        output_type: Some(".echo.EchoResponse".to_string()),
        server_streaming: Some(server_streaming),
        ..Default::default()
    };
    let message = |name: &str| DescriptorProto {
        name: Some(name.to_string()),
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("echo.proto".to_string()),
        package: Some("echo".to_string()),
        message_type: vec![message("EchoRequest"), message("EchoResponse")],
        service: vec![ServiceDescriptorProto {
            name: Some("Echo".to_string()),
            method: vec![method("Say", false), method("Listen", true)],
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn run_plugin(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let mut child = Command::new(env!("CARGO_BIN_EXE_protoc-gen-grpc-client"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("plugin starts");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(&request.encode_to_vec())
        .expect("request is written");
    let output = child.wait_with_output().expect("plugin exits");
    assert!(
        output.status.success(),
        "plugin failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    CodeGeneratorResponse::decode(output.stdout.as_slice()).expect("response decodes")
}

#[test]
fn plugin_answers_a_request_on_stdout() {
    let request = CodeGeneratorRequest {
        file_to_generate: vec!["echo.proto".to_string()],
        parameter: Some("proto_root=crate::pb".to_string()),
        proto_file: vec![echo_file()],
        ..Default::default()
    };

    let response = run_plugin(&request);
    assert_eq!(response.error, None);
    assert_eq!(response.file.len(), 1);

    let file = &response.file[0];
    assert_eq!(file.name(), "echo_grpc_client.rs");
    syn::parse_file(file.content()).expect("generated code parses");
    assert!(file.content().contains("pub fn say(&self"));
    assert!(!file.content().contains("pub fn listen("));
}

#[test]
fn plugin_reports_bad_parameters_in_the_response() {
    let request = CodeGeneratorRequest {
        file_to_generate: vec!["echo.proto".to_string()],
        parameter: Some("flavour=vanilla".to_string()),
        proto_file: vec![echo_file()],
        ..Default::default()
    };

    let response = run_plugin(&request);
    assert!(response.file.is_empty());
    assert!(response.error.unwrap().contains("flavour"));
}

#[test]
fn stubgen_writes_files_from_a_json_model() {
    let dir = TempDir::new().unwrap();
    let model_path = dir.path().join("model.json");
    let out_dir = dir.path().join("out");

    let say = MethodDescriptor::new(
        "Say",
        TypeRef::new("echo.v1", "EchoRequest"),
        TypeRef::new("echo.v1", "EchoResponse"),
    );
    let listen = say.clone().with_kind(MethodKind::ServerStreaming);
    let units = vec![
        CompilationUnit {
            source_path: "echo/v1/echo.proto".to_string(),
            output_prefix: "echo/v1/echo".to_string(),
            package: "echo.v1".to_string(),
            namespace: String::new(),
            deprecated: false,
            services: vec![ServiceDescriptor::new("Echo", vec![say, listen])],
        },
        CompilationUnit {
            source_path: "types.proto".to_string(),
            output_prefix: "types".to_string(),
            package: "echo.v1".to_string(),
            namespace: String::new(),
            deprecated: false,
            services: vec![],
        },
    ];
    fs::write(&model_path, serde_json::to_string_pretty(&units).unwrap()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_stubgen"))
        .arg("--input")
        .arg(&model_path)
        .arg("--output")
        .arg(&out_dir)
        .output()
        .expect("stubgen runs");
    assert!(
        output.status.success(),
        "stubgen failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let generated = fs::read_to_string(out_dir.join("echo/v1/echo_grpc_client.rs")).unwrap();
    assert!(generated.contains("pub mod echo_v1_grpc_client {"));
    assert!(!out_dir.join("types_grpc_client.rs").exists());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generation Summary"));
    assert!(stdout.contains("1 streaming methods skipped"));
}

#[test]
fn stubgen_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let model_path = dir.path().join("model.json");
    let out_dir = dir.path().join("out");

    let units = vec![CompilationUnit {
        source_path: "echo.proto".to_string(),
        output_prefix: "echo".to_string(),
        package: "echo".to_string(),
        namespace: "echo_grpc_client".to_string(),
        deprecated: false,
        services: vec![ServiceDescriptor::new("Echo", vec![])],
    }];
    fs::write(&model_path, serde_json::to_string(&units).unwrap()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_stubgen"))
        .args(["--dry-run", "--input"])
        .arg(&model_path)
        .arg("--output")
        .arg(&out_dir)
        .output()
        .expect("stubgen runs");
    assert!(output.status.success());
    assert!(!out_dir.exists());
    assert!(String::from_utf8_lossy(&output.stdout).contains("pub struct EchoServiceClient"));
}

#[test]
fn stubgen_rejects_an_invalid_proto_root() {
    let dir = TempDir::new().unwrap();
    let model_path = dir.path().join("model.json");
    fs::write(&model_path, "[]").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_stubgen"))
        .arg("--input")
        .arg(&model_path)
        .args(["--proto-root", "not a path"])
        .output()
        .expect("stubgen runs");
    assert!(!output.status.success());
}

#[test]
fn stubgen_reports_an_invalid_namespace_without_panicking() {
    let dir = TempDir::new().unwrap();
    let model_path = dir.path().join("model.json");

    let say = MethodDescriptor::new(
        "Say",
        TypeRef::new("echo", "EchoRequest"),
        TypeRef::new("echo", "EchoResponse"),
    );
    let units = vec![CompilationUnit {
        source_path: "echo.proto".to_string(),
        output_prefix: "echo".to_string(),
        package: "echo".to_string(),
        namespace: "echo.v1".to_string(),
        deprecated: false,
        services: vec![ServiceDescriptor::new("Echo", vec![say])],
    }];
    fs::write(&model_path, serde_json::to_string(&units).unwrap()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_stubgen"))
        .args(["--dry-run", "--input"])
        .arg(&model_path)
        .output()
        .expect("stubgen runs");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(!stderr.contains("panicked"), "stubgen panicked: {}", stderr);
    assert!(stderr.contains("echo.v1"));
}
