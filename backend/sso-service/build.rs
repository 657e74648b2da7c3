// Build script for sso-service
// Compiles sso.proto for gRPC server and client code generation
fn main() {
    println!("cargo:rerun-if-changed=../proto/sso/sso.proto");

    // sso-service PROVIDES the Auth service (server implementation).
    // Client code is generated for the end-to-end tests.
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["../proto/sso/sso.proto"], &["../proto/sso"])
        .expect("Failed to compile sso.proto for sso-service");
}
