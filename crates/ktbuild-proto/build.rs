use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let proto_dir = manifest_dir.join("proto");

    // Proto files to compile
    let proto_files = [
        proto_dir.join("worker_protocol.proto"),
        proto_dir.join("deps.proto"),
    ];

    // Tell Cargo to rerun if proto files change
    for proto in &proto_files {
        println!("cargo:rerun-if-changed={}", proto.display());
    }

    prost_build::Config::new()
        .out_dir(manifest_dir.join("src/gen"))
        .compile_protos(&proto_files, &[proto_dir])?;

    Ok(())
}
