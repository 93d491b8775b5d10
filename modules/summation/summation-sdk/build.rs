fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/summation.proto");
    println!("cargo:rerun-if-changed=proto");

    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .file_descriptor_set_path(out_dir.join("summation_descriptor.bin"))
        .compile_protos(&["proto/summation.proto"], &["proto"])?;

    Ok(())
}
