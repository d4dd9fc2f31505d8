use std::env;
use std::path::PathBuf;

fn main() {
    // Only regenerate the header when the FFI surface changes.
    println!("cargo:rerun-if-changed=src/ffi.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let crate_dir = PathBuf::from(crate_dir);

    let output_file = crate_dir.join("include").join("receipt_forge.h");

    std::fs::create_dir_all(output_file.parent().expect("no parent for output_file"))
        .expect("failed to create include/ directory");

    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml"))
        .expect("failed to read cbindgen.toml");

    cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
        .expect("cbindgen failed to generate bindings")
        .write_to_file(&output_file);
}
