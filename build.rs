use std::env;

fn main() {
    // A project-local MPI install (e.g. from a Python venv) takes precedence.
    if let Ok(current_dir) = env::current_dir() {
        let mpi_lib = current_dir.join(".venv").join("lib");
        if mpi_lib.is_dir() {
            println!("cargo:rustc-link-search=native={}", mpi_lib.display());
            println!("cargo:rustc-link-arg=-Wl,-rpath,{}", mpi_lib.display());
        }
    }

    // Force rebuild if the MPI compiler wrappers change
    println!("cargo:rerun-if-env-changed=MPICC");
    println!("cargo:rerun-if-env-changed=CC");
    println!("cargo:rerun-if-env-changed=CXX");
    println!("cargo:rerun-if-env-changed=OMPI_CC");
    println!("cargo:rerun-if-env-changed=OMPI_CXX");

    println!("cargo:rerun-if-changed=build.rs");
}
