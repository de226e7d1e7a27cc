//! Command-line and logging configuration.

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Distributed dense matrix multiplication with MPI collectives.
///
/// Launch with `mpirun -np <W> mpi-collective-matmul <n>`; `n` must be a
/// multiple of `W`.
#[derive(Debug, Parser)]
#[command(name = "mpi-collective-matmul")]
#[command(version)]
pub struct Cli {
    /// Dimension n of the square matrices.
    pub dimension: usize,
}

/// Log to stderr so stdout carries only the timing report.
/// Verbosity comes from `RUST_LOG`, defaulting to warnings.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
