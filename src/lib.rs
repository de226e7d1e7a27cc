pub mod config;
pub mod error;
pub mod matrix;
pub mod mpi_helpers;
pub mod report;

pub use error::{MatmulError, Result};
pub use matrix::Matrix;
pub use mpi_helpers::group::{MpiGroup, ProcessGroup};
pub use mpi_helpers::tasks::{RunOutcome, run_multiplication};
pub use report::TimingReport;
