use std::process::ExitCode;

use clap::Parser;
use mpi::traits::*;
use tracing::{error, trace};

use mpi_collective_matmul::config::{Cli, init_tracing};
use mpi_collective_matmul::{MatmulError, MpiGroup, RunOutcome, run_multiplication};

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let Some(universe) = mpi::initialize() else {
        error!("{}", MatmulError::MpiInit);
        return ExitCode::FAILURE;
    };
    let group = MpiGroup::new(universe.world());
    let rank = group.world().rank();

    match run_multiplication(&group, cli.dimension) {
        Ok(RunOutcome::Coordinator { report, result }) => {
            print!("{}", report);
            trace!(rank, "result matrix:\n{}", result);
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Worker { .. }) => ExitCode::SUCCESS,
        Err(e) => {
            error!(rank, "{}", e);
            // Peers may be blocked in a collective; take the whole job down.
            group.world().abort(1)
        }
    }
}
