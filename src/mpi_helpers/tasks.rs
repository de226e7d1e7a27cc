//! The distribute / replicate / multiply / collect pipeline.
//!
//! Every rank drives the same [`Pipeline`]; each step consumes the previous
//! stage so the collectives can only run in their fixed global order.

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::error::Result;
use crate::matrix::{Matrix, multiply_row_block};
use crate::report::TimingReport;

use super::benchmark::{CommClock, format_time, time_operation};
use super::group::{ProcessGroup, role_of};
use super::load_balance::{Partition, RankInterval};
use super::Role;

pub struct Initialized;
pub struct Distributed;
pub struct Replicated;
pub struct Multiplied;
pub struct Collected;

/// Matrices and timestamps that only exist on the coordinator
struct Operands {
    a: Matrix,
    c: Matrix,
    started: Option<Instant>,
    elapsed: Duration,
}

/// What a rank holds once the run is over
#[derive(Debug)]
pub enum RunOutcome {
    Coordinator {
        report: TimingReport,
        result: Matrix,
    },
    Worker {
        rank: i32,
        rows: RankInterval,
        partial: Vec<f64>,
        communication: Duration,
    },
}

pub struct Pipeline<'g, G: ProcessGroup + ?Sized, S> {
    group: &'g G,
    partition: Partition,
    rank: i32,
    rows: RankInterval,
    clock: CommClock,
    operands: Option<Operands>,
    local_a: Vec<f64>,
    b: Vec<f64>,
    local_c: Vec<f64>,
    _stage: PhantomData<S>,
}

impl<'g, G: ProcessGroup + ?Sized, S> Pipeline<'g, G, S> {
    pub fn rank(&self) -> i32 {
        self.rank
    }

    pub fn role(&self) -> Role {
        if self.operands.is_some() {
            Role::Coordinator
        } else {
            Role::Worker
        }
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Rows of A and C owned by this rank
    pub fn rows(&self) -> RankInterval {
        self.rows
    }

    /// This rank's block of A; filled once the rows are distributed
    pub fn local_rows(&self) -> &[f64] {
        &self.local_a
    }

    /// Communication time accumulated so far on this rank
    pub fn communication(&self) -> Duration {
        self.clock.total()
    }

    fn advance<T>(self) -> Pipeline<'g, G, T> {
        Pipeline {
            group: self.group,
            partition: self.partition,
            rank: self.rank,
            rows: self.rows,
            clock: self.clock,
            operands: self.operands,
            local_a: self.local_a,
            b: self.b,
            local_c: self.local_c,
            _stage: PhantomData,
        }
    }
}

impl<'g, G: ProcessGroup + ?Sized> Pipeline<'g, G, Initialized> {
    /// Allocate local buffers; the coordinator also fills A and B.
    ///
    /// Fails before any communication when `dimension` is zero or not a
    /// multiple of the group size. All ranks see the same inputs, so they
    /// all fail together.
    pub fn new(group: &'g G, dimension: usize) -> Result<Self> {
        let partition = Partition::new(dimension, group.size() as usize)?;
        let rank = group.rank();
        let rows = partition.interval(rank);

        let (operands, b) = match role_of(group) {
            Role::Coordinator => {
                for (worker, interval) in partition.intervals().enumerate() {
                    trace!(
                        worker,
                        first_row = interval.start_index,
                        end_row = interval.end_index,
                        "row block assigned"
                    );
                }
                let operands = Operands {
                    a: Matrix::operand_a(dimension),
                    c: Matrix::zeros(dimension, dimension),
                    started: None,
                    elapsed: Duration::ZERO,
                };
                (Some(operands), Matrix::operand_b(dimension).data)
            }
            Role::Worker => (None, vec![0.0; partition.matrix_len()]),
        };

        info!(
            rank,
            dimension,
            workers = partition.workers(),
            rows_per_worker = partition.rows_per_worker(),
            "initialized"
        );

        Ok(Self {
            group,
            partition,
            rank,
            rows,
            clock: CommClock::new(rank),
            operands,
            local_a: vec![0.0; partition.block_len()],
            b,
            local_c: vec![0.0; partition.block_len()],
            _stage: PhantomData,
        })
    }

    /// Scatter A's row blocks; the coordinator's wall clock starts here.
    pub fn distribute_rows(mut self) -> Result<Pipeline<'g, G, Distributed>> {
        let group = self.group;
        let local_a = &mut self.local_a;
        debug_assert_eq!(local_a.len(), self.rows.get_count() * self.partition.dimension());

        match self.operands.as_mut() {
            Some(operands) => {
                operands.started = Some(Instant::now());
                let a = &operands.a.data;
                time_operation(&mut self.clock, "distribute_rows", local_a.len(), || {
                    group.scatter_from_root(a, local_a)
                })?;
            }
            None => {
                time_operation(&mut self.clock, "distribute_rows", local_a.len(), || {
                    group.scatter_into(local_a)
                })?;
            }
        }

        debug!(
            rank = self.rank,
            first_row = self.rows.start_index,
            end_row = self.rows.end_index,
            "rows received"
        );

        Ok(self.advance())
    }
}

impl<'g, G: ProcessGroup + ?Sized> Pipeline<'g, G, Distributed> {
    /// Broadcast the full B from the coordinator into every rank's buffer
    pub fn replicate_operand(mut self) -> Result<Pipeline<'g, G, Replicated>> {
        let group = self.group;
        let b = &mut self.b;
        time_operation(&mut self.clock, "replicate_operand", b.len(), || {
            group.broadcast(b)
        })?;

        Ok(self.advance())
    }
}

impl<'g, G: ProcessGroup + ?Sized> Pipeline<'g, G, Replicated> {
    /// Compute this rank's rows of C; no communication
    pub fn multiply_local(mut self) -> Result<Pipeline<'g, G, Multiplied>> {
        let n = self.partition.dimension();
        let start = Instant::now();
        multiply_row_block(&self.local_a, &self.b, n, n, &mut self.local_c)?;

        debug!(
            rank = self.rank,
            rows = self.rows.get_count(),
            elapsed = %format_time(start.elapsed().as_secs_f64()),
            "local multiply finished"
        );

        Ok(self.advance())
    }
}

impl<'g, G: ProcessGroup + ?Sized> Pipeline<'g, G, Multiplied> {
    /// Gather every rank's block of C into the coordinator's full result.
    /// The coordinator's wall clock stops here.
    pub fn collect_results(mut self) -> Result<Pipeline<'g, G, Collected>> {
        let group = self.group;
        let local_c = &self.local_c;

        match self.operands.as_mut() {
            Some(operands) => {
                let c = &mut operands.c.data;
                time_operation(&mut self.clock, "collect_results", local_c.len(), || {
                    group.gather_into_root(local_c, c)
                })?;
                operands.elapsed = operands
                    .started
                    .map(|started| started.elapsed())
                    .unwrap_or_default();
            }
            None => {
                time_operation(&mut self.clock, "collect_results", local_c.len(), || {
                    group.gather_from(local_c)
                })?;
            }
        }

        Ok(self.advance())
    }
}

impl<'g, G: ProcessGroup + ?Sized> Pipeline<'g, G, Collected> {
    /// Max-reduce communication time to the coordinator and hand back the
    /// rank's final state.
    pub fn finish(self) -> Result<RunOutcome> {
        let communication = self.clock.total();

        match self.operands {
            Some(operands) => {
                let slowest = self
                    .group
                    .reduce_max_into_root(communication.as_secs_f64())?;
                let report = TimingReport::new(operands.elapsed.as_secs_f64(), slowest);
                info!(
                    rank = self.rank,
                    execution = report.execution,
                    communication = report.communication,
                    "run complete"
                );
                Ok(RunOutcome::Coordinator {
                    report,
                    result: operands.c,
                })
            }
            None => {
                self.group.reduce_max(communication.as_secs_f64())?;
                debug!(rank = self.rank, "worker finished");
                Ok(RunOutcome::Worker {
                    rank: self.rank,
                    rows: self.rows,
                    partial: self.local_c,
                    communication,
                })
            }
        }
    }
}

/// Run the whole protocol on this rank
pub fn run_multiplication<G: ProcessGroup + ?Sized>(group: &G, dimension: usize) -> Result<RunOutcome> {
    Pipeline::new(group, dimension)?
        .distribute_rows()?
        .replicate_operand()?
        .multiply_local()?
        .collect_results()?
        .finish()
}
