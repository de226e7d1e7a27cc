use mpi::collective::SystemOperation;
use mpi::traits::*;

use crate::error::{MatmulError, Result};

use super::{ROOT, Role};

/// Synchronous collectives over a fixed group of ranks rooted at [`ROOT`].
///
/// Root-side and non-root-side halves of each collective are separate
/// methods; every rank must call its half for the operation to complete.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessGroup {
    fn rank(&self) -> i32;

    fn size(&self) -> i32;

    /// Root half of scatter: `send` is split into `size` equal chunks and
    /// chunk k goes to rank k; the root's own chunk lands in `recv`.
    fn scatter_from_root(&self, send: &[f64], recv: &mut [f64]) -> Result<()>;

    /// Non-root half of scatter.
    fn scatter_into(&self, recv: &mut [f64]) -> Result<()>;

    /// Overwrites `buffer` on every non-root rank with the root's contents.
    fn broadcast(&self, buffer: &mut [f64]) -> Result<()>;

    /// Root half of gather: chunk k of `recv` receives rank k's `send`.
    fn gather_into_root(&self, send: &[f64], recv: &mut [f64]) -> Result<()>;

    /// Non-root half of gather.
    fn gather_from(&self, send: &[f64]) -> Result<()>;

    /// Root half of a max-reduction; returns the maximum over all ranks.
    fn reduce_max_into_root(&self, value: f64) -> Result<f64>;

    /// Non-root half of a max-reduction.
    fn reduce_max(&self, value: f64) -> Result<()>;
}

pub fn role_of<G: ProcessGroup + ?Sized>(group: &G) -> Role {
    Role::from_rank(group.rank())
}

/// Check that a root-side buffer is exactly `size` times the per-rank chunk
pub fn check_root_buffer(root_len: usize, chunk_len: usize, size: i32) -> Result<()> {
    let expected = chunk_len * size as usize;
    if root_len != expected {
        return Err(MatmulError::BufferSize {
            expected,
            actual: root_len,
        });
    }
    Ok(())
}

/// [`ProcessGroup`] backed by an MPI communicator.
///
/// MPI errors are fatal by default (`MPI_ERRORS_ARE_FATAL`), so a transport
/// failure aborts the job before any of these methods can return.
pub struct MpiGroup<C: Communicator> {
    world: C,
}

impl<C: Communicator> MpiGroup<C> {
    pub fn new(world: C) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &C {
        &self.world
    }
}

impl<C: Communicator> ProcessGroup for MpiGroup<C> {
    fn rank(&self) -> i32 {
        self.world.rank()
    }

    fn size(&self) -> i32 {
        self.world.size()
    }

    fn scatter_from_root(&self, send: &[f64], recv: &mut [f64]) -> Result<()> {
        check_root_buffer(send.len(), recv.len(), self.size())?;
        self.world
            .process_at_rank(ROOT)
            .scatter_into_root(send, recv);
        Ok(())
    }

    fn scatter_into(&self, recv: &mut [f64]) -> Result<()> {
        self.world.process_at_rank(ROOT).scatter_into(recv);
        Ok(())
    }

    fn broadcast(&self, buffer: &mut [f64]) -> Result<()> {
        self.world.process_at_rank(ROOT).broadcast_into(buffer);
        Ok(())
    }

    fn gather_into_root(&self, send: &[f64], recv: &mut [f64]) -> Result<()> {
        check_root_buffer(recv.len(), send.len(), self.size())?;
        self.world
            .process_at_rank(ROOT)
            .gather_into_root(send, recv);
        Ok(())
    }

    fn gather_from(&self, send: &[f64]) -> Result<()> {
        self.world.process_at_rank(ROOT).gather_into(send);
        Ok(())
    }

    fn reduce_max_into_root(&self, value: f64) -> Result<f64> {
        let mut max = 0.0f64;
        self.world
            .process_at_rank(ROOT)
            .reduce_into_root(&value, &mut max, SystemOperation::max());
        Ok(max)
    }

    fn reduce_max(&self, value: f64) -> Result<()> {
        self.world
            .process_at_rank(ROOT)
            .reduce_into(&value, SystemOperation::max());
        Ok(())
    }
}
