use std::ops::Mul;

use crate::error::{MatmulError, Result};

/// Half-open range of rows owned by one rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankInterval {
    pub start_index: usize,
    pub end_index: usize,
}

impl RankInterval {
    pub fn get_count(&self) -> usize {
        self.end_index - self.start_index
    }
}

/// Equal contiguous row blocks of an n x n matrix across `workers` ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    dimension: usize,
    workers: usize,
}

impl Partition {
    /// Rejects an empty matrix and any dimension the worker count does not divide
    pub fn new(dimension: usize, workers: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(MatmulError::EmptyMatrix);
        }
        if workers == 0 || dimension % workers != 0 {
            return Err(MatmulError::UnevenPartition { dimension, workers });
        }
        Ok(Self { dimension, workers })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn rows_per_worker(&self) -> usize {
        self.dimension / self.workers
    }

    /// Elements in one row block (n²/W)
    pub fn block_len(&self) -> usize {
        self.rows_per_worker() * self.dimension
    }

    /// Elements in a full matrix (n²)
    pub fn matrix_len(&self) -> usize {
        self.dimension * self.dimension
    }

    pub fn interval(&self, rank: i32) -> RankInterval {
        interval_by_rank(rank, self.rows_per_worker())
    }

    /// Every rank's interval, in rank order
    pub fn intervals(&self) -> impl Iterator<Item = RankInterval> + '_ {
        (0..self.workers as i32).map(move |rank| self.interval(rank))
    }
}

pub fn interval_by_rank(rank: i32, per_rank: usize) -> RankInterval {
    let start_index = per_rank.mul(rank as usize);

    RankInterval {
        start_index,
        end_index: start_index + per_rank,
    }
}
