pub mod benchmark;
pub mod group;
pub mod load_balance;
pub mod tasks;

pub const ROOT: i32 = 0;

pub fn is_root(rank: i32) -> bool {
    ROOT == rank
}

/// Part a rank plays in the run, fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Rank 0: owns the full matrices, initializes and reports
    Coordinator,
    Worker,
}

impl Role {
    pub fn from_rank(rank: i32) -> Self {
        if is_root(rank) {
            Role::Coordinator
        } else {
            Role::Worker
        }
    }
}
