/// Errors raised while setting up or running a distributed multiplication
#[derive(Debug, thiserror::Error)]
pub enum MatmulError {
    #[error("matrix dimension {dimension} is not divisible by worker count {workers}")]
    UnevenPartition { dimension: usize, workers: usize },

    #[error("matrix dimension must be positive")]
    EmptyMatrix,

    #[error("buffer holds {actual} elements, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("{count} rows starting at row {start} exceed a matrix with {rows} rows")]
    RowRange {
        start: usize,
        count: usize,
        rows: usize,
    },

    #[error("invalid matrix shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("process group transport failure: {0}")]
    Transport(String),

    #[error("MPI initialization failed")]
    MpiInit,

    #[error("malformed timing report: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, MatmulError>;
