use thiserror::Error;

use crate::diff::DiffOp;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("pipeline is already running")]
    AlreadyRunning,

    #[error("pipeline is not running or has shut down")]
    Closed,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatchError {
    #[error("operation #{index} {op:?} does not fit a list of {len} rows")]
    OutOfRange {
        index: usize,
        op: DiffOp,
        len: usize,
    },
}
