//! Crate-level error type.
//!
//! Only the "invalid input" row of the error-handling table aborts a call;
//! every other failure mode (remote matrix errors, CP infeasibility, engine
//! output glitches) degrades silently and is represented internally as a
//! plain enum consumed by the pipeline, never as an [`OptimizerError`].

use thiserror::Error;

/// Errors that abort an optimization call outright.
#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("no depots supplied")]
    NoDepots,

    #[error("no couriers supplied")]
    NoCouriers,

    #[error("no pending orders supplied")]
    NoPendingOrders,

    #[error("depot filter selects a depot id that does not exist")]
    UnknownDepotFilter,
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
