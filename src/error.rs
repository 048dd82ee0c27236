use thiserror::Error;

use crate::routing::RoutingError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no drivers available")]
    NoAvailableDrivers,

    #[error("dispatch cancelled")]
    Cancelled,

    #[error("routing backend error: {0}")]
    Routing(#[from] RoutingError),

    #[error("location feed error: {0}")]
    Feed(String),

    #[error("internal error: {0}")]
    Internal(String),
}
