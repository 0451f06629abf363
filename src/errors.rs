use thiserror::Error;

/// The InvalidOrder taxonomy entry from the error-handling design: a
/// malformed request that should never have reached the matching core.
/// Not retried, not recovered from — the caller treats it as fatal for
/// that order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderError {
    #[error("LIMIT/IOC order is missing a required price")]
    MissingPrice,

    #[error("order quantity must be positive")]
    NonPositiveQty,
}
