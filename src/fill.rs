use crate::order::{Side, Ticks};

/// A matched transaction, the common output shape for both matchers.
///
/// - `price` is the aggressor's opposing level in CLOB mode, or the uniform
///   clearing price in batch mode.
/// - `taker_side` is the side of the arriving aggressor in CLOB mode; in
///   batch mode it is always `Buy` by convention (there is no individual
///   aggressor once all orders clear simultaneously).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub buyer_id: u64,
    pub seller_id: u64,
    pub price: Ticks,
    pub qty: u64,
    pub taker_side: Side,
}
