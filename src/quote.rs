use crate::order::Ticks;

/// Best bid / best ask snapshot. Either side is `None` when that side of
/// the book (CLOB) or batch's limit-like orders (auction) is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quote {
    pub bid: Option<Ticks>,
    pub ask: Option<Ticks>,
}
