//! The order model: sides, kinds, ticks, and the tagged order request
//! that the ingest boundary produces and the matchers consume.

/// Fixed-point price, expressed in ticks rather than a decimal float.
///
/// Keeping prices as integers gives exact `BTreeMap` keys and byte-identical
/// output across platforms; decimal formatting only happens at the CSV
/// boundary (see [`crate::io`]).
pub type Ticks = i64;

/// Sentinel price a synthetic MARKET BUY is normalised to in the batch
/// auction: "willing to pay anything".
pub const MARKET_BUY_SENTINEL: Ticks = Ticks::MAX;

/// Sentinel price a synthetic MARKET SELL is normalised to in the batch
/// auction: "willing to accept anything".
pub const MARKET_SELL_SENTINEL: Ticks = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order kind, carried alongside an [`OrderRequest`] for callers that want
/// to label fills or logs without re-deriving it from the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Limit,
    Market,
    Ioc,
    Cancel,
}

/// A validated request arriving at the matching core.
///
/// This is a tagged variant rather than a single struct with optional
/// fields: each kind carries exactly the fields it needs. CANCEL's
/// wire-format convenience of reusing the `price` column for the target id
/// stops at the ingest boundary — here it has its own `target_id` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderRequest {
    Limit {
        id: u64,
        side: Side,
        price: Ticks,
        qty: u64,
        timestamp: u64,
    },
    Market {
        id: u64,
        side: Side,
        qty: u64,
        timestamp: u64,
    },
    Ioc {
        id: u64,
        side: Side,
        price: Ticks,
        qty: u64,
        timestamp: u64,
    },
    Cancel {
        id: u64,
        target_id: u64,
        timestamp: u64,
    },
}

impl OrderRequest {
    pub fn id(&self) -> u64 {
        match *self {
            OrderRequest::Limit { id, .. }
            | OrderRequest::Market { id, .. }
            | OrderRequest::Ioc { id, .. }
            | OrderRequest::Cancel { id, .. } => id,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match *self {
            OrderRequest::Limit { timestamp, .. }
            | OrderRequest::Market { timestamp, .. }
            | OrderRequest::Ioc { timestamp, .. }
            | OrderRequest::Cancel { timestamp, .. } => timestamp,
        }
    }

    pub fn kind(&self) -> OrderKind {
        match self {
            OrderRequest::Limit { .. } => OrderKind::Limit,
            OrderRequest::Market { .. } => OrderKind::Market,
            OrderRequest::Ioc { .. } => OrderKind::Ioc,
            OrderRequest::Cancel { .. } => OrderKind::Cancel,
        }
    }

    pub fn side(&self) -> Option<Side> {
        match *self {
            OrderRequest::Limit { side, .. }
            | OrderRequest::Market { side, .. }
            | OrderRequest::Ioc { side, .. } => Some(side),
            OrderRequest::Cancel { .. } => None,
        }
    }

    pub fn price(&self) -> Option<Ticks> {
        match *self {
            OrderRequest::Limit { price, .. } | OrderRequest::Ioc { price, .. } => Some(price),
            OrderRequest::Market { .. } | OrderRequest::Cancel { .. } => None,
        }
    }

    pub fn qty(&self) -> u64 {
        match *self {
            OrderRequest::Limit { qty, .. }
            | OrderRequest::Market { qty, .. }
            | OrderRequest::Ioc { qty, .. } => qty,
            OrderRequest::Cancel { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant_fields() {
        let req = OrderRequest::Limit {
            id: 7,
            side: Side::Buy,
            price: 10_000,
            qty: 3,
            timestamp: 42,
        };
        assert_eq!(req.id(), 7);
        assert_eq!(req.side(), Some(Side::Buy));
        assert_eq!(req.price(), Some(10_000));
        assert_eq!(req.qty(), 3);
        assert_eq!(req.kind(), OrderKind::Limit);
    }

    #[test]
    fn cancel_has_no_side_or_price() {
        let req = OrderRequest::Cancel {
            id: 9,
            target_id: 3,
            timestamp: 1,
        };
        assert_eq!(req.side(), None);
        assert_eq!(req.price(), None);
        assert_eq!(req.qty(), 0);
    }
}
