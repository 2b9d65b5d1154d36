use interface::OrderBookSnapshot;

/// Half-width of the band around the mid price, as a fraction of mid.
pub const DEPTH_BAND: f64 = 0.01;

/// Resting liquidity within `DEPTH_BAND` of the mid price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidityDepth {
    pub mid_price: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub ask_depth: f64,
    pub bid_depth: f64,
}

impl LiquidityDepth {
    pub fn measure(snapshot: &OrderBookSnapshot) -> Self {
        let mid_price = snapshot.mid_price();
        let upper_bound = mid_price * (1.0 + DEPTH_BAND);
        let lower_bound = mid_price * (1.0 - DEPTH_BAND);

        let ask_depth = snapshot
            .asks
            .iter()
            .filter(|level| level.price <= upper_bound)
            .map(|level| level.quantity)
            .sum();
        let bid_depth = snapshot
            .bids
            .iter()
            .filter(|level| level.price >= lower_bound)
            .map(|level| level.quantity)
            .sum();

        Self {
            mid_price,
            lower_bound,
            upper_bound,
            ask_depth,
            bid_depth,
        }
    }

    pub fn total(&self) -> f64 {
        self.ask_depth + self.bid_depth
    }
}
