//! Execution-cost estimates against the latest published order book.
//!
//! Everything here is synchronous and free of I/O: an estimate reads the
//! snapshot that is current when it starts and never waits on the feed.

use std::sync::Arc;
use std::time::Instant;

use interface::{CostEstimate, EstimateError, OrderBookSnapshot, PublishedState, SimulationParams};
use serde_json::Value;
use tracing::debug;

pub mod depth;
pub mod models;

pub use depth::{LiquidityDepth, DEPTH_BAND};

/// Read side of the published state: hands out the current snapshot and
/// prices hypothetical orders against it.
#[derive(Debug, Clone)]
pub struct CostEstimator {
    state: Arc<PublishedState>,
}

impl CostEstimator {
    pub fn new(state: Arc<PublishedState>) -> Self {
        Self { state }
    }

    pub fn snapshot(&self) -> Result<OrderBookSnapshot, EstimateError> {
        Ok(self.state.snapshot()?.snapshot.clone())
    }

    pub fn estimate(&self, params: &SimulationParams) -> Result<CostEstimate, EstimateError> {
        let published = self.state.snapshot()?;
        Ok(estimate_snapshot(&published.snapshot, params))
    }

    /// Estimate straight from a request body. The snapshot check comes
    /// first, so a client polling before the feed is up always sees
    /// `NoSnapshotAvailable` whatever it sent.
    pub fn estimate_request(&self, body: &Value) -> Result<CostEstimate, EstimateError> {
        let published = self.state.snapshot()?;
        let params = SimulationParams::from_json(body)?;
        Ok(estimate_snapshot(&published.snapshot, &params))
    }
}

/// Prices `params` against one snapshot. Never fails: empty sides only
/// shrink the measured depth.
pub fn estimate_snapshot(snapshot: &OrderBookSnapshot, params: &SimulationParams) -> CostEstimate {
    let started = Instant::now();

    let depth = LiquidityDepth::measure(snapshot);
    let total_depth = depth.total();

    let slippage = models::slippage(params.quantity, total_depth, params.volatility);
    let fees = models::fees(params.quantity, params.fee_tier);
    let market_impact = models::market_impact(params.quantity, params.volatility, total_depth);
    let maker_taker_proportion = models::maker_taker_proportion(params.quantity, total_depth);
    let net_cost = slippage + fees + market_impact;

    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

    debug!(
        symbol = %snapshot.symbol,
        quantity = params.quantity,
        fee_tier = %params.fee_tier,
        mid_price = depth.mid_price,
        total_depth,
        net_cost,
        latency_ms,
        "cost estimate computed"
    );

    CostEstimate {
        slippage,
        fees,
        market_impact,
        net_cost,
        maker_taker_proportion,
        latency_ms,
        mid_price: depth.mid_price,
        total_depth,
    }
}
