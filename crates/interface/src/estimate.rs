use serde::{Deserialize, Serialize};

/// Estimated execution cost of a hypothetical order against one snapshot.
///
/// `slippage` and `market_impact` come from simple size-versus-depth
/// heuristics and are approximations, not forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub slippage: f64,
    pub fees: f64,
    pub market_impact: f64,
    /// Always `slippage + fees + market_impact`.
    pub net_cost: f64,
    /// Expected maker share of the order, in `[0.1, 1.0]`.
    pub maker_taker_proportion: f64,
    /// Time spent computing this estimate. Observability only.
    #[serde(rename = "latency")]
    pub latency_ms: f64,
    pub mid_price: f64,
    pub total_depth: f64,
}
