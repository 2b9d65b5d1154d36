mod error;
mod estimate;
mod params;
mod snapshot;
mod state;

pub use error::{EstimateError, FeedError};
pub use estimate::CostEstimate;
pub use params::{FeeTier, SimulationParams, DEFAULT_QUANTITY, DEFAULT_VOLATILITY};
pub use snapshot::{OrderBookEntry, OrderBookSnapshot};
pub use state::{ConnectionState, FeedStatus, Published, PublishedState};
