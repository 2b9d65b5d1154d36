use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::EstimateError;

pub const DEFAULT_QUANTITY: f64 = 100.0;
pub const DEFAULT_VOLATILITY: f64 = 0.05;

/// Venue fee schedule. The rate is a fraction of the order quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeTier {
    #[default]
    Default,
    Tier1,
    Tier2,
    Tier3,
}

impl FeeTier {
    /// Looks up a tier by name. Unknown names map to `FeeTier::Default`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "tier1" => FeeTier::Tier1,
            "tier2" => FeeTier::Tier2,
            "tier3" => FeeTier::Tier3,
            "default" => FeeTier::Default,
            _ => FeeTier::Default,
        }
    }

    pub fn rate(&self) -> f64 {
        match self {
            FeeTier::Default => 0.001,
            FeeTier::Tier1 => 0.0008,
            FeeTier::Tier2 => 0.0006,
            FeeTier::Tier3 => 0.0004,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeTier::Default => "default",
            FeeTier::Tier1 => "tier1",
            FeeTier::Tier2 => "tier2",
            FeeTier::Tier3 => "tier3",
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs for one cost estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    /// Order size to simulate, in base units.
    pub quantity: f64,
    /// Volatility estimate, e.g. 0.05 for 5%.
    pub volatility: f64,
    pub fee_tier: FeeTier,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            quantity: DEFAULT_QUANTITY,
            volatility: DEFAULT_VOLATILITY,
            fee_tier: FeeTier::Default,
        }
    }
}

impl SimulationParams {
    pub fn new(quantity: f64, volatility: f64, fee_tier: FeeTier) -> Result<Self, EstimateError> {
        check_non_negative("quantity", quantity)?;
        check_non_negative("volatility", volatility)?;
        Ok(Self {
            quantity,
            volatility,
            fee_tier,
        })
    }

    /// Builds params from a request body.
    ///
    /// Missing or `null` fields take their defaults. `quantity` and
    /// `volatility` must otherwise be finite, non-negative JSON numbers.
    /// `feeTier` never fails: anything that is not a known tier name is
    /// treated as `default`.
    pub fn from_json(value: &Value) -> Result<Self, EstimateError> {
        let fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return Ok(Self::default()),
            _ => {
                return Err(EstimateError::invalid(
                    "body",
                    "expected a JSON object of simulation parameters",
                ))
            }
        };

        let quantity = number_field(fields, "quantity", DEFAULT_QUANTITY)?;
        let volatility = number_field(fields, "volatility", DEFAULT_VOLATILITY)?;
        let fee_tier = fields
            .get("feeTier")
            .and_then(Value::as_str)
            .map(FeeTier::from_name)
            .unwrap_or_default();

        Self::new(quantity, volatility, fee_tier)
    }
}

fn number_field(
    fields: &Map<String, Value>,
    name: &'static str,
    default: f64,
) -> Result<f64, EstimateError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| EstimateError::invalid(name, format!("{} is not representable", n))),
        Some(other) => Err(EstimateError::invalid(
            name,
            format!("expected a number, got {}", other),
        )),
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), EstimateError> {
    if !value.is_finite() {
        return Err(EstimateError::invalid(name, "must be finite"));
    }
    if value < 0.0 {
        return Err(EstimateError::invalid(
            name,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}
