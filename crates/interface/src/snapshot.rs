use serde::{Deserialize, Deserializer, Serialize};

/// One resting price level.
///
/// On the wire a level is a two element array, `[price, size]`. The venue
/// sends both as decimal strings; plain JSON numbers are accepted as well.
/// Values are parsed straight to `f64` with no rounding. A negative size is
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[WireNumber; 2]", into = "[f64; 2]")]
pub struct OrderBookEntry {
    pub price: f64,
    pub quantity: f64,
}

impl OrderBookEntry {
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Text(String),
    Number(f64),
}

impl WireNumber {
    fn to_f64(&self, field: &str) -> Result<f64, String> {
        let value = match self {
            WireNumber::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("failed to parse {} {:?}: {}", field, s, e))?,
            WireNumber::Number(n) => *n,
        };
        if !value.is_finite() {
            return Err(format!("{} is not finite: {}", field, value));
        }
        Ok(value)
    }
}

impl TryFrom<[WireNumber; 2]> for OrderBookEntry {
    type Error = String;

    fn try_from([price, quantity]: [WireNumber; 2]) -> Result<Self, Self::Error> {
        let price = price.to_f64("price")?;
        let quantity = quantity.to_f64("size")?;
        if quantity < 0.0 {
            return Err(format!("size is negative: {}", quantity));
        }
        Ok(Self { price, quantity })
    }
}

impl From<OrderBookEntry> for [f64; 2] {
    fn from(entry: OrderBookEntry) -> Self {
        [entry.price, entry.quantity]
    }
}

/// Full L2 snapshot for the one instrument the feed follows.
///
/// bids: descending by price, asks: ascending by price. Either side can be
/// empty; when it is not, index 0 is the best level on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub symbol: String,
    pub bids: Vec<OrderBookEntry>,
    pub asks: Vec<OrderBookEntry>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub exchange: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
}

impl OrderBookSnapshot {
    pub fn new(
        symbol: impl Into<String>,
        bids: Vec<OrderBookEntry>,
        asks: Vec<OrderBookEntry>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            bids,
            asks,
            exchange: None,
            timestamp: None,
        }
    }

    /// Decodes one feed frame.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|l| l.price)
    }

    /// Average of the best bid and best ask. A missing side counts as 0, so an
    /// empty book has a mid of 0.
    pub fn mid_price(&self) -> f64 {
        (self.best_ask().unwrap_or(0.0) + self.best_bid().unwrap_or(0.0)) / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

// Metadata fields are informational only; a number or a string is kept as
// text and anything else is dropped instead of failing the whole frame.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OKX_FRAME: &str = r#"{
        "timestamp": "2025-05-04T10:39:13Z",
        "exchange": "OKX",
        "symbol": "BTC-USDT-SWAP",
        "asks": [["95445.5", "9.06"], ["95448", "2.05"]],
        "bids": [["95445.4", "1104.23"], ["95445.3", "0.02"]]
    }"#;

    #[test]
    fn test_decode_venue_frame() {
        let snapshot = OrderBookSnapshot::from_json(OKX_FRAME).unwrap();
        assert_eq!(snapshot.symbol, "BTC-USDT-SWAP");
        assert_eq!(snapshot.exchange.as_deref(), Some("OKX"));
        assert_eq!(snapshot.asks.len(), 2);
        assert_eq!(snapshot.bids[0], OrderBookEntry::new(95445.4, 1104.23));
        assert_eq!(snapshot.best_ask(), Some(95445.5));
        assert_eq!(snapshot.best_bid(), Some(95445.4));
    }

    #[test]
    fn test_decode_accepts_numeric_levels() {
        let snapshot =
            OrderBookSnapshot::from_json(r#"{"symbol":"X","bids":[[100,2]],"asks":[[101.5,"3"]]}"#)
                .unwrap();
        assert_eq!(snapshot.bids[0], OrderBookEntry::new(100.0, 2.0));
        assert_eq!(snapshot.asks[0], OrderBookEntry::new(101.5, 3.0));
        assert!(snapshot.timestamp.is_none());
    }

    #[test]
    fn test_decode_rejects_bad_levels() {
        let cases = [
            r#"{"symbol":"X","bids":[["abc","1"]],"asks":[]}"#,
            r#"{"symbol":"X","bids":[["1"]],"asks":[]}"#,
            r#"{"symbol":"X","bids":[["NaN","1"]],"asks":[]}"#,
            r#"{"symbol":"X","bids":[],"asks":[["1","inf"]]}"#,
            r#"{"symbol":"X","bids":[["100","-1"]],"asks":[]}"#,
            r#"{"symbol":"X","bids":[],"asks":[[101,-0.5]]}"#,
            r#"{"symbol":"X","bids":[]}"#,
            r#"{"bids":[],"asks":[]}"#,
            "not json at all",
        ];
        for case in cases {
            assert!(
                OrderBookSnapshot::from_json(case).is_err(),
                "expected decode failure for {}",
                case
            );
        }
    }

    #[test]
    fn test_decode_keeps_zero_sizes() {
        let snapshot =
            OrderBookSnapshot::from_json(r#"{"symbol":"X","bids":[["100","0"]],"asks":[["101","0"]]}"#)
                .unwrap();
        assert_eq!(snapshot.bids[0].quantity, 0.0);
        assert_eq!(snapshot.asks[0].quantity, 0.0);
    }

    #[test]
    fn test_empty_book_mid_is_zero() {
        let snapshot = OrderBookSnapshot::new("X", vec![], vec![]);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.mid_price(), 0.0);
    }

    #[test]
    fn test_serializes_levels_as_pairs() {
        let snapshot = OrderBookSnapshot::new(
            "X",
            vec![OrderBookEntry::new(100.0, 2.0)],
            vec![OrderBookEntry::new(101.0, 1.5)],
        );
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["bids"][0][0], 100.0);
        assert_eq!(value["asks"][0][1], 1.5);
        assert!(value.get("exchange").is_none());
    }
}
