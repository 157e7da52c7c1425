use serde::Deserialize;

/// Envelope of the public marketing symbol list.
#[derive(Debug, Deserialize)]
pub struct SymbolListEnvelope {
    #[serde(default)]
    pub data: Option<Vec<SymbolEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolEntry {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub price: Option<RawPrice>,
}

/// The endpoint has served prices both as JSON numbers and as strings.
/// Any other shape is kept as `Other` and reads as no price.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawPrice {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawPrice::Number(n) => Some(*n),
            RawPrice::Text(s) => s.trim().parse().ok(),
            RawPrice::Other(_) => None,
        }
    }
}
