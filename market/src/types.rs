#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub name: String,
    /// `None` when the source listed the instrument without a readable price.
    pub price: Option<f64>,
}

impl PriceQuote {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price: Some(price),
        }
    }
}

/// All quotes returned by one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSnapshot {
    pub quotes: Vec<PriceQuote>,
}

impl PriceSnapshot {
    pub fn new(quotes: Vec<PriceQuote>) -> Self {
        Self { quotes }
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Price of `instrument`, matched case-insensitively against the quote
    /// names after trimming the query. Only the first matching quote is
    /// considered. Missing, non-finite and non-positive prices resolve to
    /// `None`; there is no fallback to another quote.
    pub fn resolve(&self, instrument: &str) -> Option<f64> {
        let needle = instrument.trim().to_lowercase();

        self.quotes
            .iter()
            .find(|q| q.name.to_lowercase() == needle)
            .and_then(|q| q.price)
            .filter(|p| p.is_finite() && *p > 0.0)
    }
}
