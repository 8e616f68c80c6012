use crate::foundation::error::{ReelError, ReelResult};

/// Affiliate marketplace a product was sourced from.
///
/// The known platforms form a closed set; any other name is carried verbatim in
/// [`Platform::Other`] so rendering never fails on an unmapped platform.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    /// Hotmart.
    Hotmart,
    /// Eduzz.
    Eduzz,
    /// KiwiPay.
    KiwiPay,
    /// Any platform outside the known set.
    Other(String),
}

impl Platform {
    /// Display name as printed on the platform badge.
    pub fn name(&self) -> &str {
        match self {
            Self::Hotmart => "Hotmart",
            Self::Eduzz => "Eduzz",
            Self::KiwiPay => "KiwiPay",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Hotmart" => Self::Hotmart,
            "Eduzz" => Self::Eduzz,
            "KiwiPay" => Self::KiwiPay,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Platform {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        match value {
            Platform::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Product record supplied by the catalog. Read-only to the pipeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Product {
    /// Catalog identifier.
    #[serde(default)]
    pub id: String,
    /// Product title, rendered as the wrapped headline.
    pub title: String,
    /// Price in BRL, must be positive.
    pub price: f64,
    /// Source platform.
    pub platform: Platform,
    /// Optional long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    /// Create a product without a description.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        price: f64,
        platform: impl Into<Platform>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            platform: platform.into(),
            description: None,
        }
    }

    /// Parse a product from JSON.
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Check the record invariants: non-empty title, finite positive price.
    pub fn validate(&self) -> ReelResult<()> {
        if self.title.trim().is_empty() {
            return Err(ReelError::validation("product title must be non-empty"));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ReelError::validation(format!(
                "product price must be a positive number, got {}",
                self.price
            )));
        }
        Ok(())
    }

    /// Price label as shown on frames and in narration (`"R$ 297.00"`).
    pub fn price_label(&self) -> String {
        format_brl(self.price)
    }
}

/// Format an amount the way the price label and narration print it.
pub fn format_brl(amount: f64) -> String {
    format!("R$ {amount:.2}")
}

#[cfg(test)]
#[path = "../../tests/unit/model/product.rs"]
mod tests;
