//! Tax rate reference data for leasing-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved tax id meaning "no selection".
pub const NO_TAX_SELECTED: &str = "0";

/// Tax rate configuration supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Percentage, e.g. `5` for 5%.
    pub rate_percent: Decimal,
    #[serde(default)]
    pub is_exempt: bool,
}

/// Outcome of looking a line's `taxId` up in a [`TaxTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxResolution {
    /// Absent, empty, sentinel, or unknown id.
    NoTax,
    Exempt,
    Rate(Decimal),
}

impl TaxResolution {
    /// Percentage applied to the effective base amount.
    pub fn percentage(&self) -> Decimal {
        match self {
            TaxResolution::Rate(rate) => *rate,
            TaxResolution::NoTax | TaxResolution::Exempt => Decimal::ZERO,
        }
    }
}

/// Read-only lookup of tax rates by id.
#[derive(Debug, Clone, Default)]
pub struct TaxTable {
    rates: HashMap<String, TaxRate>,
}

impl TaxTable {
    pub fn new(rates: impl IntoIterator<Item = TaxRate>) -> Self {
        Self {
            rates: rates
                .into_iter()
                .map(|rate| (rate.id.clone(), rate))
                .collect(),
        }
    }

    /// Resolve a line's tax reference.
    pub fn resolve(&self, tax_id: Option<&str>) -> TaxResolution {
        let Some(tax_id) = tax_id.map(str::trim) else {
            return TaxResolution::NoTax;
        };
        if tax_id.is_empty() || tax_id == NO_TAX_SELECTED {
            return TaxResolution::NoTax;
        }

        match self.rates.get(tax_id) {
            Some(rate) if rate.is_exempt => TaxResolution::Exempt,
            Some(rate) => TaxResolution::Rate(rate.rate_percent),
            None => {
                tracing::debug!(tax_id = %tax_id, "Tax id not in table, treating as no tax");
                TaxResolution::NoTax
            }
        }
    }
}

impl FromIterator<TaxRate> for TaxTable {
    fn from_iter<I: IntoIterator<Item = TaxRate>>(iter: I) -> Self {
        Self::new(iter)
    }
}
