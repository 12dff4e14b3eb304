//! Line item models for leasing-service.
//!
//! Each collection of a [`Document`](super::Document) holds one of three row
//! variants. Input fields are written by the host; derived fields are only
//! ever written by the calculator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable row identity, independent of the row's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub Uuid);

impl LineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Line collection a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineVariant {
    UnitTerm,
    Charge,
    Allocation,
}

impl LineVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineVariant::UnitTerm => "unit_term",
            LineVariant::Charge => "charge",
            LineVariant::Allocation => "allocation",
        }
    }
}

/// Leased unit on a contract: monthly rent normalised to a yearly amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTermLine {
    pub line_id: LineId,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    #[serde(default)]
    pub to_date: Option<NaiveDate>,
    #[serde(default)]
    pub monthly_amount: Decimal,
    /// Defaults to 12 when unset.
    #[serde(default)]
    pub installment_count: Option<u32>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub discount_amount: Decimal,

    // Derived
    #[serde(default)]
    pub yearly_amount: Decimal,
    #[serde(default)]
    pub tax_percentage: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub period_days: i64,
    #[serde(default)]
    pub period_months: u32,
    #[serde(default)]
    pub period_years: u32,
}

impl UnitTermLine {
    /// Fresh row with a zero amount and a one-day window on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            line_id: LineId::new(),
            unit_id: None,
            from_date: Some(today),
            to_date: Some(today),
            monthly_amount: Decimal::ZERO,
            installment_count: None,
            tax_id: None,
            discount_amount: Decimal::ZERO,
            yearly_amount: Decimal::ZERO,
            tax_percentage: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            period_days: 0,
            period_months: 0,
            period_years: 0,
        }
    }
}

/// Additional charge on a contract (deposit, service fee, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeLine {
    pub line_id: LineId,
    #[serde(default)]
    pub charge_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub tax_id: Option<String>,

    // Derived
    #[serde(default)]
    pub tax_percentage: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,
}

impl ChargeLine {
    pub fn new() -> Self {
        Self {
            line_id: LineId::new(),
            charge_id: None,
            description: String::new(),
            amount: Decimal::ZERO,
            tax_id: None,
            tax_percentage: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
        }
    }
}

impl Default for ChargeLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Invoice row billing one unit's rent for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationLine {
    pub line_id: LineId,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub period_from: Option<NaiveDate>,
    #[serde(default)]
    pub period_to: Option<NaiveDate>,
    #[serde(default)]
    pub monthly_rent: Decimal,
    #[serde(default)]
    pub tax_id: Option<String>,

    // Derived
    #[serde(default)]
    pub period_day_count: i64,
    #[serde(default)]
    pub invoice_amount: Decimal,
    #[serde(default)]
    pub tax_percentage: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,
}

impl AllocationLine {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            line_id: LineId::new(),
            unit_id: None,
            period_from: Some(today),
            period_to: Some(today),
            monthly_rent: Decimal::ZERO,
            tax_id: None,
            period_day_count: 0,
            invoice_amount: Decimal::ZERO,
            tax_percentage: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
        }
    }
}
