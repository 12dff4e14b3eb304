//! Unit reference data used to seed rent on unit selection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default installments per year when a unit or line leaves it unset.
pub const DEFAULT_INSTALLMENT_COUNT: u32 = 12;

/// Default rent terms of a leasable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDefaults {
    pub unit_id: String,
    #[serde(default)]
    pub monthly_rent: Option<Decimal>,
    #[serde(default)]
    pub yearly_rent: Option<Decimal>,
    #[serde(default)]
    pub installment_count: Option<u32>,
}
