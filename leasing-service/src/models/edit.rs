//! Field edits the host reports to the engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input field that changed on a line; selects which rules re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangedField {
    Period,
    BaseAmount,
    InstallmentCount,
    Unit,
    TaxId,
    DiscountAmount,
    /// Full pass over every rule.
    All,
}

/// A new value for one input field of one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldEdit {
    /// Contract window of a unit term, or billed period of an allocation.
    Period {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    /// Unit term rent per month.
    MonthlyAmount(Decimal),
    /// Unit term installments per year.
    InstallmentCount(Option<u32>),
    /// Additional charge amount.
    Amount(Decimal),
    /// Allocation rent per month.
    MonthlyRent(Decimal),
    TaxId(Option<String>),
    /// Unit term discount.
    DiscountAmount(Decimal),
}

impl FieldEdit {
    pub fn changed_field(&self) -> ChangedField {
        match self {
            FieldEdit::Period { .. } => ChangedField::Period,
            FieldEdit::MonthlyAmount(_) | FieldEdit::Amount(_) | FieldEdit::MonthlyRent(_) => {
                ChangedField::BaseAmount
            }
            FieldEdit::InstallmentCount(_) => ChangedField::InstallmentCount,
            FieldEdit::TaxId(_) => ChangedField::TaxId,
            FieldEdit::DiscountAmount(_) => ChangedField::DiscountAmount,
        }
    }

    /// Wire name of the edited field.
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldEdit::Period { .. } => "period",
            FieldEdit::MonthlyAmount(_) => "monthlyAmount",
            FieldEdit::InstallmentCount(_) => "installmentCount",
            FieldEdit::Amount(_) => "amount",
            FieldEdit::MonthlyRent(_) => "monthlyRent",
            FieldEdit::TaxId(_) => "taxId",
            FieldEdit::DiscountAmount(_) => "discountAmount",
        }
    }
}
