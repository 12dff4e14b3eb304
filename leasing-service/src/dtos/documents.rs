use crate::models::{Document, FieldEdit, LineId, LineVariant, TaxRate};
use crate::services::SeedOutcome;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::borrow::Cow;
use std::collections::HashSet;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateRequest {
    #[validate(custom(function = "validate_document"))]
    pub document: Document,
    #[serde(default)]
    #[validate(length(max = 1000), custom(function = "validate_tax_rates"))]
    pub tax_rates: Vec<TaxRate>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditLineRequest {
    #[validate(custom(function = "validate_document"))]
    pub document: Document,
    #[serde(default)]
    #[validate(length(max = 1000), custom(function = "validate_tax_rates"))]
    pub tax_rates: Vec<TaxRate>,
    pub line_id: LineId,
    #[validate(custom(function = "validate_edit"))]
    pub edit: FieldEdit,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppendLineRequest {
    #[validate(custom(function = "validate_document"))]
    pub document: Document,
    #[serde(default)]
    #[validate(length(max = 1000), custom(function = "validate_tax_rates"))]
    pub tax_rates: Vec<TaxRate>,
    pub variant: LineVariant,
    /// Start of the default date window; the server's date when omitted.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLineRequest {
    #[validate(custom(function = "validate_document"))]
    pub document: Document,
    pub line_id: LineId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeedUnitRequest {
    #[validate(custom(function = "validate_document"))]
    pub document: Document,
    #[serde(default)]
    #[validate(length(max = 1000), custom(function = "validate_tax_rates"))]
    pub tax_rates: Vec<TaxRate>,
    pub line_id: LineId,
    #[validate(length(min = 1, max = 64))]
    pub unit_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub document: Document,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendLineResponse {
    pub line_id: LineId,
    pub document: Document,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLineResponse {
    pub removed: bool,
    pub document: Document,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUnitResponse {
    pub outcome: SeedOutcome,
    pub document: Document,
}

/// Largest magnitude accepted for an entered amount.
pub const MAX_INPUT_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);
pub const MAX_INSTALLMENT_COUNT: u32 = 365;
/// Largest magnitude accepted for a tax rate, in percent.
pub const MAX_RATE_PERCENT: Decimal = Decimal::ONE_THOUSAND;

fn out_of_range(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

fn check_amount(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value.abs() > MAX_INPUT_AMOUNT {
        return Err(out_of_range(
            "amount_out_of_range",
            format!("{} must be within ±{}, got {}", field, MAX_INPUT_AMOUNT, value),
        ));
    }
    Ok(())
}

fn check_installments(count: Option<u32>) -> Result<(), ValidationError> {
    match count {
        Some(count) if count > MAX_INSTALLMENT_COUNT => Err(out_of_range(
            "installments_out_of_range",
            format!(
                "installmentCount must be at most {}, got {}",
                MAX_INSTALLMENT_COUNT, count
            ),
        )),
        _ => Ok(()),
    }
}

fn validate_document(document: &Document) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(document.line_count());
    for line_id in document.line_ids() {
        if !seen.insert(line_id) {
            return Err(out_of_range(
                "duplicate_line_id",
                format!("Line id {} appears more than once", line_id),
            ));
        }
    }

    for line in &document.unit_terms {
        check_amount("monthlyAmount", line.monthly_amount)?;
        check_amount("discountAmount", line.discount_amount)?;
        check_installments(line.installment_count)?;
    }
    for line in &document.charges {
        check_amount("amount", line.amount)?;
    }
    for line in &document.allocations {
        check_amount("monthlyRent", line.monthly_rent)?;
    }
    Ok(())
}

fn validate_tax_rates(rates: &[TaxRate]) -> Result<(), ValidationError> {
    match rates
        .iter()
        .find(|rate| rate.rate_percent.abs() > MAX_RATE_PERCENT)
    {
        Some(rate) => Err(out_of_range(
            "rate_out_of_range",
            format!(
                "Tax rate {} must be within ±{}%, got {}",
                rate.id, MAX_RATE_PERCENT, rate.rate_percent
            ),
        )),
        None => Ok(()),
    }
}

fn validate_edit(edit: &FieldEdit) -> Result<(), ValidationError> {
    match edit {
        FieldEdit::MonthlyAmount(value)
        | FieldEdit::Amount(value)
        | FieldEdit::MonthlyRent(value)
        | FieldEdit::DiscountAmount(value) => check_amount(edit.field_name(), *value),
        FieldEdit::InstallmentCount(count) => check_installments(*count),
        FieldEdit::Period { .. } | FieldEdit::TaxId(_) => Ok(()),
    }
}

/// Reject documents above the configured line budget.
pub fn check_line_budget(document: &Document, max_lines: usize) -> Result<(), AppError> {
    if document.line_count() <= max_lines {
        return Ok(());
    }

    let mut error = ValidationError::new("too_many_lines");
    error.message = Some(Cow::from(format!(
        "Document has {} lines, at most {} are accepted",
        document.line_count(),
        max_lines
    )));
    let mut errors = ValidationErrors::new();
    errors.add("document", error);
    Err(AppError::ValidationError(errors))
}
