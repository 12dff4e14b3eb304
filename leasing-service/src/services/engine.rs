//! Recalculation engine: the operations a host calls on a document.
//!
//! The engine holds no state. Every call takes the document and the tax
//! table, updates derived fields in place, and re-aggregates the totals.

use crate::models::{
    AllocationLine, ChangedField, ChargeLine, Document, DocumentTotals, FieldEdit, LineId,
    LineMut, LineVariant, TaxTable, UnitDefaults, UnitTermLine,
};
use crate::services::aggregator::aggregate;
use crate::services::calculator::{recompute, Fields};
use crate::services::unit_resolver::UnitResolver;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Host-boundary misuse. Computation itself never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Line {0} not found in document")]
    UnknownLine(LineId),

    #[error("Field '{field}' does not apply to {variant} lines")]
    FieldNotApplicable {
        field: &'static str,
        variant: &'static str,
    },
}

impl From<EngineError> for service_core::error::AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownLine(_) => Self::NotFound(anyhow::Error::new(err)),
            EngineError::FieldNotApplicable { .. } => {
                Self::UnprocessableEntity(anyhow::Error::new(err))
            }
        }
    }
}

/// What happened when seeding a line from its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOutcome {
    Seeded,
    UnitNotFound,
    LookupFailed,
}

impl SeedOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedOutcome::Seeded => "seeded",
            SeedOutcome::UnitNotFound => "unit_not_found",
            SeedOutcome::LookupFailed => "lookup_failed",
        }
    }
}

/// Entry points for hosts editing a contract or invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecalculationEngine;

impl RecalculationEngine {
    /// Full pass: every rule on every line, then the totals.
    #[instrument(
        skip_all,
        fields(document_id = %document.document_id, lines = document.line_count())
    )]
    pub fn recalculate(document: &mut Document, taxes: &TaxTable) -> DocumentTotals {
        for line in &mut document.unit_terms {
            recompute(line, Fields::INPUTS, taxes);
        }
        for line in &mut document.charges {
            recompute(line, Fields::INPUTS, taxes);
        }
        for line in &mut document.allocations {
            recompute(line, Fields::INPUTS, taxes);
        }
        aggregate(document)
    }

    /// Re-run the rules downstream of `changed` on one line after the host
    /// wrote the new value itself.
    pub fn recompute_line(
        document: &mut Document,
        line_id: LineId,
        changed: ChangedField,
        taxes: &TaxTable,
    ) -> Result<DocumentTotals, EngineError> {
        let dirty = Fields::from(changed);
        match document
            .line_mut(line_id)
            .ok_or(EngineError::UnknownLine(line_id))?
        {
            LineMut::UnitTerm(line) => recompute(line, dirty, taxes),
            LineMut::Charge(line) => recompute(line, dirty, taxes),
            LineMut::Allocation(line) => recompute(line, dirty, taxes),
        };
        Ok(aggregate(document))
    }

    /// Write `edit` into the addressed line and recompute its chain.
    #[instrument(skip(document, taxes), fields(document_id = %document.document_id))]
    pub fn apply_edit(
        document: &mut Document,
        line_id: LineId,
        edit: FieldEdit,
        taxes: &TaxTable,
    ) -> Result<DocumentTotals, EngineError> {
        let changed = edit.changed_field();
        let line = document
            .line_mut(line_id)
            .ok_or(EngineError::UnknownLine(line_id))?;
        write_edit(line, edit)?;
        Self::recompute_line(document, line_id, changed, taxes)
    }

    /// Append a default-initialised row of `variant`.
    pub fn append_line(
        document: &mut Document,
        variant: LineVariant,
        today: NaiveDate,
        taxes: &TaxTable,
    ) -> LineId {
        let line_id = match variant {
            LineVariant::UnitTerm => {
                let mut line = UnitTermLine::new(today);
                recompute(&mut line, Fields::INPUTS, taxes);
                let id = line.line_id;
                document.unit_terms.push(line);
                id
            }
            LineVariant::Charge => {
                let mut line = ChargeLine::new();
                recompute(&mut line, Fields::INPUTS, taxes);
                let id = line.line_id;
                document.charges.push(line);
                id
            }
            LineVariant::Allocation => {
                let mut line = AllocationLine::new(today);
                recompute(&mut line, Fields::INPUTS, taxes);
                let id = line.line_id;
                document.allocations.push(line);
                id
            }
        };
        aggregate(document);
        debug!(line_id = %line_id, variant = variant.as_str(), "Line appended");
        line_id
    }

    /// Remove a row; `false` when the id is unknown. Totals are refreshed
    /// either way.
    pub fn remove_line(document: &mut Document, line_id: LineId) -> bool {
        let removed = document.remove_line(line_id);
        aggregate(document);
        match removed {
            Some(variant) => {
                debug!(line_id = %line_id, variant = variant.as_str(), "Line removed");
                true
            }
            None => false,
        }
    }

    /// Point a unit term or allocation at `unit_id` and seed its rent from
    /// the unit's defaults.
    ///
    /// A unit the resolver does not know, or a failed lookup, only records
    /// the new unit id; amounts the user entered are kept.
    #[instrument(skip(document, resolver, taxes), fields(document_id = %document.document_id))]
    pub async fn seed_unit(
        document: &mut Document,
        line_id: LineId,
        unit_id: &str,
        resolver: &dyn UnitResolver,
        taxes: &TaxTable,
    ) -> Result<SeedOutcome, EngineError> {
        match document.variant_of(line_id) {
            None => return Err(EngineError::UnknownLine(line_id)),
            Some(LineVariant::Charge) => {
                return Err(EngineError::FieldNotApplicable {
                    field: "unitId",
                    variant: LineVariant::Charge.as_str(),
                })
            }
            Some(_) => {}
        }

        let (defaults, outcome) = match resolver.resolve(unit_id).await {
            Ok(Some(defaults)) => (Some(defaults), SeedOutcome::Seeded),
            Ok(None) => {
                debug!(unit_id = %unit_id, "Unit not found, seed skipped");
                (None, SeedOutcome::UnitNotFound)
            }
            Err(e) => {
                warn!(unit_id = %unit_id, error = %e, "Unit lookup failed, seed skipped");
                (None, SeedOutcome::LookupFailed)
            }
        };

        match document
            .line_mut(line_id)
            .ok_or(EngineError::UnknownLine(line_id))?
        {
            LineMut::UnitTerm(line) => {
                line.unit_id = Some(unit_id.to_string());
                if let Some(defaults) = &defaults {
                    if let Some(count) = defaults.installment_count {
                        line.installment_count = Some(count);
                    }
                    if let Some(monthly) = defaults.monthly_seed(line.installment_count) {
                        line.monthly_amount = monthly;
                    }
                }
            }
            LineMut::Allocation(line) => {
                line.unit_id = Some(unit_id.to_string());
                let seeded = defaults.as_ref().and_then(UnitDefaults::calendar_month_rent);
                if let Some(monthly) = seeded {
                    line.monthly_rent = monthly;
                }
            }
            LineMut::Charge(_) => {}
        }

        Self::recompute_line(document, line_id, ChangedField::Unit, taxes)?;
        Ok(outcome)
    }
}

fn not_applicable(edit: &FieldEdit, variant: LineVariant) -> EngineError {
    EngineError::FieldNotApplicable {
        field: edit.field_name(),
        variant: variant.as_str(),
    }
}

fn write_edit(line: LineMut<'_>, edit: FieldEdit) -> Result<(), EngineError> {
    let variant = line.variant();
    match (line, edit) {
        (LineMut::UnitTerm(line), FieldEdit::Period { from, to }) => {
            line.from_date = from;
            line.to_date = to;
        }
        (LineMut::Allocation(line), FieldEdit::Period { from, to }) => {
            line.period_from = from;
            line.period_to = to;
        }
        (LineMut::UnitTerm(line), FieldEdit::MonthlyAmount(amount)) => {
            line.monthly_amount = amount;
        }
        (LineMut::UnitTerm(line), FieldEdit::InstallmentCount(count)) => {
            line.installment_count = count;
        }
        (LineMut::UnitTerm(line), FieldEdit::DiscountAmount(amount)) => {
            line.discount_amount = amount;
        }
        (LineMut::Charge(line), FieldEdit::Amount(amount)) => {
            line.amount = amount;
        }
        (LineMut::Allocation(line), FieldEdit::MonthlyRent(amount)) => {
            line.monthly_rent = amount;
        }
        (LineMut::UnitTerm(line), FieldEdit::TaxId(tax_id)) => line.tax_id = tax_id,
        (LineMut::Charge(line), FieldEdit::TaxId(tax_id)) => line.tax_id = tax_id,
        (LineMut::Allocation(line), FieldEdit::TaxId(tax_id)) => line.tax_id = tax_id,
        (_, edit) => return Err(not_applicable(&edit, variant)),
    }
    Ok(())
}
