//! Per-line derived-field calculator.
//!
//! Derived fields are produced by five rules evaluated in a fixed order:
//!
//! 1. period duration (unit terms)
//! 2. rate normalisation, monthly to yearly (unit terms)
//! 3. period amount, 30-day-month proration (allocations)
//! 4. tax
//! 5. total
//!
//! Every rule declares the fields it reads and the fields it writes. A pass
//! starts from the set of fields the host reported as changed; a rule runs
//! only if one of its inputs is dirty, and once it runs its outputs become
//! dirty for the rules after it. A rule that declines to run (for instance a
//! reversed period) leaves its outputs clean.

use crate::models::{
    AllocationLine, ChangedField, ChargeLine, LineId, LineVariant, TaxTable, UnitTermLine,
    DEFAULT_INSTALLMENT_COUNT,
};
use crate::services::period::{days_between, months_between, years_between};
use crate::services::rounding::checked_round2;
use bitflags::bitflags;
use rust_decimal::Decimal;

/// Proration divisor: every month is billed as 30 days.
pub const DAYS_PER_BILLING_MONTH: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

bitflags! {
    /// Line fields tracked by the rule graph.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Fields: u16 {
        // Inputs
        const PERIOD = 1 << 0;
        const BASE_AMOUNT = 1 << 1;
        const INSTALLMENTS = 1 << 2;
        const UNIT = 1 << 3;
        const TAX_ID = 1 << 4;
        const DISCOUNT = 1 << 5;
        // Derived
        const DURATION = 1 << 6;
        const EFFECTIVE_BASE = 1 << 7;
        const TAX = 1 << 8;
        const TOTAL = 1 << 9;

        const INPUTS = Self::PERIOD.bits()
            | Self::BASE_AMOUNT.bits()
            | Self::INSTALLMENTS.bits()
            | Self::UNIT.bits()
            | Self::TAX_ID.bits()
            | Self::DISCOUNT.bits();
    }
}

impl From<ChangedField> for Fields {
    fn from(changed: ChangedField) -> Self {
        match changed {
            ChangedField::Period => Fields::PERIOD,
            ChangedField::BaseAmount => Fields::BASE_AMOUNT,
            ChangedField::InstallmentCount => Fields::INSTALLMENTS,
            ChangedField::Unit => Fields::UNIT,
            ChangedField::TaxId => Fields::TAX_ID,
            ChangedField::DiscountAmount => Fields::DISCOUNT,
            ChangedField::All => Fields::INPUTS,
        }
    }
}

/// One node of the rule graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    PeriodDuration,
    RateNormalization,
    PeriodAmount,
    Tax,
    Total,
}

impl Rule {
    /// Evaluation order.
    pub const ORDER: [Rule; 5] = [
        Rule::PeriodDuration,
        Rule::RateNormalization,
        Rule::PeriodAmount,
        Rule::Tax,
        Rule::Total,
    ];

    pub fn inputs(self) -> Fields {
        match self {
            Rule::PeriodDuration => Fields::PERIOD,
            Rule::RateNormalization => Fields::BASE_AMOUNT | Fields::INSTALLMENTS | Fields::UNIT,
            Rule::PeriodAmount => Fields::PERIOD | Fields::BASE_AMOUNT | Fields::UNIT,
            Rule::Tax => Fields::TAX_ID | Fields::BASE_AMOUNT | Fields::EFFECTIVE_BASE,
            Rule::Total => {
                Fields::TAX | Fields::BASE_AMOUNT | Fields::EFFECTIVE_BASE | Fields::DISCOUNT
            }
        }
    }

    pub fn outputs(self) -> Fields {
        match self {
            Rule::PeriodDuration => Fields::DURATION,
            Rule::RateNormalization | Rule::PeriodAmount => Fields::EFFECTIVE_BASE,
            Rule::Tax => Fields::TAX,
            Rule::Total => Fields::TOTAL,
        }
    }

    pub fn applies_to(self, variant: LineVariant) -> bool {
        match self {
            Rule::PeriodDuration | Rule::RateNormalization => variant == LineVariant::UnitTerm,
            Rule::PeriodAmount => variant == LineVariant::Allocation,
            Rule::Tax | Rule::Total => true,
        }
    }

    /// Rules that would run for `changed` on a line of `variant`, assuming
    /// every rule produces output.
    #[cfg(test)]
    pub fn chain(variant: LineVariant, changed: Fields) -> Vec<Rule> {
        let mut dirty = changed;
        let mut chain = Vec::new();
        for rule in Rule::ORDER {
            if rule.applies_to(variant) && dirty.intersects(rule.inputs()) {
                dirty |= rule.outputs();
                chain.push(rule);
            }
        }
        chain
    }
}

/// Row shape the calculator works over.
pub trait DerivedLine {
    const VARIANT: LineVariant;

    fn line_id(&self) -> LineId;
    fn tax_id(&self) -> Option<&str>;
    /// Amount tax and total are computed from.
    fn effective_base(&self) -> Decimal;
    fn discount(&self) -> Decimal {
        Decimal::ZERO
    }
    fn tax_amount(&self) -> Decimal;
    fn total_amount(&self) -> Decimal;
    fn set_tax(&mut self, percentage: Decimal, amount: Decimal);
    fn set_total(&mut self, total: Decimal);

    /// Run one of rules 1-3. Returns `false` when the rule declines.
    fn apply_variant_rule(&mut self, _rule: Rule) -> bool {
        false
    }
}

impl DerivedLine for UnitTermLine {
    const VARIANT: LineVariant = LineVariant::UnitTerm;

    fn line_id(&self) -> LineId {
        self.line_id
    }
    fn tax_id(&self) -> Option<&str> {
        self.tax_id.as_deref()
    }
    fn effective_base(&self) -> Decimal {
        self.yearly_amount
    }
    fn discount(&self) -> Decimal {
        self.discount_amount
    }
    fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }
    fn total_amount(&self) -> Decimal {
        self.total_amount
    }
    fn set_tax(&mut self, percentage: Decimal, amount: Decimal) {
        self.tax_percentage = percentage;
        self.tax_amount = amount;
    }
    fn set_total(&mut self, total: Decimal) {
        self.total_amount = total;
    }

    fn apply_variant_rule(&mut self, rule: Rule) -> bool {
        match rule {
            Rule::PeriodDuration => period_duration(self),
            Rule::RateNormalization => rate_normalization(self),
            _ => false,
        }
    }
}

impl DerivedLine for ChargeLine {
    const VARIANT: LineVariant = LineVariant::Charge;

    fn line_id(&self) -> LineId {
        self.line_id
    }
    fn tax_id(&self) -> Option<&str> {
        self.tax_id.as_deref()
    }
    fn effective_base(&self) -> Decimal {
        self.amount
    }
    fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }
    fn total_amount(&self) -> Decimal {
        self.total_amount
    }
    fn set_tax(&mut self, percentage: Decimal, amount: Decimal) {
        self.tax_percentage = percentage;
        self.tax_amount = amount;
    }
    fn set_total(&mut self, total: Decimal) {
        self.total_amount = total;
    }
}

impl DerivedLine for AllocationLine {
    const VARIANT: LineVariant = LineVariant::Allocation;

    fn line_id(&self) -> LineId {
        self.line_id
    }
    fn tax_id(&self) -> Option<&str> {
        self.tax_id.as_deref()
    }
    fn effective_base(&self) -> Decimal {
        self.invoice_amount
    }
    fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }
    fn total_amount(&self) -> Decimal {
        self.total_amount
    }
    fn set_tax(&mut self, percentage: Decimal, amount: Decimal) {
        self.tax_percentage = percentage;
        self.tax_amount = amount;
    }
    fn set_total(&mut self, total: Decimal) {
        self.total_amount = total;
    }

    fn apply_variant_rule(&mut self, rule: Rule) -> bool {
        match rule {
            Rule::PeriodAmount => period_amount(self),
            _ => false,
        }
    }
}

/// Recompute the derived fields of `line` downstream of `changed`.
///
/// Returns the rules that actually ran.
pub fn recompute<L: DerivedLine>(line: &mut L, changed: Fields, taxes: &TaxTable) -> Vec<Rule> {
    let mut dirty = changed;
    let mut ran = Vec::new();

    for rule in Rule::ORDER {
        if !rule.applies_to(L::VARIANT) || !dirty.intersects(rule.inputs()) {
            continue;
        }

        let produced = match rule {
            Rule::Tax => apply_tax(line, taxes),
            Rule::Total => apply_total(line),
            variant_rule => line.apply_variant_rule(variant_rule),
        };

        if produced {
            dirty |= rule.outputs();
            ran.push(rule);
        } else {
            tracing::debug!(
                line_id = %line.line_id(),
                rule = ?rule,
                "Rule skipped, keeping previous derived values"
            );
        }
    }

    ran
}

/// Rule 1. Reversed or open-ended windows leave the previous values.
fn period_duration(line: &mut UnitTermLine) -> bool {
    let (Some(from), Some(to)) = (line.from_date, line.to_date) else {
        return false;
    };
    if to < from {
        return false;
    }

    line.period_days = days_between(from, to);
    line.period_months = months_between(from, to);
    line.period_years = years_between(from, to);
    true
}

/// Rule 2. Declines when the product does not fit a `Decimal`.
fn rate_normalization(line: &mut UnitTermLine) -> bool {
    let installments = line.installment_count.unwrap_or(DEFAULT_INSTALLMENT_COUNT);
    let Some(yearly) = line
        .monthly_amount
        .checked_mul(Decimal::from(installments))
        .and_then(checked_round2)
    else {
        return false;
    };
    line.yearly_amount = yearly;
    true
}

/// Rule 3. Flat 30-day months, inclusive day count.
fn period_amount(line: &mut AllocationLine) -> bool {
    let (Some(from), Some(to)) = (line.period_from, line.period_to) else {
        return false;
    };
    if to < from {
        return false;
    }

    let day_count = days_between(from, to) + 1;
    let Some(amount) = (line.monthly_rent / DAYS_PER_BILLING_MONTH)
        .checked_mul(Decimal::from(day_count))
        .and_then(checked_round2)
    else {
        return false;
    };
    line.period_day_count = day_count;
    line.invoice_amount = amount;
    true
}

/// Rule 4.
fn apply_tax<L: DerivedLine>(line: &mut L, taxes: &TaxTable) -> bool {
    let percentage = taxes.resolve(line.tax_id()).percentage();
    let amount = if percentage.is_zero() {
        Some(Decimal::ZERO)
    } else {
        line.effective_base()
            .checked_mul(percentage)
            .and_then(|taxed| checked_round2(taxed / Decimal::ONE_HUNDRED))
    };
    match amount {
        Some(amount) => {
            line.set_tax(percentage, amount);
            true
        }
        None => false,
    }
}

/// Rule 5.
fn apply_total<L: DerivedLine>(line: &mut L) -> bool {
    let total = line
        .effective_base()
        .checked_add(line.tax_amount())
        .and_then(|gross| gross.checked_sub(line.discount()))
        .and_then(checked_round2);
    match total {
        Some(total) => {
            line.set_total(total);
            true
        }
        None => false,
    }
}
