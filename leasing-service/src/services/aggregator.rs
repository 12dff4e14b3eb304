//! Document-level totals.

use crate::models::{Document, DocumentTotals};
use crate::services::calculator::DerivedLine;
use crate::services::rounding::checked_round2;
use rust_decimal::Decimal;

fn line_total<L: DerivedLine>(lines: &[L]) -> Option<Decimal> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.total_amount()))
        .and_then(checked_round2)
}

/// Recompute every aggregate of `document` from its current lines.
///
/// An aggregate that does not fit a `Decimal` keeps its previous value.
pub fn aggregate(document: &mut Document) -> DocumentTotals {
    let previous = document.totals;
    let unit_term_total = line_total(&document.unit_terms);
    let charge_total = line_total(&document.charges);
    let allocation_total = line_total(&document.allocations);
    let grand_total = match (unit_term_total, charge_total, allocation_total) {
        (Some(units), Some(charges), Some(allocations)) => units
            .checked_add(charges)
            .and_then(|sum| sum.checked_add(allocations))
            .and_then(checked_round2),
        _ => None,
    };

    if grand_total.is_none() {
        tracing::warn!(
            document_id = %document.document_id,
            "Document totals overflow, keeping previous values"
        );
    }

    let totals = DocumentTotals {
        unit_term_total: unit_term_total.unwrap_or(previous.unit_term_total),
        charge_total: charge_total.unwrap_or(previous.charge_total),
        allocation_total: allocation_total.unwrap_or(previous.allocation_total),
        grand_total: grand_total.unwrap_or(previous.grand_total),
    };
    document.totals = totals;
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChargeLine, DocumentKind};
    use rust_decimal_macros::dec;

    fn charge(total: Decimal) -> ChargeLine {
        let mut line = ChargeLine::new();
        line.total_amount = total;
        line
    }

    #[test]
    fn empty_document_totals_zero() {
        let mut doc = Document::new(DocumentKind::Contract);
        let totals = aggregate(&mut doc);
        assert_eq!(totals.grand_total, dec!(0));
        assert_eq!(totals.unit_term_total, dec!(0));
    }

    #[test]
    fn sums_each_variant_and_the_grand_total() {
        let mut doc = Document::new(DocumentKind::Contract);
        doc.charges = vec![charge(dec!(100.10)), charge(dec!(0.20))];
        let totals = aggregate(&mut doc);
        assert_eq!(totals.charge_total, dec!(100.30));
        assert_eq!(totals.grand_total, dec!(100.30));
        assert_eq!(doc.totals, totals);
    }

    #[test]
    fn overflowing_sum_keeps_previous_grand_total() {
        let mut doc = Document::new(DocumentKind::Contract);
        doc.totals.grand_total = dec!(42);
        doc.charges = vec![charge(Decimal::MAX), charge(Decimal::MAX)];
        let totals = aggregate(&mut doc);
        assert_eq!(totals.grand_total, dec!(42));
        assert_eq!(totals.unit_term_total, dec!(0));
    }

    #[test]
    fn stale_totals_are_overwritten() {
        let mut doc = Document::new(DocumentKind::Invoice);
        doc.totals.grand_total = dec!(999);
        aggregate(&mut doc);
        assert_eq!(doc.totals.grand_total, dec!(0));
    }
}
