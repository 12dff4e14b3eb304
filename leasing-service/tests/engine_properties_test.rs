//! Property-based tests for the recalculation engine.

use chrono::{Duration, NaiveDate};
use leasing_service::models::{
    AllocationLine, ChargeLine, Document, DocumentKind, FieldEdit, TaxRate, TaxTable,
    UnitTermLine,
};
use leasing_service::services::{round2, RecalculationEngine};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn taxes() -> TaxTable {
    TaxTable::new(vec![
        TaxRate {
            id: "vat5".to_string(),
            name: None,
            rate_percent: dec!(5),
            is_exempt: false,
        },
        TaxRate {
            id: "vat7_125".to_string(),
            name: None,
            rate_percent: dec!(7.125),
            is_exempt: false,
        },
        TaxRate {
            id: "exempt".to_string(),
            name: None,
            rate_percent: dec!(20),
            is_exempt: true,
        },
    ])
}

// ── Strategies ──────────────────────────────────────────────────────────────

/// Non-negative amount with up to three decimals.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0u64..10_000_000u64).prop_map(|thousandths| Decimal::new(thousandths as i64, 3))
}

fn arb_tax_id() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("0".to_string())),
        Just(Some("vat5".to_string())),
        Just(Some("vat7_125".to_string())),
        Just(Some("exempt".to_string())),
        Just(Some("unknown".to_string())),
    ]
}

fn arb_window() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (0i64..1500, 0i64..800).prop_map(|(start, len)| {
        let from = date(2024, 1, 1) + Duration::days(start);
        (from, from + Duration::days(len))
    })
}

fn arb_unit_term() -> impl Strategy<Value = UnitTermLine> {
    (
        arb_amount(),
        prop::option::of(1u32..=24),
        arb_tax_id(),
        arb_window(),
        arb_amount(),
    )
        .prop_map(|(monthly, installments, tax_id, (from, to), discount)| {
            let mut line = UnitTermLine::new(from);
            line.to_date = Some(to);
            line.monthly_amount = monthly;
            line.installment_count = installments;
            line.tax_id = tax_id;
            line.discount_amount = discount;
            line
        })
}

fn arb_charge() -> impl Strategy<Value = ChargeLine> {
    (arb_amount(), arb_tax_id()).prop_map(|(amount, tax_id)| {
        let mut line = ChargeLine::new();
        line.amount = amount;
        line.tax_id = tax_id;
        line
    })
}

fn arb_allocation() -> impl Strategy<Value = AllocationLine> {
    (arb_amount(), arb_tax_id(), arb_window()).prop_map(|(rent, tax_id, (from, to))| {
        let mut line = AllocationLine::new(from);
        line.period_to = Some(to);
        line.monthly_rent = rent;
        line.tax_id = tax_id;
        line
    })
}

fn arb_document() -> impl Strategy<Value = Document> {
    (
        prop::collection::vec(arb_unit_term(), 0..4),
        prop::collection::vec(arb_charge(), 0..4),
        prop::collection::vec(arb_allocation(), 0..4),
    )
        .prop_map(|(unit_terms, charges, allocations)| {
            let mut document = Document::new(DocumentKind::Contract);
            document.unit_terms = unit_terms;
            document.charges = charges;
            document.allocations = allocations;
            document
        })
}

fn expected_tax(base: Decimal, percentage: Decimal) -> Decimal {
    if percentage.is_zero() {
        Decimal::ZERO
    } else {
        round2(base * percentage / Decimal::ONE_HUNDRED)
    }
}

// ── Property Tests ──────────────────────────────────────────────────────────

proptest! {
    /// A second full pass changes nothing.
    #[test]
    fn recalculation_is_idempotent(mut document in arb_document()) {
        let taxes = taxes();
        RecalculationEngine::recalculate(&mut document, &taxes);
        let once = document.clone();
        RecalculationEngine::recalculate(&mut document, &taxes);
        prop_assert_eq!(document, once);
    }

    /// Every aggregate is the rounded sum of its line totals.
    #[test]
    fn totals_match_line_sums(mut document in arb_document()) {
        let totals = RecalculationEngine::recalculate(&mut document, &taxes());

        let unit_terms: Decimal = document.unit_terms.iter().map(|l| l.total_amount).sum();
        let charges: Decimal = document.charges.iter().map(|l| l.total_amount).sum();
        let allocations: Decimal = document.allocations.iter().map(|l| l.total_amount).sum();

        prop_assert_eq!(totals.unit_term_total, round2(unit_terms));
        prop_assert_eq!(totals.charge_total, round2(charges));
        prop_assert_eq!(totals.allocation_total, round2(allocations));
        prop_assert_eq!(
            totals.grand_total,
            round2(unit_terms + charges + allocations)
        );
        prop_assert_eq!(document.totals, totals);
    }

    /// Tax and total follow from the base and the stored percentage.
    #[test]
    fn tax_and_total_follow_the_base(mut document in arb_document()) {
        RecalculationEngine::recalculate(&mut document, &taxes());

        for line in &document.unit_terms {
            prop_assert_eq!(line.tax_amount, expected_tax(line.yearly_amount, line.tax_percentage));
            prop_assert_eq!(
                line.total_amount,
                round2(line.yearly_amount + line.tax_amount - line.discount_amount)
            );
        }
        for line in &document.charges {
            prop_assert_eq!(line.tax_amount, expected_tax(line.amount, line.tax_percentage));
            prop_assert_eq!(line.total_amount, round2(line.amount + line.tax_amount));
        }
        for line in &document.allocations {
            prop_assert_eq!(
                line.tax_amount,
                expected_tax(line.invoice_amount, line.tax_percentage)
            );
            prop_assert_eq!(line.total_amount, round2(line.invoice_amount + line.tax_amount));
        }
    }

    /// Every derived money value carries two decimals.
    #[test]
    fn money_is_rounded_to_cents(mut document in arb_document()) {
        RecalculationEngine::recalculate(&mut document, &taxes());

        for line in &document.unit_terms {
            prop_assert_eq!(line.yearly_amount, round2(line.yearly_amount));
            prop_assert_eq!(line.total_amount, round2(line.total_amount));
        }
        for line in &document.allocations {
            prop_assert_eq!(line.invoice_amount, round2(line.invoice_amount));
        }
        prop_assert_eq!(document.totals.grand_total, round2(document.totals.grand_total));
    }

    /// Raising a non-negative rent never lowers the line total.
    #[test]
    fn total_is_monotonic_in_rent(
        line in arb_unit_term(),
        extra in arb_amount(),
    ) {
        let taxes = taxes();
        let mut document = Document::new(DocumentKind::Contract);
        let line_id = line.line_id;
        let monthly = line.monthly_amount;
        document.unit_terms.push(line);
        RecalculationEngine::recalculate(&mut document, &taxes);
        let before = document.unit_terms[0].total_amount;

        RecalculationEngine::apply_edit(
            &mut document,
            line_id,
            FieldEdit::MonthlyAmount(monthly + extra),
            &taxes,
        )
        .unwrap();
        prop_assert!(document.unit_terms[0].total_amount >= before);
    }

    /// A larger discount never raises the line total.
    #[test]
    fn total_falls_with_discount(
        line in arb_unit_term(),
        extra in arb_amount(),
    ) {
        let taxes = taxes();
        let mut document = Document::new(DocumentKind::Contract);
        let line_id = line.line_id;
        let discount = line.discount_amount;
        document.unit_terms.push(line);
        RecalculationEngine::recalculate(&mut document, &taxes);
        let before = document.unit_terms[0].total_amount;

        RecalculationEngine::apply_edit(
            &mut document,
            line_id,
            FieldEdit::DiscountAmount(discount + extra),
            &taxes,
        )
        .unwrap();
        prop_assert!(document.unit_terms[0].total_amount <= before);
    }

    /// A higher rate on the same base never lowers the line total.
    #[test]
    fn total_is_monotonic_in_rate(
        line in arb_charge(),
        low in 0u32..5000,
        bump in 0u32..5000,
    ) {
        let rate = |percent: Decimal| TaxTable::new(vec![TaxRate {
            id: "rate".to_string(),
            name: None,
            rate_percent: percent,
            is_exempt: false,
        }]);
        let low = Decimal::new(low as i64, 2);
        let high = low + Decimal::new(bump as i64, 2);

        let mut document = Document::new(DocumentKind::Contract);
        let mut line = line;
        line.tax_id = Some("rate".to_string());
        document.charges.push(line);

        let mut cheaper = document.clone();
        RecalculationEngine::recalculate(&mut cheaper, &rate(low));
        RecalculationEngine::recalculate(&mut document, &rate(high));
        prop_assert!(document.charges[0].total_amount >= cheaper.charges[0].total_amount);
    }

    /// A targeted edit lands on the same values as a full pass.
    #[test]
    fn edit_matches_full_recalculation(
        mut document in arb_document(),
        tax_id in arb_tax_id(),
        amount in arb_amount(),
    ) {
        prop_assume!(!document.charges.is_empty());
        let taxes = taxes();
        RecalculationEngine::recalculate(&mut document, &taxes);

        let line_id = document.charges[0].line_id;
        RecalculationEngine::apply_edit(&mut document, line_id, FieldEdit::Amount(amount), &taxes)
            .unwrap();
        RecalculationEngine::apply_edit(&mut document, line_id, FieldEdit::TaxId(tax_id), &taxes)
            .unwrap();

        let mut full = document.clone();
        RecalculationEngine::recalculate(&mut full, &taxes);
        prop_assert_eq!(document, full);
    }

    /// Removing a line takes exactly its total out of the grand total.
    #[test]
    fn removal_subtracts_line_total(mut document in arb_document()) {
        prop_assume!(!document.allocations.is_empty());
        RecalculationEngine::recalculate(&mut document, &taxes());

        let removed = document.allocations[0].clone();
        let before = document.totals.grand_total;
        prop_assert!(RecalculationEngine::remove_line(&mut document, removed.line_id));
        prop_assert_eq!(document.totals.grand_total, before - removed.total_amount);
    }
}
