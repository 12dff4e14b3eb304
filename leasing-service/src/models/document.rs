//! Document model for leasing-service.

use super::line_item::{AllocationLine, ChargeLine, LineId, LineVariant, UnitTermLine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of host screen a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Contract,
    Invoice,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Contract => "contract",
            DocumentKind::Invoice => "invoice",
        }
    }
}

/// Aggregates over a document's lines. Never entered by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    pub unit_term_total: Decimal,
    pub charge_total: Decimal,
    pub allocation_total: Decimal,
    pub grand_total: Decimal,
}

/// A contract or invoice being edited: header plus ordered line collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default = "Uuid::new_v4")]
    pub document_id: Uuid,
    #[serde(default)]
    pub kind: DocumentKind,
    #[serde(default)]
    pub unit_terms: Vec<UnitTermLine>,
    #[serde(default)]
    pub charges: Vec<ChargeLine>,
    #[serde(default)]
    pub allocations: Vec<AllocationLine>,
    #[serde(default)]
    pub totals: DocumentTotals,
}

/// Mutable borrow of one row, whatever its collection.
#[derive(Debug)]
pub enum LineMut<'a> {
    UnitTerm(&'a mut UnitTermLine),
    Charge(&'a mut ChargeLine),
    Allocation(&'a mut AllocationLine),
}

impl LineMut<'_> {
    pub fn variant(&self) -> LineVariant {
        match self {
            LineMut::UnitTerm(_) => LineVariant::UnitTerm,
            LineMut::Charge(_) => LineVariant::Charge,
            LineMut::Allocation(_) => LineVariant::Allocation,
        }
    }
}

impl Document {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            document_id: Uuid::new_v4(),
            kind,
            unit_terms: Vec::new(),
            charges: Vec::new(),
            allocations: Vec::new(),
            totals: DocumentTotals::default(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.unit_terms.len() + self.charges.len() + self.allocations.len()
    }

    /// Every row id in collection order (unit terms, charges, allocations).
    pub fn line_ids(&self) -> impl Iterator<Item = LineId> + '_ {
        self.unit_terms
            .iter()
            .map(|l| l.line_id)
            .chain(self.charges.iter().map(|l| l.line_id))
            .chain(self.allocations.iter().map(|l| l.line_id))
    }

    pub fn variant_of(&self, line_id: LineId) -> Option<LineVariant> {
        if self.unit_terms.iter().any(|l| l.line_id == line_id) {
            Some(LineVariant::UnitTerm)
        } else if self.charges.iter().any(|l| l.line_id == line_id) {
            Some(LineVariant::Charge)
        } else if self.allocations.iter().any(|l| l.line_id == line_id) {
            Some(LineVariant::Allocation)
        } else {
            None
        }
    }

    pub fn line_mut(&mut self, line_id: LineId) -> Option<LineMut<'_>> {
        if let Some(line) = self.unit_terms.iter_mut().find(|l| l.line_id == line_id) {
            return Some(LineMut::UnitTerm(line));
        }
        if let Some(line) = self.charges.iter_mut().find(|l| l.line_id == line_id) {
            return Some(LineMut::Charge(line));
        }
        self.allocations
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .map(LineMut::Allocation)
    }

    /// Drop a row; returns the collection it came from.
    pub fn remove_line(&mut self, line_id: LineId) -> Option<LineVariant> {
        if let Some(pos) = self.unit_terms.iter().position(|l| l.line_id == line_id) {
            self.unit_terms.remove(pos);
            return Some(LineVariant::UnitTerm);
        }
        if let Some(pos) = self.charges.iter().position(|l| l.line_id == line_id) {
            self.charges.remove(pos);
            return Some(LineVariant::Charge);
        }
        if let Some(pos) = self.allocations.iter().position(|l| l.line_id == line_id) {
            self.allocations.remove(pos);
            return Some(LineVariant::Allocation);
        }
        None
    }
}
