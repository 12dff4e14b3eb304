//! Domain models for leasing-service.

mod document;
mod edit;
mod line_item;
mod tax_rate;
mod unit;

pub use document::{Document, DocumentKind, DocumentTotals, LineMut};
pub use edit::{ChangedField, FieldEdit};
pub use line_item::{AllocationLine, ChargeLine, LineId, LineVariant, UnitTermLine};
pub use tax_rate::{TaxRate, TaxResolution, TaxTable, NO_TAX_SELECTED};
pub use unit::{UnitDefaults, DEFAULT_INSTALLMENT_COUNT};
