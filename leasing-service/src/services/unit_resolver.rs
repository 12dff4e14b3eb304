//! Unit reference lookup used to seed rent when a unit is selected.

use crate::models::{UnitDefaults, DEFAULT_INSTALLMENT_COUNT};
use crate::services::rounding::round2;
use async_trait::async_trait;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, instrument};

/// Source of unit default rent terms.
#[async_trait]
pub trait UnitResolver: Send + Sync {
    /// `Ok(None)` when the unit is unknown.
    async fn resolve(&self, unit_id: &str) -> Result<Option<UnitDefaults>, AppError>;
}

impl UnitDefaults {
    /// Monthly rent to seed a line with, deriving it from the yearly rent
    /// when only that is known.
    pub fn monthly_seed(&self, installments: Option<u32>) -> Option<Decimal> {
        if let Some(monthly) = self.monthly_rent {
            return Some(monthly);
        }
        let installments = self
            .installment_count
            .or(installments)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_INSTALLMENT_COUNT);
        self.yearly_rent
            .map(|yearly| round2(yearly / Decimal::from(installments)))
    }

    /// Calendar-month rent for prorating an invoice period. A yearly rent is
    /// always split over twelve months, whatever the unit's installments.
    pub fn calendar_month_rent(&self) -> Option<Decimal> {
        self.monthly_rent.or_else(|| {
            self.yearly_rent
                .map(|yearly| round2(yearly / Decimal::from(DEFAULT_INSTALLMENT_COUNT)))
        })
    }
}

/// In-memory unit catalog.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: HashMap<String, UnitDefaults>,
}

impl UnitCatalog {
    pub fn new(units: impl IntoIterator<Item = UnitDefaults>) -> Self {
        Self {
            units: units
                .into_iter()
                .map(|unit| (unit.unit_id.clone(), unit))
                .collect(),
        }
    }

    /// Load a JSON array of unit defaults.
    #[instrument]
    pub async fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read unit catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        let units: Vec<UnitDefaults> = serde_json::from_str(&raw).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid unit catalog {}: {}",
                path.display(),
                e
            ))
        })?;

        let catalog = Self::new(units);
        info!(units = catalog.len(), path = %path.display(), "Unit catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[async_trait]
impl UnitResolver for UnitCatalog {
    async fn resolve(&self, unit_id: &str) -> Result<Option<UnitDefaults>, AppError> {
        Ok(self.units.get(unit_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn unit(id: &str, monthly: Option<Decimal>, yearly: Option<Decimal>) -> UnitDefaults {
        UnitDefaults {
            unit_id: id.to_string(),
            monthly_rent: monthly,
            yearly_rent: yearly,
            installment_count: None,
        }
    }

    #[test]
    fn monthly_rent_wins_over_yearly() {
        let defaults = unit("A-101", Some(dec!(1200)), Some(dec!(99999)));
        assert_eq!(defaults.monthly_seed(None), Some(dec!(1200)));
    }

    #[test]
    fn yearly_rent_is_split_by_installments() {
        let defaults = unit("A-102", None, Some(dec!(10000)));
        assert_eq!(defaults.monthly_seed(None), Some(dec!(833.33)));
        assert_eq!(defaults.monthly_seed(Some(4)), Some(dec!(2500)));
        assert_eq!(defaults.monthly_seed(Some(0)), Some(dec!(833.33)));
    }

    #[test]
    fn calendar_month_rent_ignores_installments() {
        let mut defaults = unit("A-104", None, Some(dec!(12000)));
        defaults.installment_count = Some(4);
        assert_eq!(defaults.monthly_seed(None), Some(dec!(3000)));
        assert_eq!(defaults.calendar_month_rent(), Some(dec!(1000)));

        let monthly = unit("A-105", Some(dec!(800)), Some(dec!(12000)));
        assert_eq!(monthly.calendar_month_rent(), Some(dec!(800)));
    }

    #[test]
    fn nothing_to_seed_without_rent() {
        assert_eq!(unit("A-103", None, None).monthly_seed(None), None);
    }

    #[tokio::test]
    async fn catalog_resolves_known_units_only() {
        let catalog = UnitCatalog::new(vec![unit("A-101", Some(dec!(1200)), None)]);
        assert!(catalog.resolve("A-101").await.unwrap().is_some());
        assert!(catalog.resolve("B-999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn loads_catalog_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"unitId":"A-101","monthlyRent":"1500","installmentCount":4}},
               {{"unitId":"A-102","yearlyRent":"24000"}}]"#
        )
        .unwrap();

        let catalog = UnitCatalog::from_json_file(file.path()).await.unwrap();
        assert_eq!(catalog.len(), 2);
        let a101 = catalog.resolve("A-101").await.unwrap().unwrap();
        assert_eq!(a101.installment_count, Some(4));
    }

    #[tokio::test]
    async fn malformed_catalog_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = UnitCatalog::from_json_file(file.path()).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
