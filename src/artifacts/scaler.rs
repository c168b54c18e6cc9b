//! Pre-fitted standardization of the numeric feature subset.

use crate::types::record::{FeatureVector, ScaledFeatureVector, NUMERIC_COLUMNS};
use serde::Deserialize;

/// Standard scaler with the per-column mean and scale stored at fit time.
///
/// The scaler touches exactly the numeric subset it was fitted on; the
/// categorical codes and the derived features pass through unchanged, as
/// they did at training time.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Validate the artifact shape: the declared columns must be exactly
    /// the numeric subset in training order, with one mean and one scale
    /// per column.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.columns.len() != NUMERIC_COLUMNS.len()
            || self.columns.iter().zip(NUMERIC_COLUMNS).any(|(a, b)| a != b)
        {
            anyhow::bail!(
                "scaler artifact columns {:?} do not match the fitted numeric subset {:?}",
                self.columns,
                NUMERIC_COLUMNS
            );
        }
        if self.mean.len() != self.columns.len() || self.scale.len() != self.columns.len() {
            anyhow::bail!(
                "scaler artifact has {} columns but {} means and {} scales",
                self.columns.len(),
                self.mean.len(),
                self.scale.len()
            );
        }
        Ok(())
    }

    /// Standardize one value by column index.
    fn standardize(&self, index: usize, value: f64) -> f64 {
        (value - self.mean[index]) / self.scale[index]
    }

    /// Apply the fitted transform to the numeric subset of a feature
    /// vector, producing the full scaled column set.
    pub fn transform(&self, features: &FeatureVector) -> ScaledFeatureVector {
        let encoded = &features.encoded;

        ScaledFeatureVector {
            gender: encoded.gender as f64,
            married: encoded.married as f64,
            dependents: encoded.dependents as f64,
            education: encoded.education as f64,
            self_employed: encoded.self_employed as f64,
            applicant_income: self.standardize(0, encoded.applicant_income),
            coapplicant_income: self.standardize(1, encoded.coapplicant_income),
            loan_amount: self.standardize(2, encoded.loan_amount),
            loan_term_days: self.standardize(3, encoded.loan_term_days as f64),
            credit_history: self.standardize(4, encoded.credit_history),
            property_area: encoded.property_area as f64,
            total_income: features.total_income,
            loan_to_income_ratio: features.loan_to_income_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EncodedRecord;

    fn scaler_json(columns: &str) -> String {
        format!(
            r#"{{
                "columns": {columns},
                "mean": [5400.0, 1600.0, 146.0, 342.0, 0.84],
                "scale": [6100.0, 2900.0, 85.0, 65.0, 0.36]
            }}"#
        )
    }

    fn fitted_columns() -> &'static str {
        r#"["ApplicantIncome", "CoapplicantIncome", "LoanAmount", "Loan_Amount_Term", "Credit_History"]"#
    }

    fn features() -> FeatureVector {
        FeatureVector {
            encoded: EncodedRecord {
                gender: 1,
                married: 1,
                dependents: 0,
                education: 0,
                self_employed: 0,
                applicant_income: 6000.0,
                coapplicant_income: 2000.0,
                loan_amount: 180.0,
                loan_term_days: 360,
                credit_history: 1.0,
                property_area: 2,
            },
            total_income: 8000.0,
            loan_to_income_ratio: 180.0 / 8001.0,
        }
    }

    #[test]
    fn test_standardization_arithmetic() {
        let scaler: StandardScaler = serde_json::from_str(&scaler_json(fitted_columns())).unwrap();
        scaler.validate().unwrap();

        let scaled = scaler.transform(&features());
        assert!((scaled.applicant_income - (6000.0 - 5400.0) / 6100.0).abs() < 1e-12);
        assert!((scaled.loan_term_days - (360.0 - 342.0) / 65.0).abs() < 1e-12);
        assert!((scaled.credit_history - (1.0 - 0.84) / 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_untouched_columns_pass_through() {
        let scaler: StandardScaler = serde_json::from_str(&scaler_json(fitted_columns())).unwrap();

        let scaled = scaler.transform(&features());
        assert_eq!(scaled.gender, 1.0);
        assert_eq!(scaled.property_area, 2.0);
        assert_eq!(scaled.total_income, 8000.0);
        assert!((scaled.loan_to_income_ratio - 180.0 / 8001.0).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_column_set_fails_validation() {
        let wrong = r#"["ApplicantIncome", "CoapplicantIncome", "LoanAmount", "Loan_Amount_Term", "Total_Income"]"#;
        let scaler: StandardScaler = serde_json::from_str(&scaler_json(wrong)).unwrap();
        assert!(scaler.validate().is_err());
    }
}
