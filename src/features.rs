//! Derived feature computation for loan eligibility inference.
//!
//! Reproduces the feature engineering applied during model training; the
//! formulas here must stay in lockstep with the training pipeline or the
//! classifier silently receives inputs it was never fitted on.

use crate::types::{EncodedRecord, FeatureVector};

/// Computes the derived features the classifier was trained with.
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Create a new feature engineer.
    pub fn new() -> Self {
        Self
    }

    /// Compute the derived features for an encoded record.
    ///
    /// `Total_Income` is the applicant and co-applicant incomes summed.
    /// The loan-to-income ratio divides the loan amount by
    /// `Total_Income + 1`; the `+ 1` keeps the denominator nonzero when
    /// both incomes are zero, and any non-finite result is replaced with 0
    /// so nothing downstream ever sees NaN or infinity.
    pub fn engineer(&self, encoded: EncodedRecord) -> FeatureVector {
        let total_income = encoded.applicant_income + encoded.coapplicant_income;

        let ratio = encoded.loan_amount / (total_income + 1.0);
        let loan_to_income_ratio = if ratio.is_finite() { ratio } else { 0.0 };

        FeatureVector {
            encoded,
            total_income,
            loan_to_income_ratio,
        }
    }
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new()
    }
}
