//! Loan application data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A loan application submitted for eligibility scoring.
///
/// Field aliases match the column names of the training dataset so that
/// callers may submit either snake_case or training-style keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Unique application identifier
    #[serde(alias = "ID")]
    pub application_id: String,

    /// Applicant gender ("Male" / "Female")
    #[serde(alias = "Gender")]
    pub gender: String,

    /// Marital status ("Yes" / "No")
    #[serde(alias = "Married")]
    pub married: String,

    /// Number of dependents ("0", "1", "2", "3+")
    #[serde(alias = "Dependents")]
    pub dependents: String,

    /// Education level ("Graduate" / "Not Graduate")
    #[serde(alias = "Education")]
    pub education: String,

    /// Self-employment status ("Yes" / "No")
    #[serde(alias = "Self_Employed")]
    pub self_employed: String,

    /// Applicant income, in thousands
    #[serde(alias = "ApplicantIncome")]
    pub applicant_income: f64,

    /// Co-applicant income, in thousands
    #[serde(alias = "CoapplicantIncome")]
    pub coapplicant_income: f64,

    /// Requested loan amount, in thousands
    #[serde(alias = "LoanAmount")]
    pub loan_amount: f64,

    /// Loan term in days (360, 120, 180, 240, 300, 84 or 60)
    #[serde(alias = "Loan_Amount_Term")]
    pub loan_term_days: u32,

    /// Credit history flag (1.0 = meets guidelines, 0.0 = does not)
    #[serde(alias = "Credit_History")]
    pub credit_history: f64,

    /// Property area ("Urban", "Rural", "Semiurban")
    #[serde(alias = "Property_Area")]
    pub property_area: String,

    /// Submission timestamp (optional, for real-time processing)
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl LoanApplication {
    /// Create an application with the profile used throughout the tests:
    /// a married graduate applicant with a clean credit history.
    pub fn sample(application_id: String) -> Self {
        Self {
            application_id,
            gender: "Male".to_string(),
            married: "Yes".to_string(),
            dependents: "0".to_string(),
            education: "Graduate".to_string(),
            self_employed: "No".to_string(),
            applicant_income: 6000.0,
            coapplicant_income: 2000.0,
            loan_amount: 180.0,
            loan_term_days: 360,
            credit_history: 1.0,
            property_area: "Urban".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Canonical validated applicant record.
///
/// Produced by the input normalizer; every numeric field is inside its
/// declared domain. Categorical labels are still raw strings here; their
/// vocabulary is owned by the fitted encoders.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRecord {
    pub gender: String,
    pub married: String,
    pub dependents: String,
    pub education: String,
    pub self_employed: String,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub loan_amount: f64,
    pub loan_term_days: u32,
    pub credit_history: f64,
    pub property_area: String,
}
