//! Input normalization for incoming loan applications.
//!
//! Validates each numeric field against the domain the application form
//! declares and produces the canonical applicant record. Categorical
//! vocabulary membership is owned by the fitted encoders, not here.

use crate::error::PipelineError;
use crate::types::record::columns;
use crate::types::{ApplicantRecord, LoanApplication};

/// Valid loan terms in days, as offered on the application form.
pub const LOAN_TERMS: [u32; 7] = [360, 120, 180, 240, 300, 84, 60];

/// Upper bound on applicant and co-applicant income, in thousands.
pub const INCOME_MAX: f64 = 100_000.0;

/// Upper bound on the requested loan amount, in thousands.
pub const LOAN_AMOUNT_MAX: f64 = 10_000.0;

/// Validate a raw application and shape it into an [`ApplicantRecord`].
///
/// Pure and side-effect free; the first out-of-domain numeric field fails
/// the request with `InvalidInput`.
pub fn normalize(application: &LoanApplication) -> Result<ApplicantRecord, PipelineError> {
    check_bounded(
        columns::APPLICANT_INCOME,
        application.applicant_income,
        INCOME_MAX,
    )?;
    check_bounded(
        columns::COAPPLICANT_INCOME,
        application.coapplicant_income,
        INCOME_MAX,
    )?;
    check_bounded(columns::LOAN_AMOUNT, application.loan_amount, LOAN_AMOUNT_MAX)?;

    if !LOAN_TERMS.contains(&application.loan_term_days) {
        return Err(PipelineError::InvalidInput {
            field: columns::LOAN_TERM,
            reason: format!(
                "{} is not one of the offered terms {:?}",
                application.loan_term_days, LOAN_TERMS
            ),
        });
    }

    if application.credit_history != 0.0 && application.credit_history != 1.0 {
        return Err(PipelineError::InvalidInput {
            field: columns::CREDIT_HISTORY,
            reason: format!("{} is not 0.0 or 1.0", application.credit_history),
        });
    }

    Ok(ApplicantRecord {
        gender: application.gender.clone(),
        married: application.married.clone(),
        dependents: application.dependents.clone(),
        education: application.education.clone(),
        self_employed: application.self_employed.clone(),
        applicant_income: application.applicant_income,
        coapplicant_income: application.coapplicant_income,
        loan_amount: application.loan_amount,
        loan_term_days: application.loan_term_days,
        credit_history: application.credit_history,
        property_area: application.property_area.clone(),
    })
}

fn check_bounded(field: &'static str, value: f64, max: f64) -> Result<(), PipelineError> {
    if !value.is_finite() {
        return Err(PipelineError::InvalidInput {
            field,
            reason: format!("{value} is not a finite number"),
        });
    }
    if value < 0.0 {
        return Err(PipelineError::InvalidInput {
            field,
            reason: format!("{value} is negative"),
        });
    }
    if value > max {
        return Err(PipelineError::InvalidInput {
            field,
            reason: format!("{value} exceeds the maximum of {max}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_application_normalizes() {
        let app = LoanApplication::sample("app_1".to_string());
        let record = normalize(&app).unwrap();

        assert_eq!(record.applicant_income, 6000.0);
        assert_eq!(record.loan_term_days, 360);
        assert_eq!(record.gender, "Male");
    }

    #[test]
    fn test_negative_income_is_invalid() {
        let mut app = LoanApplication::sample("app_1".to_string());
        app.applicant_income = -1.0;

        match normalize(&app).unwrap_err() {
            PipelineError::InvalidInput { field, .. } => assert_eq!(field, "ApplicantIncome"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_loan_amount_over_bound_is_invalid() {
        let mut app = LoanApplication::sample("app_1".to_string());
        app.loan_amount = 10_001.0;
        assert!(normalize(&app).is_err());
    }

    #[test]
    fn test_unlisted_loan_term_is_invalid() {
        let mut app = LoanApplication::sample("app_1".to_string());
        app.loan_term_days = 90;

        match normalize(&app).unwrap_err() {
            PipelineError::InvalidInput { field, .. } => assert_eq!(field, "Loan_Amount_Term"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_fractional_credit_history_is_invalid() {
        let mut app = LoanApplication::sample("app_1".to_string());
        app.credit_history = 0.5;
        assert!(normalize(&app).is_err());
    }

    #[test]
    fn test_non_finite_income_is_invalid() {
        let mut app = LoanApplication::sample("app_1".to_string());
        app.coapplicant_income = f64::NAN;
        assert!(normalize(&app).is_err());
    }

    #[test]
    fn test_unvalidated_categoricals_pass_through() {
        // Vocabulary checks belong to the fitted encoders.
        let mut app = LoanApplication::sample("app_1".to_string());
        app.gender = "Other".to_string();
        assert!(normalize(&app).is_ok());
    }
}
