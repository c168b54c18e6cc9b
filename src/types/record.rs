//! Intermediate pipeline records and the canonical feature column names.

/// Column names as the classifier saw them at training time.
///
/// The aligner resolves the classifier's declared feature schema against
/// these names; anything else is a schema mismatch.
pub mod columns {
    pub const GENDER: &str = "Gender";
    pub const MARRIED: &str = "Married";
    pub const DEPENDENTS: &str = "Dependents";
    pub const EDUCATION: &str = "Education";
    pub const SELF_EMPLOYED: &str = "Self_Employed";
    pub const APPLICANT_INCOME: &str = "ApplicantIncome";
    pub const COAPPLICANT_INCOME: &str = "CoapplicantIncome";
    pub const LOAN_AMOUNT: &str = "LoanAmount";
    pub const LOAN_TERM: &str = "Loan_Amount_Term";
    pub const CREDIT_HISTORY: &str = "Credit_History";
    pub const PROPERTY_AREA: &str = "Property_Area";
    pub const TOTAL_INCOME: &str = "Total_Income";
    pub const LOAN_TO_INCOME: &str = "ApplicantIncome_to_LoanAmount";
}

/// The numeric subset the scaler was fitted on, in training order.
pub const NUMERIC_COLUMNS: [&str; 5] = [
    columns::APPLICANT_INCOME,
    columns::COAPPLICANT_INCOME,
    columns::LOAN_AMOUNT,
    columns::LOAN_TERM,
    columns::CREDIT_HISTORY,
];

/// Applicant record with categorical fields replaced by their fitted
/// integer codes.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    pub gender: i64,
    pub married: i64,
    pub dependents: i64,
    pub education: i64,
    pub self_employed: i64,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub loan_amount: f64,
    pub loan_term_days: u32,
    pub credit_history: f64,
    pub property_area: i64,
}

/// Encoded record plus the derived features computed at training time.
///
/// `loan_to_income_ratio` is always finite once the feature engineer has
/// run; no NaN or infinity ever reaches the scaler or the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub encoded: EncodedRecord,
    pub total_income: f64,
    pub loan_to_income_ratio: f64,
}

/// The full 13-column feature set with the numeric subset standardized.
///
/// Columns are addressed by training name so the aligner can emit them in
/// whatever order the classifier declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledFeatureVector {
    pub gender: f64,
    pub married: f64,
    pub dependents: f64,
    pub education: f64,
    pub self_employed: f64,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub loan_amount: f64,
    pub loan_term_days: f64,
    pub credit_history: f64,
    pub property_area: f64,
    pub total_income: f64,
    pub loan_to_income_ratio: f64,
}

impl ScaledFeatureVector {
    /// Total number of columns the classifier expects.
    pub const COLUMN_COUNT: usize = 13;

    /// Look up a column value by its training-time name.
    pub fn column(&self, name: &str) -> Option<f64> {
        match name {
            columns::GENDER => Some(self.gender),
            columns::MARRIED => Some(self.married),
            columns::DEPENDENTS => Some(self.dependents),
            columns::EDUCATION => Some(self.education),
            columns::SELF_EMPLOYED => Some(self.self_employed),
            columns::APPLICANT_INCOME => Some(self.applicant_income),
            columns::COAPPLICANT_INCOME => Some(self.coapplicant_income),
            columns::LOAN_AMOUNT => Some(self.loan_amount),
            columns::LOAN_TERM => Some(self.loan_term_days),
            columns::CREDIT_HISTORY => Some(self.credit_history),
            columns::PROPERTY_AREA => Some(self.property_area),
            columns::TOTAL_INCOME => Some(self.total_income),
            columns::LOAN_TO_INCOME => Some(self.loan_to_income_ratio),
            _ => None,
        }
    }

    /// All column names, in the canonical training layout.
    pub fn column_names() -> [&'static str; Self::COLUMN_COUNT] {
        [
            columns::GENDER,
            columns::MARRIED,
            columns::DEPENDENTS,
            columns::EDUCATION,
            columns::SELF_EMPLOYED,
            columns::APPLICANT_INCOME,
            columns::COAPPLICANT_INCOME,
            columns::LOAN_AMOUNT,
            columns::LOAN_TERM,
            columns::CREDIT_HISTORY,
            columns::PROPERTY_AREA,
            columns::TOTAL_INCOME,
            columns::LOAN_TO_INCOME,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vector() -> ScaledFeatureVector {
        ScaledFeatureVector {
            gender: 1.0,
            married: 1.0,
            dependents: 0.0,
            education: 0.0,
            self_employed: 0.0,
            applicant_income: 0.1,
            coapplicant_income: 0.2,
            loan_amount: 0.3,
            loan_term_days: 0.4,
            credit_history: 0.5,
            property_area: 2.0,
            total_income: 8000.0,
            loan_to_income_ratio: 0.0225,
        }
    }

    #[test]
    fn test_column_lookup() {
        let v = sample_vector();
        assert_eq!(v.column(columns::GENDER), Some(1.0));
        assert_eq!(v.column(columns::LOAN_TO_INCOME), Some(0.0225));
        assert_eq!(v.column("NotAColumn"), None);
    }

    #[test]
    fn test_every_canonical_name_resolves() {
        let v = sample_vector();
        for name in ScaledFeatureVector::column_names() {
            assert!(v.column(name).is_some(), "unresolved column {name}");
        }
    }
}
