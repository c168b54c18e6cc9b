//! Pre-fitted categorical encoders.
//!
//! Each categorical field carries its own label-to-code mapping, fixed at
//! training time. A label that was not seen during training is a reported
//! error, never a guessed code.

use crate::error::PipelineError;
use crate::types::record::columns;
use crate::types::{ApplicantRecord, EncodedRecord};
use serde::Deserialize;
use std::collections::HashMap;

/// Fitted label encoder for one categorical field.
///
/// `classes` is the sorted class list the encoder was fitted on; the code
/// for a label is its index in that list.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder from its fitted class list.
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Map a label to its fitted integer code.
    pub fn transform(&self, field: &'static str, label: &str) -> Result<i64, PipelineError> {
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|idx| idx as i64)
            .ok_or_else(|| PipelineError::UnknownCategory {
                field,
                label: label.to_string(),
            })
    }

    /// The fitted vocabulary.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// The full set of per-field encoders the pipeline needs.
#[derive(Debug, Clone)]
pub struct EncoderSet {
    gender: LabelEncoder,
    married: LabelEncoder,
    dependents: LabelEncoder,
    education: LabelEncoder,
    self_employed: LabelEncoder,
    property_area: LabelEncoder,
}

impl EncoderSet {
    /// Assemble the encoder set from a field-name-to-classes map, as stored
    /// in the encoders artifact. Every categorical field must be present.
    pub fn from_classes(mut classes: HashMap<String, Vec<String>>) -> anyhow::Result<Self> {
        let mut take = |field: &str| -> anyhow::Result<LabelEncoder> {
            classes
                .remove(field)
                .map(LabelEncoder::new)
                .ok_or_else(|| anyhow::anyhow!("encoders artifact is missing field '{}'", field))
        };

        Ok(Self {
            gender: take(columns::GENDER)?,
            married: take(columns::MARRIED)?,
            dependents: take(columns::DEPENDENTS)?,
            education: take(columns::EDUCATION)?,
            self_employed: take(columns::SELF_EMPLOYED)?,
            property_area: take(columns::PROPERTY_AREA)?,
        })
    }

    /// Encode every categorical field of a validated record.
    ///
    /// Read-only lookups against the fitted vocabularies; fails on the
    /// first out-of-vocabulary label with the field name attached.
    pub fn encode(&self, record: &ApplicantRecord) -> Result<EncodedRecord, PipelineError> {
        Ok(EncodedRecord {
            gender: self.gender.transform(columns::GENDER, &record.gender)?,
            married: self.married.transform(columns::MARRIED, &record.married)?,
            dependents: self
                .dependents
                .transform(columns::DEPENDENTS, &record.dependents)?,
            education: self
                .education
                .transform(columns::EDUCATION, &record.education)?,
            self_employed: self
                .self_employed
                .transform(columns::SELF_EMPLOYED, &record.self_employed)?,
            property_area: self
                .property_area
                .transform(columns::PROPERTY_AREA, &record.property_area)?,
            applicant_income: record.applicant_income,
            coapplicant_income: record.coapplicant_income,
            loan_amount: record.loan_amount,
            loan_term_days: record.loan_term_days,
            credit_history: record.credit_history,
        })
    }
}
