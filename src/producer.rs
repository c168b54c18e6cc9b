//! NATS message producer for loan decisions

use crate::types::decision::{DecisionMessage, ScoreOutcome};
use anyhow::Result;
use async_nats::Client;
use tracing::debug;

/// Producer for publishing decisions to NATS
#[derive(Clone)]
pub struct DecisionProducer {
    client: Client,
    subject: String,
}

impl DecisionProducer {
    /// Create a new decision producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a decision message
    pub async fn publish(&self, decision: &DecisionMessage) -> Result<()> {
        let payload = serde_json::to_vec(decision)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        let status = match decision.outcome {
            ScoreOutcome::Scored { .. } => "scored",
            ScoreOutcome::Failed { .. } => "failed",
        };
        debug!(
            decision_id = %decision.decision_id,
            application_id = %decision.application_id,
            status = status,
            "Published decision"
        );

        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
