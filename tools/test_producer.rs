//! Test Application Producer
//!
//! Generates and publishes test loan applications to NATS for pipeline
//! testing.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Application structure matching the pipeline's expected format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoanApplication {
    application_id: String,
    gender: String,
    married: String,
    dependents: String,
    education: String,
    self_employed: String,
    applicant_income: f64,
    coapplicant_income: f64,
    loan_amount: f64,
    loan_term_days: u32,
    credit_history: f64,
    property_area: String,
    timestamp: chrono::DateTime<Utc>,
}

/// Application generator for testing
struct ApplicationGenerator {
    rng: rand::rngs::ThreadRng,
    application_counter: u64,
}

impl ApplicationGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            application_counter: 0,
        }
    }

    /// Generate an applicant profile that historically tends to approve:
    /// solid income, modest loan, clean credit history.
    fn generate_strong(&mut self) -> LoanApplication {
        self.application_counter += 1;

        LoanApplication {
            application_id: format!("app_{:012}", self.application_counter),
            gender: self.random_choice(&["Male", "Female"]).to_string(),
            married: self.random_choice(&["Yes", "No"]).to_string(),
            dependents: self.random_choice(&["0", "1"]).to_string(),
            education: "Graduate".to_string(),
            self_employed: "No".to_string(),
            applicant_income: self.rng.gen_range(4000.0..12000.0),
            coapplicant_income: self.rng.gen_range(0.0..4000.0),
            loan_amount: self.rng.gen_range(80.0..250.0),
            loan_term_days: 360,
            credit_history: 1.0,
            property_area: self
                .random_choice(&["Urban", "Semiurban"])
                .to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Generate a marginal applicant profile: low income, large loan,
    /// short term, missing credit history.
    fn generate_marginal(&mut self) -> LoanApplication {
        self.application_counter += 1;

        LoanApplication {
            application_id: format!("app_{:012}", self.application_counter),
            gender: self.random_choice(&["Male", "Female"]).to_string(),
            married: "No".to_string(),
            dependents: self.random_choice(&["2", "3+"]).to_string(),
            education: self
                .random_choice(&["Graduate", "Not Graduate"])
                .to_string(),
            self_employed: "Yes".to_string(),
            applicant_income: self.rng.gen_range(500.0..2500.0),
            coapplicant_income: 0.0,
            loan_amount: self.rng.gen_range(300.0..700.0),
            loan_term_days: *self.random_choice_of(&[120, 84, 60]),
            credit_history: 0.0,
            property_area: "Rural".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }

    fn random_choice_of<'a, T>(&mut self, choices: &'a [T]) -> &'a T {
        &choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Application Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("loan.applications");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let marginal_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.3);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        marginal_rate = marginal_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            // Continue in dry-run mode
            return run_dry_mode(count, marginal_rate, delay_ms).await;
        }
    };

    // Generate and publish applications
    let mut generator = ApplicationGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} applications...", count);

    let mut strong_count = 0;
    let mut marginal_count = 0;

    for i in 0..count {
        let application = if rng.gen_bool(marginal_rate) {
            marginal_count += 1;
            generator.generate_marginal()
        } else {
            strong_count += 1;
            generator.generate_strong()
        };

        let payload = serde_json::to_vec(&application)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} applications ({} strong, {} marginal)",
                i + 1,
                count,
                strong_count,
                marginal_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Published {} applications ({} strong, {} marginal)",
        count, strong_count, marginal_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, marginal_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = ApplicationGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let application = if rng.gen_bool(marginal_rate) {
            generator.generate_marginal()
        } else {
            generator.generate_strong()
        };

        let json = serde_json::to_string_pretty(&application)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample application {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
