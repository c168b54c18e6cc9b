//! Loan Eligibility Pipeline - Main Entry Point
//!
//! Consumes loan applications from NATS, runs the scoring pipeline, and
//! publishes decisions. Supports parallel application processing.

use anyhow::Result;
use futures::StreamExt;
use loan_eligibility_pipeline::{
    config::AppConfig,
    consumer::ApplicationConsumer,
    metrics::{MetricsReporter, PipelineMetrics},
    pipeline::ScoringPipeline,
    producer::DecisionProducer,
    types::DecisionMessage,
    ArtifactLoader, LoanApplication,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("loan_eligibility_pipeline=info".parse()?),
        )
        .init();

    info!("Starting Loan Eligibility Pipeline");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Initialize metrics
    let metrics = Arc::new(PipelineMetrics::new());

    // Load the pre-fitted artifacts once; they stay read-only for the
    // process lifetime.
    let loader = ArtifactLoader::with_threads(config.artifacts.onnx_threads)?;
    let bundle = loader.load(&config.artifacts)?;
    let pipeline = Arc::new(ScoringPipeline::new(bundle));
    info!(
        "Scoring pipeline initialized ({} features)",
        pipeline.feature_count()
    );

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    // Initialize consumer and producer
    let consumer = ApplicationConsumer::new(client.clone(), &config.nats.application_subject);
    let producer = Arc::new(DecisionProducer::new(
        client.clone(),
        &config.nats.decision_subject,
    ));

    let num_workers = config.pipeline.workers;
    info!(
        "Starting application processing loop with {} parallel workers",
        num_workers
    );
    info!("Listening on subject: {}", config.nats.application_subject);
    info!("Publishing decisions to: {}", config.nats.decision_subject);

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Process applications in parallel
    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        // Acquire permit (limits concurrent tasks)
        let permit = semaphore.clone().acquire_owned().await.unwrap();

        // Clone shared resources for the spawned task
        let pipeline = pipeline.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let processed_count = processed_count.clone();

        // Spawn task to process this application
        tokio::spawn(async move {
            let start_time = Instant::now();

            match serde_json::from_slice::<LoanApplication>(&message.payload) {
                Ok(application) => {
                    let app_id = application.application_id.clone();

                    let reply = match pipeline.score(&application) {
                        Ok(result) => {
                            let processing_time = start_time.elapsed();
                            metrics.record_decision(processing_time, &result);

                            info!(
                                application_id = %app_id,
                                decision = ?result.decision,
                                probability_approved = result.probability_approved,
                                processing_time_us = processing_time.as_micros(),
                                "Application scored"
                            );

                            DecisionMessage::scored(app_id.clone(), &result)
                        }
                        Err(e) => {
                            metrics.record_error(e.kind());

                            // Recoverable, request-level failure: the reply
                            // names the offending field or category.
                            warn!(
                                application_id = %app_id,
                                kind = e.kind().as_str(),
                                error = %e,
                                "Application rejected by pipeline"
                            );

                            DecisionMessage::failed(app_id.clone(), &e)
                        }
                    };

                    if let Err(e) = producer.publish(&reply).await {
                        error!(
                            application_id = %app_id,
                            error = %e,
                            "Failed to publish decision"
                        );
                    }

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;

                    // Log progress every 100 applications
                    if count % 100 == 0 {
                        let throughput = metrics.get_throughput();
                        let processing_stats = metrics.get_processing_stats();
                        info!(
                            processed = count,
                            throughput = format!("{:.1} app/s", throughput),
                            avg_latency_us = processing_stats.mean_us,
                            "Processing milestone"
                        );
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to deserialize application");
                }
            }

            debug!(elapsed_us = start_time.elapsed().as_micros(), "Worker done");

            // Release permit when done
            drop(permit);
        });
    }

    // Print final summary
    info!("Pipeline shutting down...");
    metrics.print_summary();

    Ok(())
}
