// src/actions.rs
//! Error boundary between the wizard and the remote collaborators. Whatever goes
//! wrong underneath comes back as a `{success: false, message}` envelope.

use crate::estimator::CostEstimator;
use crate::models::{ActionResult, EstimateInput, EstimateOutput, SubmissionData};
use crate::relay::LeadSubmitter;

pub const ESTIMATE_FAILED_MESSAGE: &str = "Failed to generate estimate due to an internal error.";

pub async fn generate_estimate(
    estimator: &dyn CostEstimator,
    input: &EstimateInput,
) -> ActionResult<EstimateOutput> {
    match estimator.estimate(input).await {
        // Total is the sum of the parts whichever estimator produced it.
        Ok(output) => ActionResult::ok(output.with_consistent_total()),
        Err(e) => {
            log::error!("❌ Error generating estimate: {}", e);
            ActionResult::failure(ESTIMATE_FAILED_MESSAGE)
        }
    }
}

pub async fn submit_request(submitter: &dyn LeadSubmitter, data: &SubmissionData) -> ActionResult<()> {
    log::info!("📨 New estimate request received, preparing to submit...");
    match submitter.submit(data).await {
        Ok(message) => ActionResult::done(message),
        Err(e) => {
            log::error!("❌ Submission failed: {}", e);
            ActionResult::failure(format!("Failed to save request: {}", e))
        }
    }
}
