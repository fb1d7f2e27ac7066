//! Simulated CRM collaborator.
//!
//! Stands in for the real CRM endpoint: a fixed latency and a configurable
//! random failure rate, behind the same [`CrmClient`] boundary a production
//! connector would implement.

use async_trait::async_trait;
use pir_core::{CrmClient, CrmError};
use pir_types::PatientRecord;
use rand::Rng;
use std::time::Duration;

const SIMULATED_LATENCY: Duration = Duration::from_millis(1500);

pub struct SimulatedCrm {
    fail_rate: f64,
}

impl SimulatedCrm {
    pub fn new(fail_rate: f64) -> Self {
        Self {
            fail_rate: fail_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl CrmClient for SimulatedCrm {
    async fn push_records(&self, records: &[PatientRecord]) -> Result<(), CrmError> {
        tracing::info!("pushing {} records to the CRM", records.len());
        tokio::time::sleep(SIMULATED_LATENCY).await;

        if rand::thread_rng().gen::<f64>() < self.fail_rate {
            return Err(CrmError::Rejected("Failed to sync with CRM.".to_string()));
        }
        Ok(())
    }
}
