//! Report encoding
//!
//! Wraps an assembled dashboard in a versioned envelope with producer
//! metadata for the presentation layer. The engine defines this report
//! shape only; storage formats belong to the collaborators.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dashboard::Dashboard;
use crate::error::EngineError;
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Producer metadata embedded in every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Versioned dashboard report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub report_version: String,
    pub producer: ReportProducer,
    pub generated_at_utc: String,
    pub dashboard: Dashboard,
}

/// Encoder stamping dashboards into reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with a unique instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID.
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Wrap a dashboard in the report envelope.
    pub fn encode(&self, dashboard: Dashboard) -> Report {
        Report {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            generated_at_utc: Utc::now().to_rfc3339(),
            dashboard,
        }
    }

    /// Encode to pretty-printed JSON.
    pub fn encode_to_json(&self, dashboard: Dashboard) -> Result<String, EngineError> {
        let report = self.encode(dashboard);
        serde_json::to_string_pretty(&report).map_err(EngineError::Json)
    }
}
