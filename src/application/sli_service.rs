// SLI service - Use case wiring config resources, credentials and the evaluator
use crate::application::credentials::{CredentialError, CredentialFallback, DynatraceCredentials, SecretReader};
use crate::application::dashboard_evaluator::{DashboardEvaluator, EvaluationError};
use crate::application::monitoring_backend::{BackendError, MonitoringBackend};
use crate::application::resource_chain::{ResourceChain, ResourceError};
use crate::domain::evaluation::{DashboardSelection, EvaluationRequest};
use crate::domain::sli::EvaluationReport;
use crate::infrastructure::config::{parse_dynatrace_config, DynatraceConfigFile};
use std::sync::Arc;
use thiserror::Error;

pub const DYNATRACE_CONFIG_URI: &str = "dynatrace/dynatrace.conf.yaml";

#[derive(Debug, Error)]
pub enum SliServiceError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error("could not create backend client: {0}")]
    Connect(BackendError),
}

/// Creates a backend client for one tenant.
pub trait BackendFactory: Send + Sync {
    fn connect(&self, credentials: &DynatraceCredentials) -> Result<Arc<dyn MonitoringBackend>, BackendError>;
}

#[derive(Clone)]
pub struct SliService {
    resources: ResourceChain,
    secrets: Arc<dyn SecretReader>,
    default_secret: String,
    backends: Arc<dyn BackendFactory>,
    evaluator: DashboardEvaluator,
}

impl SliService {
    pub fn new(
        resources: ResourceChain,
        secrets: Arc<dyn SecretReader>,
        default_secret: String,
        backends: Arc<dyn BackendFactory>,
        evaluator: DashboardEvaluator,
    ) -> Self {
        Self {
            resources,
            secrets,
            default_secret,
            backends,
            evaluator,
        }
    }

    pub async fn evaluate(&self, request: EvaluationRequest) -> Result<EvaluationReport, SliServiceError> {
        let service_config = self.load_service_config(&request).await;

        // a dashboard given with the request beats the one from the config resource
        let dashboard = request
            .dashboard
            .clone()
            .or_else(|| DashboardSelection::from_setting(&service_config.dashboard));

        let (credentials, secret) = CredentialFallback::new(self.secrets.as_ref(), &self.default_secret)
            .dynatrace_credentials(&service_config.dt_creds)?;
        tracing::debug!(secret = %secret, tenant = %credentials.tenant, "Using Dynatrace credentials");

        let backend = self.backends.connect(&credentials).map_err(SliServiceError::Connect)?;
        let request = EvaluationRequest { dashboard, ..request };
        Ok(self.evaluator.evaluate(backend, &request).await?)
    }

    async fn load_service_config(&self, request: &EvaluationRequest) -> DynatraceConfigFile {
        let content = self
            .resources
            .get_resource(&request.project, &request.stage, &request.service, DYNATRACE_CONFIG_URI)
            .await;

        let parsed = match content {
            Ok(content) => parse_dynatrace_config(&content).map_err(|e| e.to_string()),
            Err(ResourceError::NotFound { .. }) => {
                tracing::debug!("No {} found, using defaults", DYNATRACE_CONFIG_URI);
                return DynatraceConfigFile::default();
            }
            Err(e) => Err(e.to_string()),
        };

        parsed.unwrap_or_else(|error| {
            tracing::warn!(error = %error, "Failed to load Dynatrace config - will use a default one");
            DynatraceConfigFile::default()
        })
    }
}
