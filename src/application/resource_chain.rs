// Service -> stage -> project resource lookup
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLevel {
    Service {
        project: String,
        stage: String,
        service: String,
    },
    Stage {
        project: String,
        stage: String,
    },
    Project {
        project: String,
    },
}

impl fmt::Display for ResourceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLevel::Service {
                project,
                stage,
                service,
            } => write!(f, "for service '{}' at stage '{}' of project '{}'", service, stage, project),
            ResourceLevel::Stage { project, stage } => write!(f, "at stage '{}' of project '{}'", stage, project),
            ResourceLevel::Project { project } => write!(f, "of project '{}'", project),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("could not find resource '{uri}' {location}")]
    NotFound { uri: String, location: String },
    #[error("found resource '{uri}' {location}, but it is empty")]
    Empty { uri: String, location: String },
    #[error("could not retrieve resource '{uri}' {location}: {message}")]
    RetrievalFailed {
        uri: String,
        location: String,
        message: String,
    },
}

impl ResourceError {
    pub fn not_found(uri: &str, level: &ResourceLevel) -> Self {
        ResourceError::NotFound {
            uri: uri.to_string(),
            location: level.to_string(),
        }
    }
}

#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// Read one resource at exactly this level; no fallback.
    async fn get_resource(&self, level: &ResourceLevel, uri: &str) -> Result<String, ResourceError>;
}

/// Asks the source level by level and stops at the first outcome that is not
/// "not found". Levels with an empty name are skipped.
#[derive(Clone)]
pub struct ResourceChain {
    source: Arc<dyn ResourceSource>,
}

impl ResourceChain {
    pub fn new(source: Arc<dyn ResourceSource>) -> Self {
        Self { source }
    }

    pub async fn get_resource(
        &self,
        project: &str,
        stage: &str,
        service: &str,
        uri: &str,
    ) -> Result<String, ResourceError> {
        let mut levels = Vec::with_capacity(3);
        if !project.is_empty() && !stage.is_empty() && !service.is_empty() {
            levels.push(ResourceLevel::Service {
                project: project.to_string(),
                stage: stage.to_string(),
                service: service.to_string(),
            });
        }
        if !project.is_empty() && !stage.is_empty() {
            levels.push(ResourceLevel::Stage {
                project: project.to_string(),
                stage: stage.to_string(),
            });
        }
        if !project.is_empty() {
            levels.push(ResourceLevel::Project {
                project: project.to_string(),
            });
        }

        for level in &levels {
            match self.source.get_resource(level, uri).await {
                Err(ResourceError::NotFound { .. }) => {
                    tracing::debug!(uri, level = %level, "Resource not available");
                }
                Ok(content) => {
                    tracing::info!(uri, level = %level, "Found resource");
                    return Ok(content);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(uri, project, stage, service, "Resource not found on any level");
        Err(ResourceError::NotFound {
            uri: uri.to_string(),
            location: format!("for service '{}' at stage '{}' of project '{}'", service, stage, project),
        })
    }
}
