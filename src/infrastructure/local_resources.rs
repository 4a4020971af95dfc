// Filesystem-backed resource store
use crate::application::resource_chain::{ResourceError, ResourceLevel, ResourceSource};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Resources laid out as `<root>/<project>[/<stage>[/<service>]]/<uri>`.
#[derive(Debug, Clone)]
pub struct LocalResourceSource {
    root: PathBuf,
}

impl LocalResourceSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resource_path(&self, level: &ResourceLevel, uri: &str) -> Result<PathBuf, ResourceError> {
        let names: Vec<&str> = match level {
            ResourceLevel::Service {
                project,
                stage,
                service,
            } => vec![project.as_str(), stage.as_str(), service.as_str()],
            ResourceLevel::Stage { project, stage } => vec![project.as_str(), stage.as_str()],
            ResourceLevel::Project { project } => vec![project.as_str()],
        };
        let uri_segments = uri.trim_start_matches('/').split('/');

        let mut path = self.root.clone();
        for segment in names.into_iter().chain(uri_segments) {
            if !is_plain_segment(segment) {
                return Err(ResourceError::RetrievalFailed {
                    uri: uri.to_string(),
                    location: level.to_string(),
                    message: format!("'{}' is not a valid path segment", segment),
                });
            }
            path.push(segment);
        }
        Ok(path)
    }
}

/// Names must stay inside the resource root: no separators, no `.` or `..`.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

#[async_trait]
impl ResourceSource for LocalResourceSource {
    async fn get_resource(&self, level: &ResourceLevel, uri: &str) -> Result<String, ResourceError> {
        let path = self.resource_path(level, uri)?;
        tracing::debug!(path = %path.display(), "Reading resource");

        match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Err(ResourceError::Empty {
                uri: uri.to_string(),
                location: level.to_string(),
            }),
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ResourceError::not_found(uri, level)),
            Err(e) => Err(ResourceError::RetrievalFailed {
                uri: uri.to_string(),
                location: level.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::resource_chain::ResourceChain;
    use std::path::Path;
    use std::sync::Arc;

    const URI: &str = "dynatrace/dynatrace.conf.yaml";

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_reads_service_level_resource() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sockshop/staging/carts/dynatrace/dynatrace.conf.yaml", "dashboard: find\n");
        let source = LocalResourceSource::new(dir.path());
        let level = ResourceLevel::Service {
            project: "sockshop".to_string(),
            stage: "staging".to_string(),
            service: "carts".to_string(),
        };

        let content = source.get_resource(&level, URI).await.unwrap();

        assert_eq!(content, "dashboard: find\n");
    }

    #[tokio::test]
    async fn test_missing_and_empty_resources() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sockshop/dynatrace/dynatrace.conf.yaml", "  \n");
        let source = LocalResourceSource::new(dir.path());

        let stage = ResourceLevel::Stage {
            project: "sockshop".to_string(),
            stage: "staging".to_string(),
        };
        let project = ResourceLevel::Project {
            project: "sockshop".to_string(),
        };

        assert!(matches!(
            source.get_resource(&stage, URI).await,
            Err(ResourceError::NotFound { .. })
        ));
        assert!(matches!(
            source.get_resource(&project, URI).await,
            Err(ResourceError::Empty { .. })
        ));
    }

    #[tokio::test]
    async fn test_names_cannot_leave_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("resources");
        std::fs::create_dir_all(&root).unwrap();
        write(dir.path(), "dynatrace/dynatrace.conf.yaml", "dtCreds: other-tenant\n");
        let chain = ResourceChain::new(Arc::new(LocalResourceSource::new(&root)));

        let escaped = chain.get_resource("..", "", "", URI).await;
        let nested = chain.get_resource("sockshop/..", "staging", "carts", URI).await;
        let backslash = chain.get_resource("sockshop", "..\\..", "carts", URI).await;

        assert!(matches!(escaped, Err(ResourceError::RetrievalFailed { .. })));
        assert!(matches!(nested, Err(ResourceError::RetrievalFailed { .. })));
        assert!(matches!(backslash, Err(ResourceError::RetrievalFailed { .. })));
    }

    #[test]
    fn test_plain_segments() {
        assert!(is_plain_segment("sockshop"));
        assert!(is_plain_segment("dynatrace.conf.yaml"));
        assert!(!is_plain_segment(""));
        assert!(!is_plain_segment("."));
        assert!(!is_plain_segment(".."));
        assert!(!is_plain_segment("a/b"));
        assert!(!is_plain_segment("a\\b"));
    }

    #[tokio::test]
    async fn test_chain_falls_back_to_project_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sockshop/dynatrace/dynatrace.conf.yaml", "dtCreds: prod\n");
        let chain = ResourceChain::new(Arc::new(LocalResourceSource::new(dir.path())));

        let content = chain.get_resource("sockshop", "staging", "carts", URI).await.unwrap();

        assert_eq!(content, "dtCreds: prod\n");
    }
}
