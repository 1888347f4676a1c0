//! Remote collaborator clients
//!
//! Shape generation, mesh remediation and the modification feed are plain
//! JSON-over-HTTP endpoints. Each one is optional; an unset URL disables the
//! feature in the UI.

use std::sync::Arc;

use studio_core::{ModificationSink, RemediationService, ShapeService};

use crate::config::ServiceConfig;

/// Configured backend clients
#[derive(Clone, Default)]
pub struct Services {
    pub shape: Option<Arc<dyn ShapeService>>,
    pub remediation: Option<Arc<dyn RemediationService>>,
    pub sink: Option<Arc<dyn ModificationSink>>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("shape", &self.shape.is_some())
            .field("remediation", &self.remediation.is_some())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Services {
    /// Build HTTP clients for every configured endpoint
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_config(config: &ServiceConfig) -> Self {
        let shape = config
            .shape_url
            .as_ref()
            .map(|url| Arc::new(http::HttpShapeService::new(url)) as Arc<dyn ShapeService>);
        let remediation = config.remediation_url.as_ref().map(|url| {
            Arc::new(http::HttpRemediationService::new(url)) as Arc<dyn RemediationService>
        });
        let sink = config.modifications_url.as_ref().map(|url| {
            Arc::new(http::HttpModificationSink::new(url)) as Arc<dyn ModificationSink>
        });
        tracing::info!(
            "Services: shape={}, remediation={}, modifications={}",
            shape.is_some(),
            remediation.is_some(),
            sink.is_some()
        );
        Self {
            shape,
            remediation,
            sink,
        }
    }

    /// Remote services are not available in the browser build
    #[cfg(target_arch = "wasm32")]
    pub fn from_config(config: &ServiceConfig) -> Self {
        if config.shape_url.is_some() || config.remediation_url.is_some() {
            tracing::warn!("Remote services are not supported in WASM");
        }
        Self::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use http::{HttpModificationSink, HttpRemediationService, HttpShapeService};

#[cfg(not(target_arch = "wasm32"))]
mod http {
    use std::time::Duration;

    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use studio_core::{
        GeneratedShape, Modification, ModificationSink, RemediationRequest, RemediationResult,
        RemediationService, ServiceError, ShapeService,
    };

    /// Upper bound on one backend round trip; generation can be slow
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    const USER_AGENT: &str = concat!("design-studio/", env!("CARGO_PKG_VERSION"));

    fn agent() -> ureq::Agent {
        ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into()
    }

    /// Map a transport-level failure onto the service error type
    pub(super) fn map_error(error: ureq::Error) -> ServiceError {
        match error {
            ureq::Error::StatusCode(status) => ServiceError::Status {
                status,
                message: format!("HTTP {}", status),
            },
            ureq::Error::Timeout(_) => ServiceError::Unavailable("request timed out".into()),
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
                ServiceError::Unavailable(error.to_string())
            }
            other => ServiceError::Transport(other.to_string()),
        }
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        agent: &ureq::Agent,
        url: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let response = agent
            .post(url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send_json(body)
            .map_err(map_error)?;
        response
            .into_body()
            .read_json()
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    #[derive(Serialize)]
    struct GenerateRequest<'a> {
        prompt: &'a str,
    }

    /// Text-to-shape backend
    pub struct HttpShapeService {
        url: String,
        agent: ureq::Agent,
    }

    impl HttpShapeService {
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                url: url.into(),
                agent: agent(),
            }
        }
    }

    impl ShapeService for HttpShapeService {
        fn generate(&self, prompt: &str) -> Result<GeneratedShape, ServiceError> {
            tracing::debug!("Requesting shape for '{}' from {}", prompt, self.url);
            let mut shape: GeneratedShape =
                post_json(&self.agent, &self.url, &GenerateRequest { prompt })?;
            if shape.mesh.is_empty() {
                return Err(ServiceError::Decode("response contained no geometry".into()));
            }
            if shape.prompt.is_none() {
                shape.prompt = Some(prompt.to_string());
            }
            Ok(shape)
        }
    }

    /// Mesh repair backend
    pub struct HttpRemediationService {
        url: String,
        agent: ureq::Agent,
    }

    impl HttpRemediationService {
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                url: url.into(),
                agent: agent(),
            }
        }
    }

    impl RemediationService for HttpRemediationService {
        fn remediate(
            &self,
            request: &RemediationRequest,
        ) -> Result<RemediationResult, ServiceError> {
            tracing::debug!(
                "Requesting {} of {} from {}",
                request.operation.label(),
                request.object_id,
                self.url
            );
            let result: RemediationResult = post_json(&self.agent, &self.url, request)?;
            if result.object_id != request.object_id {
                return Err(ServiceError::Decode(format!(
                    "response is for {}, expected {}",
                    result.object_id, request.object_id
                )));
            }
            if result.mesh.is_empty() {
                return Err(ServiceError::Decode("response contained no geometry".into()));
            }
            Ok(result)
        }
    }

    /// Posts every applied modification without blocking the caller
    pub struct HttpModificationSink {
        url: String,
        agent: ureq::Agent,
    }

    impl HttpModificationSink {
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                url: url.into(),
                agent: agent(),
            }
        }
    }

    impl ModificationSink for HttpModificationSink {
        fn notify(&self, modification: &Modification) -> Result<(), ServiceError> {
            let body = modification
                .to_json()
                .map_err(|e| ServiceError::Transport(e.to_string()))?;
            let url = self.url.clone();
            let agent = self.agent.clone();
            std::thread::spawn(move || {
                let result = agent
                    .post(&url)
                    .header("Content-Type", "application/json")
                    .header("User-Agent", USER_AGENT)
                    .send(body.as_str());
                if let Err(e) = result {
                    tracing::warn!("Modification feed rejected update: {}", map_error(e));
                }
            });
            Ok(())
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use studio_core::ServiceError;

    use super::*;

    #[test]
    fn test_status_code_maps_to_status_error() {
        let error = http::map_error(ureq::Error::StatusCode(503));
        assert!(matches!(error, ServiceError::Status { status: 503, .. }));
    }

    #[test]
    fn test_unset_endpoints_disable_services() {
        let services = Services::from_config(&ServiceConfig::default());
        assert!(services.shape.is_none());
        assert!(services.remediation.is_none());
        assert!(services.sink.is_none());
    }

    #[test]
    fn test_configured_endpoints_build_clients() {
        let services = Services::from_config(&ServiceConfig {
            shape_url: Some("http://127.0.0.1:9/shape".into()),
            remediation_url: None,
            modifications_url: Some("http://127.0.0.1:9/modifications".into()),
        });
        assert!(services.shape.is_some());
        assert!(services.remediation.is_none());
        assert!(services.sink.is_some());
    }
}
