/*!
 * Remote neural MT backend.
 *
 * Talks to a model server that hosts one translation model per request
 * `model` field. The server expects language tags in the convention of the
 * model family, so tagging happens here and never leaks to callers.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

use crate::errors::BackendError;
use crate::language_utils::{Direction, base_code};
use crate::providers::{ModelFamily, TranslationBackend};
use crate::translation::concurrency::InvocationProfile;

/// Translate request for the model server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferenceRequest {
    /// Model name on the server (e.g. "Helsinki-NLP/opus-mt-tc-big-lt-en")
    pub model: String,
    /// Text to translate
    pub text: String,
    /// Source language tag in the family's convention
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_lang: Option<String>,
    /// Target language tag in the family's convention
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tgt_lang: Option<String>,
}

/// Translate response from the model server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    /// Decoded translation
    pub translation: String,
}

impl ModelFamily {
    /// Language tag expected by this family for a declared or requested tag.
    ///
    /// Marian models are bilingual and take no tag; M2M100 uses bare codes;
    /// mBART-50 uses locale codes, where Lithuanian is `lt_LT` and other
    /// languages fall back to the `_XX` form.
    fn language_tag(&self, tag: &str) -> Option<String> {
        let base = base_code(tag);
        match self {
            ModelFamily::Marian => None,
            ModelFamily::M2m100 => Some(base),
            ModelFamily::Mbart50ManyToOne | ModelFamily::Mbart50OneToMany => {
                if let Some((_, suffix)) = tag.trim().split_once('_') {
                    return Some(format!("{}_{}", base, suffix.to_uppercase()));
                }
                if base == "lt" {
                    Some("lt_LT".to_string())
                } else {
                    Some(format!("{}_XX", base))
                }
            }
        }
    }
}

/// Backend driving one model on a model server
#[derive(Debug)]
pub struct RemoteModelBackend {
    /// Registry identifier
    id: String,
    /// Model name sent to the server
    model_name: String,
    /// Model family, decides language tagging
    family: ModelFamily,
    /// Declared directions (tags as the model knows them)
    directions: Vec<Direction>,
    /// Base URL of the model server
    base_url: Url,
    /// HTTP client for making requests
    client: Client,
    /// Per-call timeout
    timeout: Duration,
    /// In-flight call slots, sized from the family profile
    permits: Semaphore,
    /// Number of slots
    max_in_flight: usize,
}

impl RemoteModelBackend {
    /// Create a backend for `model_name` served at `endpoint`, bounding
    /// every call by `timeout`
    pub fn new(
        id: impl Into<String>,
        model_name: impl Into<String>,
        family: ModelFamily,
        directions: Vec<Direction>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(endpoint)
        } else {
            Url::parse(&format!("http://{}", endpoint))
        }
        .with_context(|| format!("Invalid model server endpoint: {}", endpoint))?;

        let max_in_flight = InvocationProfile::for_family(family).max_in_flight;

        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            id: id.into(),
            model_name: model_name.into(),
            family,
            directions,
            base_url,
            client,
            timeout,
            permits: Semaphore::new(max_in_flight),
            max_in_flight,
        })
    }

    /// Calls this backend serves at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Model family of this backend
    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// Model name sent to the server
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Build the request for `text` along `direction`, tagging languages
    /// with the declared variant when one matches
    pub fn build_request(&self, text: &str, direction: &Direction) -> InferenceRequest {
        let declared = self
            .directions
            .iter()
            .find(|d| d.matches(direction))
            .cloned()
            .unwrap_or_else(|| direction.clone());

        InferenceRequest {
            model: self.model_name.clone(),
            text: text.to_string(),
            src_lang: self.family.language_tag(declared.source()),
            tgt_lang: self.family.language_tag(declared.target()),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url.join(path).map_err(|e| BackendError::Request {
            backend: self.id.clone(),
            message: e.to_string(),
        })
    }

    fn request_error(&self, error: reqwest::Error) -> BackendError {
        if error.is_timeout() {
            BackendError::Timeout {
                backend: self.id.clone(),
                timeout: self.timeout,
            }
        } else {
            BackendError::Request {
                backend: self.id.clone(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl TranslationBackend for RemoteModelBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn directions(&self) -> &[Direction] {
        &self.directions
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn translate(&self, text: &str, direction: &Direction) -> Result<String, BackendError> {
        if !self.supports(direction) {
            return Err(BackendError::UnsupportedDirection {
                backend: self.id.clone(),
                direction: direction.clone(),
            });
        }

        // The semaphore is never closed
        let _permit = self.permits.acquire().await.map_err(|e| BackendError::Request {
            backend: self.id.clone(),
            message: e.to_string(),
        })?;

        let url = self.endpoint("translate")?;
        let request = self.build_request(text, direction);
        debug!(
            "[{}] POST {} ({:?} -> {:?})",
            self.id, url, request.src_lang, request.tgt_lang
        );

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("[{}] model server error ({}): {}", self.id, status, error_text);
            return Err(BackendError::Invocation {
                backend: self.id.clone(),
                message: format!("{}: {}", status, error_text),
            });
        }

        let body: InferenceResponse = response.json().await.map_err(|e| {
            BackendError::InvalidResponse {
                backend: self.id.clone(),
                message: e.to_string(),
            }
        })?;

        Ok(body.translation.trim().to_string())
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        let url = self.endpoint("health")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Invocation {
                backend: self.id.clone(),
                message: format!("health check returned {}", response.status()),
            })
        }
    }
}
