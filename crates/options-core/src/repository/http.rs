//! HTTP Options Repository
//!
//! reqwest client for the `/options` REST routes.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::{RepositoryError, RepositoryResult};
use super::traits::OptionsRepository;
use crate::config::ApiConfig;
use crate::domain::{OptionId, OptionItem, OptionPayload, OptionType, TypeDescriptor};

/// Responses come either bare or wrapped in `{"data": ...}`
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } | Envelope::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> RepositoryResult<T> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(Envelope::into_inner)
        .map_err(|e| RepositoryError::Decode(e.to_string()))
}

/// Best human readable message for a failed response
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let text = body.trim();
    if !text.is_empty() && !text.starts_with('<') {
        return text.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

/// REST implementation of [`OptionsRepository`]
#[derive(Debug, Clone)]
pub struct HttpOptionsRepository {
    client: reqwest::Client,
    base: Url,
    auth_token: Option<String>,
}

impl HttpOptionsRepository {
    pub fn new(config: &ApiConfig) -> RepositoryResult<Self> {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: &ApiConfig, client: reqwest::Client) -> RepositoryResult<Self> {
        let config = config
            .clone()
            .validate()
            .map_err(|e| RepositoryError::InvalidConfig(e.to_string()))?;
        let base = config
            .base()
            .map_err(|e| RepositoryError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            client,
            base,
            auth_token: config.auth_token,
        })
    }

    /// `{base}/seg/seg...` with every segment percent-encoded
    pub(crate) fn endpoint(&self, segments: &[&str]) -> RepositoryResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RepositoryError::InvalidConfig(format!("{} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn options_url(
        &self,
        option_type: &OptionType,
        parent: Option<&OptionId>,
    ) -> RepositoryResult<Url> {
        let mut url = self.endpoint(&["options"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("type", &option_type.tag());
            if let Some(parent) = parent {
                query.append_pair("parent", parent.as_str());
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> RepositoryResult<(StatusCode, String)> {
        let response: Response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        missing: Option<&OptionId>,
    ) -> RepositoryResult<T> {
        let (status, body) = self.send(builder).await?;
        check_status(status, &body, missing)?;
        decode_body(&body)
    }
}

fn check_status(status: StatusCode, body: &str, missing: Option<&OptionId>) -> RepositoryResult<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = missing {
            return Err(RepositoryError::NotFound(id.clone()));
        }
    }
    let message = error_message(status, body);
    warn!("[OPTIONS] {} {}", status.as_u16(), message);
    Err(RepositoryError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl OptionsRepository for HttpOptionsRepository {
    async fn list_types(&self) -> RepositoryResult<Vec<TypeDescriptor>> {
        let url = self.endpoint(&["options", "types"])?;
        debug!("[OPTIONS] GET {}", url);
        self.fetch(self.request(Method::GET, url), None).await
    }

    async fn list_options(
        &self,
        option_type: &OptionType,
        parent: Option<&OptionId>,
    ) -> RepositoryResult<Vec<OptionItem>> {
        let url = self.options_url(option_type, parent)?;
        debug!("[OPTIONS] GET {}", url);
        self.fetch(self.request(Method::GET, url), None).await
    }

    async fn upsert_option(
        &self,
        id: Option<&OptionId>,
        payload: &OptionPayload,
    ) -> RepositoryResult<OptionItem> {
        let (method, url) = match id {
            Some(id) => (Method::PUT, self.endpoint(&["options", id.as_str()])?),
            None => (Method::POST, self.endpoint(&["options"])?),
        };
        debug!("[OPTIONS] {} {}", method, url);
        let builder = self.request(method, url).json(payload);
        self.fetch(builder, id).await
    }

    async fn delete_option(&self, id: &OptionId) -> RepositoryResult<()> {
        let url = self.endpoint(&["options", id.as_str()])?;
        debug!("[OPTIONS] DELETE {}", url);
        let (status, body) = self.send(self.request(Method::DELETE, url)).await?;
        check_status(status, &body, Some(id))
    }
}
