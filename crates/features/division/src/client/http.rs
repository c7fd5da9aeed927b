use crate::client::engine::{DivisionEngine, ExportFile};
use crate::client::error::DivisionError;
use cohort_domain::config::ClientConfig;
use cohort_domain::division::{
    ConfirmRequest, ConfirmResponse, DivisionConfig, DivisionJob, ErrorBody, Subgroup,
    UndoResponse,
};
use reqwest::{Client, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_EXPORT_TYPE: &str = "text/csv";

/// [`DivisionEngine`] over the engine's REST API, scoped to one group.
///
/// Every request is bounded by `timeout_seconds`; expiry surfaces as
/// [`DivisionError::Transport`].
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
    base_url: String,
    group_id: u64,
}

impl HttpEngine {
    /// # Errors
    /// [`DivisionError::Internal`] if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, DivisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DivisionError::Internal {
                message: e.to_string().into(),
                context: Some("Failed to build HTTP client".into()),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            group_id: config.group_id,
        })
    }

    #[must_use]
    pub const fn group_id(&self) -> u64 {
        self.group_id
    }

    fn url(&self, action: &str) -> String {
        format!("{}/groups/{}/subgroups{action}", self.base_url, self.group_id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DivisionError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        debug!(%status, url = %response.url(), "Division engine answered");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.map_err(transport_error)?;
        match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) => Err(DivisionError::Domain { message: error.into(), context: None }),
            Err(_) => Err(DivisionError::transport(format!("unexpected response (HTTP {status})"))),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DivisionError> {
        let body = self.send(request).await?.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body)
            .map_err(|e| DivisionError::transport(format!("malformed response: {e}")))
    }
}

impl DivisionEngine for HttpEngine {
    #[instrument(skip_all, fields(group_id = self.group_id))]
    async fn generate(&self, config: &DivisionConfig) -> Result<DivisionJob, DivisionError> {
        self.send_json(self.client.post(self.url("/generate")).json(config)).await
    }

    #[instrument(skip(self), fields(group_id = self.group_id))]
    async fn confirm(&self, job_id: &str) -> Result<ConfirmResponse, DivisionError> {
        let body = ConfirmRequest { job_id: job_id.to_owned() };
        self.send_json(self.client.post(self.url("/confirm")).json(&body)).await
    }

    #[instrument(skip(self), fields(group_id = self.group_id))]
    async fn undo(&self) -> Result<UndoResponse, DivisionError> {
        self.send_json(self.client.post(self.url("/undo"))).await
    }

    #[instrument(skip(self), fields(group_id = self.group_id))]
    async fn export(&self, job_id: &str) -> Result<ExportFile, DivisionError> {
        let request = self.client.get(self.url("/export")).query(&[("job_id", job_id)]);
        let response = self.send(request).await?;

        let headers = response.headers();
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_EXPORT_TYPE)
            .to_owned();
        let filename = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename)
            .unwrap_or_else(|| format!("subgroups_group_{}.csv", self.group_id));

        let bytes = response.bytes().await.map_err(transport_error)?.to_vec();
        Ok(ExportFile { filename, content_type, bytes })
    }

    #[instrument(skip(self), fields(group_id = self.group_id))]
    async fn list_subgroups(&self) -> Result<Vec<Subgroup>, DivisionError> {
        self.send_json(self.client.get(self.url(""))).await
    }
}

fn transport_error(err: reqwest::Error) -> DivisionError {
    let message = if err.is_timeout() {
        "request timed out".to_owned()
    } else if err.is_connect() {
        "connection failed".to_owned()
    } else {
        err.to_string()
    };
    DivisionError::transport(message)
}

/// `attachment; filename="x.csv"` to `x.csv`. Only the final path component is kept, so the
/// result never leaves the working directory.
fn attachment_filename(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("filename="))
        .find_map(|name| {
            let name = name.trim_matches('"').rsplit(['/', '\\']).next()?;
            let name = Path::new(name).file_name()?.to_str()?;
            (!name.is_empty() && name != "..").then(|| name.to_owned())
        })
}
