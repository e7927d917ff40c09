use async_trait::async_trait;
use planpin_core::error::GatewayError;
use planpin_core::sync::{ConnectivityProbe, Gateway};
use planpin_proto::{FloorPlanVersion, FormResponseRow, MarkupRow, PinRow};
use serde::Serialize;
use uuid::Uuid;

/// REST gateway speaking the PostgREST/storage dialect of the backend.
///
/// Row inserts go to `POST {base}/rest/v1/{table}`, file uploads to the
/// storage endpoint; every call authenticates with the configured API key.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key).header("apikey", key.as_str()),
            None => request,
        }
    }

    async fn insert_rows<T: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &T,
    ) -> Result<(), GatewayError> {
        let response = self
            .with_auth(self.client.post(self.rest_url(table)))
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(GatewayError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn insert_pin_batch(&self, rows: &[PinRow]) -> Result<(), GatewayError> {
        self.insert_rows("pins", rows).await
    }

    async fn insert_form_response(&self, row: &FormResponseRow) -> Result<(), GatewayError> {
        self.insert_rows("form_responses", row).await
    }

    async fn insert_markups(&self, rows: &[MarkupRow]) -> Result<(), GatewayError> {
        self.insert_rows("markups", rows).await
    }

    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let response = self
            .with_auth(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        ))
    }

    async fn list_floor_plan_versions(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<FloorPlanVersion>, GatewayError> {
        let url = format!(
            "{}?project_id=eq.{}&order=version_number.asc",
            self.rest_url("floor_plan_versions"),
            project_id
        );
        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }

    async fn insert_floor_plan_version(&self, row: &FloorPlanVersion) -> Result<(), GatewayError> {
        self.insert_rows("floor_plan_versions", row).await
    }
}

/// Probe that reports online when the backend health endpoint answers.
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    health_url: String,
}

impl HttpProbe {
    pub fn new(health_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            health_url,
        }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn is_online(&self) -> bool {
        match self.client.get(&self.health_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
