use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::DomainError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    async fn post_form(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError>;

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError>;

    async fn get_text(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<String, DomainError>;

    async fn get_bytes(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<Bytes, DomainError>;
}

#[async_trait]
impl<T: HttpClientTrait + ?Sized> HttpClientTrait for std::sync::Arc<T> {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        (**self).post_json(url, headers, body).await
    }

    async fn post_form(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError> {
        (**self).post_form(url, headers, form).await
    }

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError> {
        (**self).get_json(url, headers).await
    }

    async fn get_text(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<String, DomainError> {
        (**self).get_text(url, headers).await
    }

    async fn get_bytes(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<Bytes, DomainError> {
        (**self).get_bytes(url, headers).await
    }
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::with_timeout(std::time::Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    fn apply_headers(
        mut request: reqwest::RequestBuilder,
        headers: Vec<(&str, &str)>,
    ) -> reqwest::RequestBuilder {
        for (key, value) in headers {
            request = request.header(key, value);
        }

        request
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::internal(format!(
                "HTTP {}: {}",
                status, error_body
            )));
        }

        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let request = Self::apply_headers(self.client.post(url), headers);

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("Request failed: {}", e)))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to parse response: {}", e)))
    }

    async fn post_form(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError> {
        let request = Self::apply_headers(self.client.post(url), headers);

        let response = request
            .form(form)
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("Request failed: {}", e)))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to parse response: {}", e)))
    }

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError> {
        let request = Self::apply_headers(self.client.get(url), headers);

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("Request failed: {}", e)))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to parse response: {}", e)))
    }

    async fn get_text(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<String, DomainError> {
        let request = Self::apply_headers(self.client.get(url), headers);

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("Request failed: {}", e)))?;

        Self::check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to read response body: {}", e)))
    }

    async fn get_bytes(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<Bytes, DomainError> {
        let request = Self::apply_headers(self.client.get(url), headers);

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("Request failed: {}", e)))?;

        Self::check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to read response body: {}", e)))
    }
}
