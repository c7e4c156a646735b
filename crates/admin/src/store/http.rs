//! `reqwest` implementation of [`RemoteStore`].

use std::sync::Arc;

use async_trait::async_trait;
use kiosk_admin_core::{Kiosk, KioskDraft, KioskId, Product, ProductDraft, ProductId};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::RemoteStore;
use super::types::{
    Envelope, ErrorBody, KiosksResponse, MessageResponse, ProductData, ProductsData, StockUpdate,
    VisibilityUpdate,
};
use crate::config::AdminConfig;
use crate::error::{ClientError, ClientResult};

/// Longest slice of a raw error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Admin API client over HTTP(S).
#[derive(Clone)]
pub struct HttpStore {
    inner: Arc<HttpStoreInner>,
}

struct HttpStoreInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for HttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStore")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpStore {
    /// Create a new admin API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AdminConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = config.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ClientError::InvalidRequest(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpStoreInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and return the status and raw body of a 2xx response.
    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<String> {
        let url = self.url(path);
        let mut request = self.inner.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%method, %url, status = status.as_u16(), "Admin API response");

        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        Ok(text)
    }

    /// Request an enveloped payload and unwrap `data`.
    async fn enveloped<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        expected: &str,
    ) -> ClientResult<T> {
        let text = self.send(method, path, body).await?;
        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            warn!(
                error = %e,
                body = %truncate(&text),
                "Failed to parse admin API response"
            );
            ClientError::Parse(format!("expected {expected}: {e}"))
        })?;

        if envelope.success == Some(false) {
            return Err(ClientError::Api {
                status: StatusCode::OK.as_u16(),
                message: envelope
                    .message
                    .or(envelope.error)
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            });
        }

        envelope
            .data
            .ok_or_else(|| ClientError::Parse(format!("response is missing {expected}")))
    }

    /// Request a mutation whose body is a loose confirmation.
    async fn confirm<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<String> {
        let text = self.send(method, path, body).await?;
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        // Some routes answer with plain text; only JSON bodies are inspected.
        let Ok(confirmation) = serde_json::from_str::<MessageResponse>(&text) else {
            return Ok(text);
        };
        if confirmation.success == Some(false) {
            return Err(ClientError::Api {
                status: StatusCode::OK.as_u16(),
                message: confirmation
                    .error
                    .or(confirmation.message)
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            });
        }
        Ok(confirmation.message.unwrap_or_default())
    }
}

/// Build an `Api` error from a non-2xx response body.
fn api_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            let raw = truncate(body);
            if raw.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                raw
            }
        });
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

const NO_BODY: Option<&()> = None;

#[async_trait]
impl RemoteStore for HttpStore {
    #[instrument(skip(self))]
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let data: ProductsData = self
            .enveloped(Method::GET, "admin/products", NO_BODY, "data.products")
            .await?;
        Ok(data.products)
    }

    #[instrument(skip(self))]
    async fn list_inventory(&self, kiosk: KioskId) -> ClientResult<Vec<Product>> {
        let path = format!("admin/products/inventory/{kiosk}");
        let data: ProductsData = self
            .enveloped(Method::GET, &path, NO_BODY, "data.products")
            .await?;
        Ok(data.products)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<Product> {
        let data: ProductData = self
            .enveloped(Method::POST, "admin/products", Some(draft), "data.product")
            .await?;
        Ok(data.product)
    }

    #[instrument(skip(self, draft))]
    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> ClientResult<Product> {
        let path = format!("admin/products/{id}");
        let data: ProductData = self
            .enveloped(Method::PUT, &path, Some(draft), "data.product")
            .await?;
        Ok(data.product)
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        let path = format!("admin/products/{id}");
        self.confirm(Method::DELETE, &path, NO_BODY).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_stock(
        &self,
        product: ProductId,
        kiosk: KioskId,
        quantity: u32,
    ) -> ClientResult<()> {
        let path = format!("admin/products/{product}/inventory/{kiosk}");
        let body = StockUpdate {
            quantity_in_stock: quantity,
        };
        self.confirm(Method::PUT, &path, Some(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_visibility(
        &self,
        product: ProductId,
        kiosk: KioskId,
        visible: bool,
    ) -> ClientResult<()> {
        let path = format!("admin/products/{product}/inventory/{kiosk}/visibility");
        let body = VisibilityUpdate { visible };
        self.confirm(Method::PUT, &path, Some(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_kiosks(&self) -> ClientResult<Vec<Kiosk>> {
        let text = self.send(Method::GET, "admin/kiosks", NO_BODY).await?;
        let response: KiosksResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %truncate(&text), "Failed to parse kiosk list");
            ClientError::Parse(format!("expected kiosks: {e}"))
        })?;
        Ok(response.kiosks)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create_kiosk(&self, draft: &KioskDraft) -> ClientResult<String> {
        self.confirm(Method::POST, "admin/kiosks", Some(draft)).await
    }

    #[instrument(skip(self, draft))]
    async fn update_kiosk(&self, id: KioskId, draft: &KioskDraft) -> ClientResult<String> {
        let path = format!("admin/kiosks/{id}");
        self.confirm(Method::PUT, &path, Some(draft)).await
    }

    #[instrument(skip(self))]
    async fn deactivate_kiosk(&self, id: KioskId) -> ClientResult<String> {
        let path = format!("admin/kiosks/{id}");
        self.confirm(Method::DELETE, &path, NO_BODY).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;

    fn store(base: &str) -> HttpStore {
        HttpStore::new(&AdminConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let store = store("https://kiosk.example.org/api/");
        assert_eq!(
            store.url("admin/products/inventory/3"),
            "https://kiosk.example.org/api/admin/products/inventory/3"
        );
        assert_eq!(
            store.url("/admin/kiosks"),
            "https://kiosk.example.org/api/admin/kiosks"
        );
    }

    #[test]
    fn test_api_error_uses_json_message() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"success": false, "message": "Name is required"}"#,
        );
        assert!(matches!(
            err,
            ClientError::Api { status: 400, ref message } if message == "Name is required"
        ));
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body_or_reason() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream timeout");
        assert!(matches!(
            err,
            ClientError::Api { status: 502, ref message } if message == "upstream timeout"
        ));

        let err = api_error(StatusCode::NOT_FOUND, "");
        assert!(matches!(
            err,
            ClientError::Api { status: 404, ref message } if message == "Not Found"
        ));
    }

    #[test]
    fn test_token_is_rejected_if_not_a_header_value() {
        let config =
            AdminConfig::new(Url::parse("http://localhost").unwrap()).with_token("bad\ntoken");
        assert!(matches!(
            HttpStore::new(&config),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let store = store("http://127.0.0.1:9");
        let err = store.list_products().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
