use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::{debug, info};

use super::traits::MerchantApi;
use crate::config::DashboardConfig;
use crate::errors::CoreError;
use crate::models::image_asset::NormalizedImage;
use crate::models::offer::{Offer, OfferAction, OfferDraft};
use crate::models::series::{SeriesPoint, StatsResponse};
use crate::models::session::{Credentials, Session};
use crate::models::upload::{PresignRequest, PresignedUpload};

/// Header carrying the restaurant's API key.
pub const API_KEY_HEADER: &str = "X-Foody-Key";

const MERCHANT_PATH: &str = "/api/v1/merchant";

/// Longest error body kept in an `Api` error message.
const MAX_ERROR_BODY: usize = 200;

/// `reqwest` implementation of [`MerchantApi`].
///
/// - **Auth**: `X-Foody-Key` header on every merchant call except registration.
/// - **Errors**: 401/403 → `Unauthorized`, other non-2xx → `Api`.
/// - **Uploads**: multipart POST straight to the presigned storage URL.
pub struct HttpMerchantApi {
    client: Client,
    base_url: String,
}

impl HttpMerchantApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, 30)
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::with_timeout(config.base_url(), config.request_timeout_secs)
    }

    #[cfg_attr(target_arch = "wasm32", allow(unused_variables))]
    fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{MERCHANT_PATH}{path}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder, session: &Session) -> Result<RequestBuilder, CoreError> {
        if !session.is_complete() {
            return Err(CoreError::NotSignedIn);
        }
        Ok(builder.header(API_KEY_HEADER, &session.api_key))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, CoreError> {
        let resp = check_status(endpoint, request.send().await?).await?;
        resp.json().await.map_err(|e| CoreError::Api {
            endpoint: endpoint.to_string(),
            message: format!("Failed to parse response: {e}"),
        })
    }

    async fn send_unit(&self, endpoint: &str, request: RequestBuilder) -> Result<(), CoreError> {
        check_status(endpoint, request.send().await?).await?;
        Ok(())
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        session: &Session,
        path: &str,
        body: &B,
    ) -> Result<(), CoreError> {
        let request = self.authed(self.client.post(self.url(path)), session)?.json(body);
        self.send_unit(path, request).await
    }
}

/// Map a response status onto the error taxonomy.
async fn check_status(endpoint: &str, resp: Response) -> Result<Response, CoreError> {
    let status = resp.status();
    debug!(endpoint, status = status.as_u16(), "merchant api response");

    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(CoreError::Unauthorized);
    }

    let body = resp.text().await.unwrap_or_default();
    let body: String = body.chars().take(MAX_ERROR_BODY).collect();
    Err(CoreError::Api {
        endpoint: endpoint.to_string(),
        message: format!("HTTP {}: {}", status.as_u16(), body.trim()),
    })
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    phone: &'a str,
}

#[derive(Serialize)]
struct StatusBody<'a> {
    restaurant_id: &'a str,
    offer_id: i64,
    action: OfferAction,
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    restaurant_id: &'a str,
    offer_id: i64,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MerchantApi for HttpMerchantApi {
    async fn register(&self, name: &str, phone: &str) -> Result<Credentials, CoreError> {
        let request = self
            .client
            .post(self.url("/register_public"))
            .json(&RegisterBody { name, phone });
        let credentials: Credentials = self.send_json("/register_public", request).await?;
        info!(restaurant_id = %credentials.restaurant_id, "restaurant registered");
        Ok(credentials)
    }

    async fn list_offers(&self, session: &Session) -> Result<Vec<Offer>, CoreError> {
        let request = self
            .authed(self.client.get(self.url("/offers")), session)?
            .query(&[("restaurant_id", session.restaurant_id.as_str())]);
        self.send_json("/offers", request).await
    }

    async fn create_offer(&self, session: &Session, draft: &OfferDraft) -> Result<(), CoreError> {
        self.post_json(session, "/offers", draft).await
    }

    async fn update_offer(
        &self,
        session: &Session,
        offer_id: i64,
        draft: &OfferDraft,
    ) -> Result<(), CoreError> {
        let path = format!("/offers/{offer_id}");
        let request = self
            .authed(self.client.put(self.url(&path)), session)?
            .json(draft);
        self.send_unit(&path, request).await
    }

    async fn change_offer_status(
        &self,
        session: &Session,
        offer_id: i64,
        action: OfferAction,
    ) -> Result<(), CoreError> {
        let body = StatusBody {
            restaurant_id: &session.restaurant_id,
            offer_id,
            action,
        };
        self.post_json(session, "/offers/status", &body).await
    }

    async fn delete_offer(&self, session: &Session, offer_id: i64) -> Result<(), CoreError> {
        let body = DeleteBody {
            restaurant_id: &session.restaurant_id,
            offer_id,
        };
        self.post_json(session, "/offers/delete", &body).await
    }

    async fn fetch_stats(
        &self,
        session: &Session,
        metric: &str,
    ) -> Result<Vec<SeriesPoint>, CoreError> {
        let request = self
            .authed(self.client.get(self.url("/stats")), session)?
            .query(&[
                ("restaurant_id", session.restaurant_id.as_str()),
                ("metric", metric),
            ]);
        let stats: StatsResponse = self.send_json("/stats", request).await?;
        Ok(stats.points)
    }

    async fn presign_upload(
        &self,
        session: &Session,
        request: &PresignRequest,
    ) -> Result<PresignedUpload, CoreError> {
        let builder = self
            .authed(self.client.post(self.url("/uploads/presign")), session)?
            .json(request);
        self.send_json("/uploads/presign", builder).await
    }

    async fn upload_presigned(
        &self,
        presign: &PresignedUpload,
        image: &NormalizedImage,
    ) -> Result<(), CoreError> {
        let mut form = Form::new();
        for (key, value) in &presign.fields {
            form = form.text(key.clone(), value.clone());
        }
        let file = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| CoreError::ValidationError(format!("invalid content type: {e}")))?;
        let form = form
            .text("Content-Type", image.mime_type.clone())
            .part("file", file);

        let resp = self
            .client
            .post(&presign.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Upload {
                status: status.as_u16(),
            });
        }
        info!(
            file = %image.file_name,
            bytes = image.bytes.len(),
            "image uploaded"
        );
        Ok(())
    }

    fn offers_csv_url(&self, session: &Session) -> Result<String, CoreError> {
        if session.restaurant_id.is_empty() {
            return Err(CoreError::NotSignedIn);
        }
        let url = Url::parse_with_params(
            &self.url("/offers/csv"),
            &[("restaurant_id", session.restaurant_id.as_str())],
        )
        .map_err(|e| CoreError::Config(format!("invalid api_base_url: {e}")))?;
        Ok(url.to_string())
    }
}
