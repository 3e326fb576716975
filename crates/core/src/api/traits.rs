use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::image_asset::NormalizedImage;
use crate::models::offer::{Offer, OfferAction, OfferDraft};
use crate::models::series::SeriesPoint;
use crate::models::session::{Credentials, Session};
use crate::models::upload::{PresignRequest, PresignedUpload};

/// The merchant REST API as seen by the dashboard.
///
/// Every authenticated call receives the session explicitly; implementations
/// hold no credentials of their own. `HttpMerchantApi` talks to the real
/// server, tests substitute in-memory fakes.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MerchantApi: Send + Sync {
    /// Public self-registration. Returns fresh credentials.
    async fn register(&self, name: &str, phone: &str) -> Result<Credentials, CoreError>;

    async fn list_offers(&self, session: &Session) -> Result<Vec<Offer>, CoreError>;

    async fn create_offer(&self, session: &Session, draft: &OfferDraft) -> Result<(), CoreError>;

    async fn update_offer(
        &self,
        session: &Session,
        offer_id: i64,
        draft: &OfferDraft,
    ) -> Result<(), CoreError>;

    async fn change_offer_status(
        &self,
        session: &Session,
        offer_id: i64,
        action: OfferAction,
    ) -> Result<(), CoreError>;

    async fn delete_offer(&self, session: &Session, offer_id: i64) -> Result<(), CoreError>;

    /// Time series for `metric`, in server order.
    async fn fetch_stats(
        &self,
        session: &Session,
        metric: &str,
    ) -> Result<Vec<SeriesPoint>, CoreError>;

    /// Step one of a photo upload: obtain a presigned target.
    async fn presign_upload(
        &self,
        session: &Session,
        request: &PresignRequest,
    ) -> Result<PresignedUpload, CoreError>;

    /// Step two: send the image straight to storage.
    /// Non-2xx responses are `CoreError::Upload`.
    async fn upload_presigned(
        &self,
        presign: &PresignedUpload,
        image: &NormalizedImage,
    ) -> Result<(), CoreError>;

    /// Download link for the CSV export of all offers.
    fn offers_csv_url(&self, session: &Session) -> Result<String, CoreError>;
}
