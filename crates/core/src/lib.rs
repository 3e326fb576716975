pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod render;
pub mod services;
pub mod storage;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::http::HttpMerchantApi;
use crate::api::traits::MerchantApi;
use crate::config::DashboardConfig;
use crate::errors::CoreError;
use crate::models::{
    chart::ChartLayout,
    image_asset::{ImageAsset, NormalizedImage},
    offer::{Offer, OfferAction, OfferForm},
    series::SeriesPoint,
    session::{Credentials, Session},
    upload::PresignRequest,
};
use crate::render::surface::{render_chart, ChartStyle, DrawingSurface};
use crate::render::svg::SvgSurface;
use crate::services::{
    chart_service::ChartProjector, image_service::ImageNormalizer, offer_service::OfferService,
};

/// Which screen the UI shell should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Registration / sign-in
    Gate,
    /// Offers, stats and uploads
    App,
}

/// Main entry point for the merchant dashboard core.
///
/// Holds the explicit session, the last loaded offers and stats series, and
/// the services that act on them. The UI shell calls one method per user
/// action and turns any returned error into a single notification.
#[must_use]
pub struct MerchantDashboard {
    config: DashboardConfig,
    api: Box<dyn MerchantApi>,
    session: Session,
    view: View,
    offers: Vec<Offer>,
    series: Vec<SeriesPoint>,
    normalizer: ImageNormalizer,
    projector: ChartProjector,
    offer_service: OfferService,
}

impl std::fmt::Debug for MerchantDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantDashboard")
            .field("session", &self.session)
            .field("view", &self.view)
            .field("offers", &self.offers.len())
            .field("series", &self.series.len())
            .finish()
    }
}

impl MerchantDashboard {
    /// Build a dashboard over any API implementation. Starts at the gate.
    pub fn new(config: DashboardConfig, api: Box<dyn MerchantApi>) -> Self {
        let normalizer = ImageNormalizer::from_settings(&config.image);
        let projector = ChartProjector::with_window_days(config.chart.window_days);
        Self {
            config,
            api,
            session: Session::default(),
            view: View::Gate,
            offers: Vec::new(),
            series: Vec::new(),
            normalizer,
            projector,
            offer_service: OfferService::new(),
        }
    }

    /// Build a dashboard talking HTTP to `config.api_base_url`.
    pub fn with_http(config: DashboardConfig) -> Self {
        let api = HttpMerchantApi::from_config(&config);
        Self::new(config, Box::new(api))
    }

    /// Start from a restored session. A complete one skips the gate.
    pub fn with_session(mut self, session: Session) -> Self {
        if session.is_complete() {
            self.view = View::App;
        }
        self.session = session;
        self
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Enter the app with `session`. Both fields must be present.
    pub fn sign_in(&mut self, session: Session) -> Result<(), CoreError> {
        if !session.is_complete() {
            return Err(CoreError::ValidationError(
                "restaurant id and API key are both required".into(),
            ));
        }
        info!(restaurant_id = %session.restaurant_id, "signed in");
        self.session = session;
        self.view = View::App;
        Ok(())
    }

    /// Drop credentials and cached data, back to the gate.
    pub fn sign_out(&mut self) {
        info!(restaurant_id = %self.session.restaurant_id, "signed out");
        self.session = Session::default();
        self.offers.clear();
        self.series.clear();
        self.view = View::Gate;
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.session.is_complete()
    }

    /// Public registration. The caller decides whether to sign in with the
    /// returned credentials (after showing / copying them).
    pub async fn register(&self, name: &str, phone: &str) -> Result<Credentials, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError("restaurant name is required".into()));
        }
        self.api.register(name, phone.trim()).await
    }

    /// Load offers and stats concurrently after sign-in.
    ///
    /// An offers failure sends the user back to the gate and is returned;
    /// a stats failure only keeps the previous chart.
    pub async fn init(&mut self, metric: &str) -> Result<(), CoreError> {
        self.ensure_signed_in()?;
        let (offers, stats) = futures::join!(
            self.api.list_offers(&self.session),
            self.api.fetch_stats(&self.session, metric)
        );
        self.apply_stats(metric, stats);
        self.apply_offers(offers).map(|_| ())
    }

    // ── Offers ──────────────────────────────────────────────────────

    /// Reload the offer list. On failure the view falls back to the gate.
    pub async fn load_offers(&mut self) -> Result<&[Offer], CoreError> {
        self.ensure_signed_in()?;
        let result = self.api.list_offers(&self.session).await;
        self.apply_offers(result)
    }

    #[must_use]
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Offers whose title contains `query`, case-insensitive.
    #[must_use]
    pub fn visible_offers(&self, query: &str) -> Vec<&Offer> {
        self.offer_service.filter(&self.offers, query)
    }

    /// Pre-filled edit form for a loaded offer.
    #[must_use]
    pub fn edit_form(&self, offer_id: i64) -> Option<OfferForm> {
        self.find_offer(offer_id).map(OfferForm::from_offer)
    }

    pub async fn create_offer(&mut self, form: &OfferForm) -> Result<(), CoreError> {
        self.ensure_signed_in()?;
        let draft = self.offer_service.build_draft(&self.session, form)?;
        self.api.create_offer(&self.session, &draft).await?;
        info!(title = %draft.title, "offer created");
        self.load_offers().await.map(|_| ())
    }

    pub async fn update_offer(&mut self, offer_id: i64, form: &OfferForm) -> Result<(), CoreError> {
        self.ensure_signed_in()?;
        let draft = self.offer_service.build_draft(&self.session, form)?;
        self.api.update_offer(&self.session, offer_id, &draft).await?;
        info!(offer_id, "offer updated");
        self.load_offers().await.map(|_| ())
    }

    /// Archive an active offer or re-activate any other. Returns the action taken.
    pub async fn toggle_offer_status(&mut self, offer_id: i64) -> Result<OfferAction, CoreError> {
        self.ensure_signed_in()?;
        let action = self
            .find_offer(offer_id)
            .map(|o| OfferAction::toggle_for(&o.status))
            .ok_or_else(|| CoreError::ValidationError(format!("offer {offer_id} is not loaded")))?;
        self.api
            .change_offer_status(&self.session, offer_id, action)
            .await?;
        info!(offer_id, %action, "offer status changed");
        self.load_offers().await?;
        Ok(action)
    }

    pub async fn delete_offer(&mut self, offer_id: i64) -> Result<(), CoreError> {
        self.ensure_signed_in()?;
        self.api.delete_offer(&self.session, offer_id).await?;
        info!(offer_id, "offer deleted");
        self.load_offers().await.map(|_| ())
    }

    /// Link for the CSV export of all offers.
    pub fn offers_csv_url(&self) -> Result<String, CoreError> {
        self.api.offers_csv_url(&self.session)
    }

    // ── Stats ───────────────────────────────────────────────────────

    /// Fetch the series for `metric`. Failures are not surfaced: they are
    /// logged and the previous series stays. Returns whether it was replaced.
    pub async fn refresh_stats(&mut self, metric: &str) -> bool {
        if self.ensure_signed_in().is_err() {
            return false;
        }
        let result = self.api.fetch_stats(&self.session, metric).await;
        self.apply_stats(metric, result)
    }

    #[must_use]
    pub fn series(&self) -> &[SeriesPoint] {
        &self.series
    }

    /// Project the current series into the configured frame as of `now`.
    pub fn chart_layout_at(&self, now: DateTime<Utc>) -> ChartLayout {
        self.projector
            .layout(&self.series, &self.config.chart.frame(), now)
    }

    pub fn chart_layout(&self) -> ChartLayout {
        self.chart_layout_at(Utc::now())
    }

    /// Draw the current chart onto `surface`.
    pub fn draw_chart<S: DrawingSurface + ?Sized>(&self, surface: &mut S, now: DateTime<Utc>) {
        let layout = self.chart_layout_at(now);
        render_chart(surface, &layout, &self.config.chart.frame(), &ChartStyle::default());
    }

    /// The current chart as an SVG document.
    #[must_use]
    pub fn chart_svg_at(&self, now: DateTime<Utc>) -> String {
        let mut surface = SvgSurface::new();
        self.draw_chart(&mut surface, now);
        surface.finish()
    }

    // ── Uploads ─────────────────────────────────────────────────────

    /// Resize and re-encode with the configured bounds.
    pub fn normalize_image(&self, asset: ImageAsset) -> Result<NormalizedImage, CoreError> {
        self.normalizer
            .normalize(asset, self.config.image.max_side, self.config.image.quality)
    }

    /// Normalize, presign, upload. Returns the public URL to store on the
    /// offer. Presigning only starts after the image is ready, and the
    /// upload only after presigning succeeded.
    pub async fn upload_image(&self, asset: ImageAsset) -> Result<String, CoreError> {
        self.ensure_signed_in()?;
        let image = self.normalize_image(asset)?;

        let request = PresignRequest {
            filename: image.file_name.clone(),
            content_type: image.mime_type.clone(),
            restaurant_id: self.session.restaurant_id.clone(),
        };
        let presign = self.api.presign_upload(&self.session, &request).await?;
        debug!(upload_url = %presign.upload_url, "upload presigned");

        self.api.upload_presigned(&presign, &image).await?;
        Ok(presign.public_url)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn ensure_signed_in(&self) -> Result<(), CoreError> {
        if self.session.is_complete() {
            Ok(())
        } else {
            Err(CoreError::NotSignedIn)
        }
    }

    fn find_offer(&self, offer_id: i64) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id == offer_id)
    }

    fn apply_offers(&mut self, result: Result<Vec<Offer>, CoreError>) -> Result<&[Offer], CoreError> {
        match result {
            Ok(offers) => {
                debug!(count = offers.len(), "offers loaded");
                self.offers = offers;
                Ok(&self.offers)
            }
            Err(e) => {
                warn!(error = %e, "offers failed to load, showing sign-in");
                self.view = View::Gate;
                Err(e)
            }
        }
    }

    fn apply_stats(&mut self, metric: &str, result: Result<Vec<SeriesPoint>, CoreError>) -> bool {
        match result {
            Ok(points) => {
                debug!(metric, count = points.len(), "stats loaded");
                self.series = points;
                true
            }
            Err(e) => {
                warn!(metric, error = %e, "stats unavailable, keeping previous chart");
                false
            }
        }
    }
}
