use serde::{Deserialize, Serialize};

/// Listing state of an offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    /// Visible to customers
    #[default]
    Active,
    /// Hidden, can be re-activated
    Archived,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfferStatus::Active => write!(f, "active"),
            OfferStatus::Archived => write!(f, "archived"),
            OfferStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Status change requested through `/offers/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferAction {
    Archive,
    Activate,
}

impl OfferAction {
    /// The action offered next to an offer in the list: active offers can be
    /// archived, everything else can be activated.
    #[must_use]
    pub fn toggle_for(status: &OfferStatus) -> Self {
        match status {
            OfferStatus::Active => OfferAction::Archive,
            OfferStatus::Archived | OfferStatus::Unknown => OfferAction::Activate,
        }
    }
}

impl std::fmt::Display for OfferAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfferAction::Archive => write!(f, "archive"),
            OfferAction::Activate => write!(f, "activate"),
        }
    }
}

/// A discounted item listed by the restaurant, as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,

    #[serde(default)]
    pub title: String,

    /// Current price in minor units (kopecks / cents)
    #[serde(default)]
    pub price_cents: i64,

    /// Price before the discount, if any
    #[serde(default)]
    pub original_price_cents: Option<i64>,

    #[serde(default)]
    pub qty_total: Option<i64>,

    #[serde(default)]
    pub qty_left: Option<i64>,

    /// Expiry as sent by the server (ISO-8601 or "YYYY-MM-DD HH:MM")
    #[serde(default)]
    pub expires_at: Option<String>,

    #[serde(default)]
    pub status: OfferStatus,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl Offer {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OfferStatus::Active
    }

    /// Case-insensitive substring match on the title. An empty query matches.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty() || self.title.to_lowercase().contains(&q)
    }
}

/// Raw text of the create / edit offer form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferForm {
    pub title: String,
    /// Decimal price in major units, e.g. "149.90"
    pub price: String,
    /// Decimal price before discount; empty or zero means none
    pub price_old: String,
    pub qty_total: String,
    pub qty_left: String,
    pub expires_at: String,
    pub description: String,
    pub image_url: String,
}

impl OfferForm {
    /// Populate the edit form from an existing offer.
    pub fn from_offer(offer: &Offer) -> Self {
        Self {
            title: offer.title.clone(),
            price: format_major_units(offer.price_cents),
            price_old: format_major_units(offer.original_price_cents.unwrap_or(0)),
            qty_total: offer.qty_total.unwrap_or(0).to_string(),
            qty_left: offer.qty_left.unwrap_or(0).to_string(),
            expires_at: offer.expires_at.clone().unwrap_or_default(),
            description: offer.description.clone().unwrap_or_default(),
            image_url: offer.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Create / update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferDraft {
    pub restaurant_id: String,
    pub title: String,
    pub price_cents: i64,
    pub original_price_cents: Option<i64>,
    pub qty_total: i64,
    pub qty_left: i64,
    pub expires_at: Option<String>,
    pub description: String,
    pub image_url: String,
}

/// 14990 → "149.9", 500 → "5", 0 → "0"
pub fn format_major_units(cents: i64) -> String {
    let major = cents as f64 / 100.0;
    let text = format!("{major:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
