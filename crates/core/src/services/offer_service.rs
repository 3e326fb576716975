use crate::errors::CoreError;
use crate::models::offer::{Offer, OfferDraft, OfferForm};
use crate::models::session::Session;

/// Turns form input into API payloads and filters the offer list.
///
/// Number fields are lenient like the web form: blank or unparsable text
/// counts as zero. Only values the server would reject are errors.
pub struct OfferService;

impl OfferService {
    pub fn new() -> Self {
        Self
    }

    /// Build a create/update payload for the signed-in restaurant.
    pub fn build_draft(&self, session: &Session, form: &OfferForm) -> Result<OfferDraft, CoreError> {
        if session.restaurant_id.is_empty() {
            return Err(CoreError::NotSignedIn);
        }

        let title = form.title.trim();
        if title.is_empty() {
            return Err(CoreError::ValidationError("title must not be empty".into()));
        }

        let price_cents = parse_cents(&form.price);
        if price_cents < 0 {
            return Err(CoreError::ValidationError(format!(
                "price must not be negative (got '{}')",
                form.price
            )));
        }

        let original_price_cents = match parse_cents(&form.price_old) {
            0 => None,
            c if c < 0 => {
                return Err(CoreError::ValidationError(format!(
                    "old price must not be negative (got '{}')",
                    form.price_old
                )))
            }
            c => Some(c),
        };

        let qty_total = parse_whole(&form.qty_total);
        let qty_left = parse_whole(&form.qty_left);
        if qty_total < 0 || qty_left < 0 {
            return Err(CoreError::ValidationError(
                "quantities must not be negative".into(),
            ));
        }

        let expires_at = Some(form.expires_at.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(OfferDraft {
            restaurant_id: session.restaurant_id.clone(),
            title: title.to_string(),
            price_cents,
            original_price_cents,
            qty_total,
            qty_left,
            expires_at,
            description: form.description.trim().to_string(),
            image_url: form.image_url.trim().to_string(),
        })
    }

    /// Offers whose title contains `query` (case-insensitive), in list order.
    pub fn filter<'a>(&self, offers: &'a [Offer], query: &str) -> Vec<&'a Offer> {
        offers.iter().filter(|o| o.matches(query)).collect()
    }
}

impl Default for OfferService {
    fn default() -> Self {
        Self::new()
    }
}

/// "149.90" → 14990. Blank or unparsable → 0.
pub fn parse_cents(text: &str) -> i64 {
    (parse_number(text) * 100.0).round() as i64
}

/// "12" → 12, "2.6" → 3. Blank or unparsable → 0.
pub fn parse_whole(text: &str) -> i64 {
    parse_number(text).round() as i64
}

fn parse_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
