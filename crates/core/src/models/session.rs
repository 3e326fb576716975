use serde::{Deserialize, Deserializer, Serialize};

/// Credentials of the signed-in restaurant.
///
/// Passed explicitly to every API call. Persisted only through
/// [`SessionStore`](crate::storage::session_store::SessionStore).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub restaurant_id: String,
    pub api_key: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("restaurant_id", &self.restaurant_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Session {
    pub fn new(restaurant_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            restaurant_id: restaurant_id.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
        }
    }

    /// Both the restaurant id and the key are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.restaurant_id.is_empty() && !self.api_key.is_empty()
    }

    /// Combine values passed in the page URL with a previously stored session.
    /// Each field is taken from the URL when present and non-empty.
    pub fn resolve(
        url_restaurant_id: Option<&str>,
        url_api_key: Option<&str>,
        stored: Option<&Session>,
    ) -> Self {
        fn pick<'a>(url: Option<&'a str>, stored: Option<&'a str>) -> String {
            url.map(str::trim)
                .filter(|v| !v.is_empty())
                .or(stored)
                .unwrap_or("")
                .to_string()
        }
        Self {
            restaurant_id: pick(url_restaurant_id, stored.map(|s| s.restaurant_id.as_str())),
            api_key: pick(url_api_key, stored.map(|s| s.api_key.as_str())),
        }
    }
}

/// Returned by public registration. Signing in is a separate step.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// The server may send this as a number
    #[serde(deserialize_with = "string_or_number")]
    pub restaurant_id: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("restaurant_id", &self.restaurant_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Text placed on the clipboard by the "copy keys" button.
    #[must_use]
    pub fn clipboard_text(&self) -> String {
        format!(
            "Restaurant ID: {}\nAPI Key: {}",
            self.restaurant_id, self.api_key
        )
    }

    pub fn into_session(self) -> Session {
        Session::new(self.restaurant_id, self.api_key)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
