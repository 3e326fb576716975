// ═══════════════════════════════════════════════════════════════════
// API Tests — HttpMerchantApi against a one-shot local HTTP server
// ═══════════════════════════════════════════════════════════════════

use indexmap::IndexMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use merchant_dashboard_core::api::http::{HttpMerchantApi, API_KEY_HEADER};
use merchant_dashboard_core::api::traits::MerchantApi;
use merchant_dashboard_core::errors::CoreError;
use merchant_dashboard_core::models::image_asset::NormalizedImage;
use merchant_dashboard_core::models::offer::OfferAction;
use merchant_dashboard_core::models::session::Session;
use merchant_dashboard_core::models::upload::{PresignRequest, PresignedUpload};

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

/// Accept one connection, answer with `status` and `body`, and hand back
/// the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            if let Some(end) = find(&raw, b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&raw[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= end + 4 + length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&raw).into_owned()
    });

    (base, handle)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn session() -> Session {
    Session::new("42", "secret-key")
}

// ═══════════════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════════════

mod requests {
    use super::*;

    #[tokio::test]
    async fn list_offers_sends_key_header_and_restaurant_id() {
        let (base, server) = serve_once("200 OK", r#"[{"id":1,"title":"Soup","price_cents":350}]"#).await;
        let api = HttpMerchantApi::new(&base);

        let offers = api.list_offers(&session()).await.unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].title, "Soup");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/v1/merchant/offers?restaurant_id=42 "));
        assert!(request
            .to_lowercase()
            .contains(&format!("{}: secret-key", API_KEY_HEADER.to_lowercase())));
    }

    #[tokio::test]
    async fn stats_returns_points() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"points":[{"x":"2024-01-01T00:00:00Z","y":2}]}"#,
        )
        .await;
        let api = HttpMerchantApi::new(&base);

        let points = api.fetch_stats(&session(), "revenue").await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 2.0);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/v1/merchant/stats?restaurant_id=42&metric=revenue "));
    }

    #[tokio::test]
    async fn status_change_posts_action() {
        let (base, server) = serve_once("200 OK", "{}").await;
        let api = HttpMerchantApi::new(&base);

        api.change_offer_status(&session(), 7, OfferAction::Archive)
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v1/merchant/offers/status "));
        assert!(request.contains(r#""offer_id":7"#));
        assert!(request.contains(r#""action":"archive""#));
    }

    #[tokio::test]
    async fn register_is_unauthenticated() {
        let (base, server) = serve_once("200 OK", r#"{"restaurant_id":12,"api_key":"k"}"#).await;
        let api = HttpMerchantApi::new(&base);

        let creds = api.register("Bakery", "+100").await.unwrap();
        assert_eq!(creds.restaurant_id, "12");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v1/merchant/register_public "));
        assert!(!request.to_lowercase().contains("x-foody-key"));
    }

    #[tokio::test]
    async fn presigned_upload_sends_fields_before_file() {
        let (base, server) = serve_once("204 No Content", "").await;
        let api = HttpMerchantApi::new("http://unused.invalid");

        // Server order, deliberately not alphabetical
        let presign: PresignedUpload = serde_json::from_value(serde_json::json!({
            "upload_url": format!("{base}/bucket"),
            "fields": {
                "policy": "eyJleHAiOjF9",
                "key": "uploads/a.jpg",
                "acl": "public-read"
            },
            "public_url": "https://cdn.example/a.jpg"
        }))
        .unwrap();
        let image = NormalizedImage {
            file_name: "a.jpg".into(),
            mime_type: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            dimensions: None,
        };

        api.upload_presigned(&presign, &image).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /bucket "));
        let policy = request.find(r#"name="policy""#).unwrap();
        let key = request.find(r#"name="key""#).unwrap();
        let acl = request.find(r#"name="acl""#).unwrap();
        let content_type = request.find(r#"name="Content-Type""#).unwrap();
        let file = request.find(r#"name="file"; filename="a.jpg""#).unwrap();
        assert!(policy < key && key < acl, "fields must keep server order");
        assert!(acl < content_type && content_type < file);
        assert!(!request.to_lowercase().contains("x-foody-key"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════

mod errors {
    use super::*;

    #[tokio::test]
    async fn unauthorized_status() {
        let (base, _server) = serve_once("401 Unauthorized", "{}").await;
        let err = HttpMerchantApi::new(&base)
            .list_offers(&session())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn server_error_keeps_body() {
        let (base, _server) = serve_once("500 Internal Server Error", r#"{"detail":"db down"}"#).await;
        let err = HttpMerchantApi::new(&base)
            .fetch_stats(&session(), "revenue")
            .await
            .unwrap_err();
        match err {
            CoreError::Api { endpoint, message } => {
                assert_eq!(endpoint, "/stats");
                assert!(message.starts_with("HTTP 500"));
                assert!(message.contains("db down"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_rejection_carries_status() {
        let (base, _server) = serve_once("403 Forbidden", "").await;
        let presign = PresignedUpload {
            upload_url: format!("{base}/bucket"),
            fields: IndexMap::new(),
            public_url: String::new(),
        };
        let image = NormalizedImage {
            file_name: "a.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![1, 2, 3],
            dimensions: None,
        };
        let err = HttpMerchantApi::new("http://unused.invalid")
            .upload_presigned(&presign, &image)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Upload { status: 403 }));
    }

    #[tokio::test]
    async fn incomplete_session_is_rejected_locally() {
        let api = HttpMerchantApi::new("http://unused.invalid");
        let request = PresignRequest {
            filename: "a.jpg".into(),
            content_type: "image/jpeg".into(),
            restaurant_id: "42".into(),
        };
        assert!(matches!(
            api.presign_upload(&Session::new("42", ""), &request).await,
            Err(CoreError::NotSignedIn)
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// CSV link
// ═══════════════════════════════════════════════════════════════════

mod csv {
    use super::*;

    #[test]
    fn csv_url_is_encoded() {
        let api = HttpMerchantApi::new("https://api.example/");
        assert_eq!(api.base_url(), "https://api.example");
        assert_eq!(
            api.offers_csv_url(&Session::new("a b&c", "k")).unwrap(),
            "https://api.example/api/v1/merchant/offers/csv?restaurant_id=a+b%26c"
        );
    }

    #[test]
    fn csv_url_needs_restaurant_id() {
        let api = HttpMerchantApi::new("https://api.example");
        assert!(matches!(
            api.offers_csv_url(&Session::default()),
            Err(CoreError::NotSignedIn)
        ));
    }
}
