use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use caption_generator::{
    ai::MockCaptionClient,
    app::{App, AppServices},
    models::{CaptionResponse, ErrorResponse},
    normalize::SAFETY_REFUSAL,
    server::{build_router, handlers},
};
use pretty_assertions::assert_eq;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "caption-test-boundary";

enum FormPart<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                        name, value
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn caption_request(parts: &[FormPart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/gerar_legenda")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn router_with(mock: MockCaptionClient) -> (Router, Arc<MockCaptionClient>) {
    let mock = Arc::new(mock);
    let app = App::with_services(AppServices {
        caption: Box::new(mock.clone()),
    });
    (build_router(Arc::new(app), 1024 * 1024), mock)
}

async fn send<T: DeserializeOwned>(router: Router, request: Request<Body>) -> (StatusCode, T) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

fn image_part(file_name: &str) -> FormPart<'_> {
    FormPart::File {
        name: "file",
        file_name,
        content_type: "image/jpeg",
        data: JPEG,
    }
}

#[tokio::test]
async fn test_caption_route_returns_legenda() {
    let (router, mock) = router_with(MockCaptionClient::new().with_caption("Legenda: Um café."));

    let (status, body): (_, CaptionResponse) = send(
        router,
        caption_request(&[
            image_part("cafe.jpg"),
            FormPart::Text {
                name: "keywords",
                value: "café",
            },
            FormPart::Text {
                name: "keywords",
                value: "  manhã ",
            },
            FormPart::Text {
                name: "keywords",
                value: "   ",
            },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.legenda, "Um café.");
    assert_eq!(mock.last_mime_type().as_deref(), Some("image/jpeg"));
    assert!(mock
        .last_prompt()
        .unwrap()
        .contains("inspiração principal: café, manhã."));
}

#[tokio::test]
async fn test_refusal_is_returned_as_legenda() {
    let (router, _) = router_with(
        MockCaptionClient::new().with_response(json!({ "candidates": [{ "finishReason": "SAFETY" }] })),
    );

    let (status, body): (_, CaptionResponse) =
        send(router, caption_request(&[image_part("x.jpg")])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.legenda, SAFETY_REFUSAL);
}

#[tokio::test]
async fn test_missing_file_is_bad_request() {
    let (router, mock) = router_with(MockCaptionClient::new());

    let (status, body): (_, ErrorResponse) = send(
        router,
        caption_request(&[FormPart::Text {
            name: "keywords",
            value: "praia",
        }]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, handlers::NO_FILE_SENT);
    assert_eq!(mock.get_call_count(), 0);
}

#[tokio::test]
async fn test_empty_filename_is_bad_request() {
    let (router, _) = router_with(MockCaptionClient::new());

    let (status, body): (_, ErrorResponse) =
        send(router, caption_request(&[image_part("")])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, handlers::NO_FILE_SELECTED);
}

#[tokio::test]
async fn test_quota_failure_maps_to_429() {
    let (router, _) = router_with(MockCaptionClient::new().with_failure("Quota exceeded for project"));

    let (status, body): (_, ErrorResponse) =
        send(router, caption_request(&[image_part("x.jpg")])).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body.error.contains("quota"));
}

#[tokio::test]
async fn test_timeout_failure_maps_to_504() {
    let (router, _) = router_with(MockCaptionClient::new().with_failure("DeadlineExceeded: slow"));

    let (status, _): (_, ErrorResponse) =
        send(router, caption_request(&[image_part("x.jpg")])).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_model_not_initialized_is_500() {
    let router = build_router(Arc::new(App::without_model()), 1024);

    let (status, body): (_, ErrorResponse) =
        send(router, caption_request(&[image_part("x.jpg")])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.error.contains("not initialized"));
}

#[tokio::test]
async fn test_health_reports_model_state() {
    let router = build_router(Arc::new(App::without_model()), 1024);
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body): (_, serde_json::Value) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_ready"], false);
}
