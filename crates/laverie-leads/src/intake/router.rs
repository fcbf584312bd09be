use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::connect_info::ConnectInfo;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::header::{HeaderMap, HeaderValue, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tower_http::set_header::SetResponseHeaderLayer;

use super::domain::{IntakeRejection, LeadForm, SubmissionReceipt};
use super::journal::SubmissionJournal;
use super::notify::email::Mailer;
use super::notify::push::PushGateway;
use super::service::LeadIntakeService;

/// Router exposing the submission endpoint. Wrong-method requests get a 405
/// from the method router; every response carries the security headers.
pub fn intake_router<J, M, P>(service: Arc<LeadIntakeService<J, M, P>>) -> Router
where
    J: SubmissionJournal + 'static,
    M: Mailer + 'static,
    P: PushGateway + 'static,
{
    Router::new()
        .route("/api/submit-form", post(submit_handler::<J, M, P>))
        .with_state(service)
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

pub(crate) async fn submit_handler<J, M, P>(
    State(service): State<Arc<LeadIntakeService<J, M, P>>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    form: Result<Form<LeadForm>, FormRejection>,
) -> Response
where
    J: SubmissionJournal + 'static,
    M: Mailer + 'static,
    P: PushGateway + 'static,
{
    // The wizard always posts via fetch with this marker; anything else is
    // not a request this endpoint serves.
    if !is_ajax(&headers) {
        return IntakeRejection::MalformedRequest.into_response();
    }

    let Form(form) = match form {
        Ok(form) => form,
        Err(_) => return IntakeRejection::MalformedRequest.into_response(),
    };

    let client_id = client_identifier(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    match service.submit(form, &client_id).await {
        Ok(receipt) => accepted_response(receipt),
        Err(rejection) => rejection.into_response(),
    }
}

fn accepted_response(receipt: SubmissionReceipt) -> Response {
    let payload = json!({
        "success": true,
        "error": null,
        "data": {
            "message": receipt.message,
            "email_sent": receipt.outcome.internal_email_sent,
            "confirmation_sent": receipt.outcome.confirmation_email_sent,
        },
    });
    (StatusCode::OK, Json(payload)).into_response()
}

impl IntoResponse for IntakeRejection {
    fn into_response(self) -> Response {
        let status = match self {
            IntakeRejection::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            IntakeRejection::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            IntakeRejection::InvalidToken
            | IntakeRejection::MissingField(_)
            | IntakeRejection::InvalidEmail
            | IntakeRejection::InvalidPhone
            | IntakeRejection::ConsentRequired
            | IntakeRejection::MalformedRequest => StatusCode::BAD_REQUEST,
        };

        let payload = json!({
            "success": false,
            "error": self.to_string(),
            "data": null,
        });
        (status, Json(payload)).into_response()
    }
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("xmlhttprequest"))
}

/// First forwarded hop, then the real-ip header, then the socket peer.
/// Distinct clients behind one proxy share a bucket by design.
fn client_identifier(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
    {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::header::HeaderName::from_bytes(name.as_bytes()).expect("header name"),
                HeaderValue::from_str(value).expect("header value"),
            );
        }
        map
    }

    #[test]
    fn ajax_marker_is_case_insensitive() {
        assert!(is_ajax(&headers(&[("x-requested-with", "XMLHttpRequest")])));
        assert!(is_ajax(&headers(&[("x-requested-with", "xmlhttprequest")])));
        assert!(!is_ajax(&headers(&[("x-requested-with", "fetch")])));
        assert!(!is_ajax(&headers(&[])));
    }

    #[test]
    fn forwarded_header_wins_and_keeps_first_hop() {
        let map = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.4"),
        ]);
        assert_eq!(client_identifier(&map, None), "203.0.113.7");
    }

    #[test]
    fn real_ip_header_is_second_choice() {
        let map = headers(&[("x-real-ip", "198.51.100.4")]);
        assert_eq!(client_identifier(&map, None), "198.51.100.4");
    }

    #[test]
    fn peer_address_then_sentinel() {
        let peer: SocketAddr = "192.0.2.9:55555".parse().expect("socket addr");
        assert_eq!(client_identifier(&HeaderMap::new(), Some(peer)), "192.0.2.9");
        assert_eq!(client_identifier(&HeaderMap::new(), None), "unknown");
    }
}
