use std::sync::Arc;

use serde::Serialize;
use tracing::{error, warn};

use crate::analysis::{AnalysisError, Report};
use crate::contact::{ContactError, ContactForm};
use crate::mail::Delivery;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::state::AppState;

#[derive(Serialize)]
struct AnalysisBody<'a> {
    success: bool,
    #[serde(flatten)]
    report: &'a Report,
}

/// `GET /api/bank-analysis`
pub async fn bank_analysis(_req: Request, state: Arc<AppState>) -> Response {
    match state.results.load().await {
        Ok(report) => Json(AnalysisBody { success: true, report: &report }).into_response(),
        Err(e) => {
            match &e {
                AnalysisError::NotFound { .. } => warn!("{e}"),
                AnalysisError::Read { .. } => error!("{e}"),
            }
            Response::error(e.status(), e.public_message())
        }
    }
}

#[derive(Serialize)]
struct ContactBody {
    success: bool,
    delivered: bool,
    message: &'static str,
}

/// `POST /api/contact`
pub async fn contact(req: Request, state: Arc<AppState>) -> Response {
    match submit_contact(&req, &state).await {
        Ok(delivery) => {
            let delivered = delivery == Delivery::Sent;
            let message = if delivered {
                "Thank you! Your message has been sent."
            } else {
                "Thank you! Your message has been received."
            };
            Json(ContactBody { success: true, delivered, message }).into_response()
        }
        Err(e) => {
            match &e {
                ContactError::Delivery(source) => error!("contact delivery failed: {source}"),
                _ => warn!("contact form rejected: {e}"),
            }
            Response::error(e.status(), &e.to_string())
        }
    }
}

async fn submit_contact(req: &Request, state: &AppState) -> Result<Delivery, ContactError> {
    let form = ContactForm::from_request(req)?;
    form.validate()?;
    let message = form.into_message(&state.config.mail.to);
    state.mailer.send(&message).await.map_err(ContactError::Delivery)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};
    use serde_json::{Value, json};

    use super::*;
    use crate::analysis::ResultLoader;
    use crate::config::Config;
    use crate::method::Method;

    fn state(results: ResultLoader) -> Arc<AppState> {
        let config = Config::from_lookup(|_| None).unwrap();
        Arc::new(AppState::new(config).with_results(results))
    }

    fn get(path: &str) -> Request {
        Request::new(Method::Get, path.parse().unwrap(), HeaderMap::new(), Bytes::new())
    }

    fn body(res: &Response) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[tokio::test]
    async fn analysis_success_shape() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b,product\n1,2,X\n3,4,Y\n5,6,X\n").unwrap();

        let res = bank_analysis(get("/api/bank-analysis"), state(ResultLoader::new(file.path()))).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(
            body(&res),
            json!({
                "success": true,
                "data": [
                    { "a": "1", "b": "2", "product": "X" },
                    { "a": "3", "b": "4", "product": "Y" },
                    { "a": "5", "b": "6", "product": "X" },
                ],
                "statistics": { "total_clients": 3, "products": { "X": 2, "Y": 1 } },
            }),
        );
    }

    #[tokio::test]
    async fn analysis_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ResultLoader::new(dir.path().join("result.csv"));

        let res = bank_analysis(get("/api/bank-analysis"), state(loader)).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        let body = body(&res);
        assert!(body["error"].as_str().unwrap().contains("Run the bank product analysis"));
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn analysis_read_failure_hides_details() {
        let dir = tempfile::tempdir().unwrap();

        let res = bank_analysis(get("/api/bank-analysis"), state(ResultLoader::new(dir.path()))).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(&res), json!({ "error": "Failed to load analysis results" }));
    }

    #[tokio::test]
    async fn contact_without_relay_is_received_not_delivered() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        let req = Request::new(
            Method::Post,
            "/api/contact".parse().unwrap(),
            headers,
            Bytes::from_static(br#"{"name":"Ana","email":"ana@example.com","message":"Hi"}"#),
        );

        let res = contact(req, state(ResultLoader::default())).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body = body(&res);
        assert_eq!(body["success"], true);
        assert_eq!(body["delivered"], false);
    }

    #[tokio::test]
    async fn contact_invalid_field() {
        let req = Request::new(
            Method::Post,
            "/api/contact".parse().unwrap(),
            HeaderMap::new(),
            Bytes::from_static(br#"{"name":"Ana","email":"nope","message":"Hi"}"#),
        );

        let res = contact(req, state(ResultLoader::default())).await;
        assert_eq!(res.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body(&res), json!({ "error": "Invalid field: email" }));
    }

    struct FailingMailer;

    #[async_trait::async_trait]
    impl crate::mail::Mailer for FailingMailer {
        async fn send(&self, _message: &crate::mail::Message) -> Result<Delivery, crate::mail::MailError> {
            Err(crate::mail::MailError::Rejected(503))
        }
    }

    #[tokio::test]
    async fn contact_delivery_failure_is_not_masked() {
        let config = Config::from_lookup(|_| None).unwrap();
        let state = Arc::new(AppState::new(config).with_mailer(Arc::new(FailingMailer)));
        let req = Request::new(
            Method::Post,
            "/api/contact".parse().unwrap(),
            HeaderMap::new(),
            Bytes::from_static(br#"{"name":"Ana","email":"ana@example.com","message":"Hi"}"#),
        );

        let res = contact(req, state).await;
        assert_eq!(res.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(body(&res), json!({ "error": "Failed to send message" }));
    }
}
