use std::sync::Arc;

use backend::{BrokerApi, BrokerRequest, ServiceApi};
use quizpoll::{AuthArtifact, Credential, DocumentId, ErrorKind, SheetId};
use transport::{HttpTransport, RequestExecutor};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn executor() -> RequestExecutor {
    RequestExecutor::new(Arc::new(HttpTransport::new("Rust/org.quizpoll/0.1.0/1").unwrap()))
}

fn cookie() -> Credential {
    Credential::new("ACSID=abc").unwrap()
}

const POLL_JSON: &str = r#"{
    "title": "[P] Lecture 4",
    "internal_data_sheet": "od6",
    "responses_sheet": "od7",
    "document_id": "doc42",
    "questions": [
        {
            "question_text": "Best language?",
            "number": 0,
            "anonymous": true,
            "answers": [
                {"answer_text": "Rust", "correct": true, "number": 0},
                {"answer_text": "Other", "correct": false, "number": 1}
            ]
        }
    ]
}"#;

#[tokio::test]
async fn fetch_poll_decodes_the_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/qp_api/poll/doc42"))
        .and(header("Cookie", "ACSID=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(POLL_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let api = BrokerApi::new(server.uri());
    let request = BrokerRequest::Poll { document_id: DocumentId::new("doc42").unwrap() };
    let spec = api.build(&request, &cookie()).unwrap();
    let raw = executor().execute(spec).await.unwrap();
    let poll = api.decode(&request, raw).unwrap().into_poll().unwrap();

    assert_eq!(poll.internal_data_sheet.as_str(), "od6");
    assert_eq!(poll.questions.len(), 1);
    assert!(poll.questions[0].anonymous);
    assert!(!poll.questions[0].answers[0].answered);
}

#[tokio::test]
async fn expired_session_redirect_is_reported_as_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/qp_api/poll/status/doc42/od6"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login"))
        .mount(&server)
        .await;

    let api = BrokerApi::new(server.uri());
    let request = BrokerRequest::PollStatus {
        document_id: DocumentId::new("doc42").unwrap(),
        sheet_id: SheetId::new("od6").unwrap(),
    };
    let raw = executor().execute(api.build(&request, &cookie()).unwrap()).await.unwrap();
    assert_eq!(api.decode(&request, raw), Err(ErrorKind::SessionExpired));
}

#[tokio::test]
async fn permission_error_is_classified_before_decoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let api = BrokerApi::new(server.uri());
    let request = BrokerRequest::Quiz { document_id: DocumentId::new("secret").unwrap() };
    let outcome = executor().execute(api.build(&request, &cookie()).unwrap()).await;
    assert_eq!(outcome, Err(ErrorKind::Forbidden));
}

#[tokio::test]
async fn login_exchanges_the_artifact_for_a_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_ah/login"))
        .and(query_param("auth", "artifact"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/")
                .insert_header(
                    "Set-Cookie",
                    "ACSID=fresh; expires=Fri, 01-Jan-2100 00:00:00 GMT; path=/",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = BrokerApi::new(server.uri());
    let spec = api.login_request(&AuthArtifact::new("artifact").unwrap());
    let raw = executor().execute(spec).await.unwrap();
    assert_eq!(api.decode_login(&raw).unwrap().expose(), "ACSID=fresh");
}
