use transport::{HttpTransport, RequestSpec, Transport};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn redirects_are_returned_instead_of_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_ah/login"))
        .and(query_param("auth", "artifact"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/elsewhere")
                .insert_header("Set-Cookie", "ACSID=abc; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new("Rust/org.quizpoll/0.1.0/1").unwrap();
    let response = transport
        .send(&RequestSpec::get(
            "login",
            format!("{}/_ah/login?auth=artifact", server.uri()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 302);
    let cookies: Vec<_> = response.header_values("set-cookie").collect();
    assert_eq!(cookies, ["ACSID=abc; Path=/"]);
}

#[tokio::test]
async fn headers_user_agent_and_body_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/qp_api/poll/submit"))
        .and(header("Cookie", "ACSID=abc"))
        .and(header("User-Agent", "Rust/org.quizpoll/0.1.0/1"))
        .and(body_string(r#"{"answers":"1"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new("Rust/org.quizpoll/0.1.0/1").unwrap();
    let request = RequestSpec::post(
        "submit-poll-answer",
        format!("{}/qp_api/poll/submit", server.uri()),
        r#"{"answers":"1"}"#.to_string(),
    )
    .with_header("Cookie", "ACSID=abc");

    let response = transport.send(&request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "OK");
}

#[tokio::test]
async fn error_statuses_are_not_transport_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(426))
        .mount(&server)
        .await;

    let transport = HttpTransport::new("Rust/org.quizpoll/0.0.1/1").unwrap();
    let response = transport
        .send(&RequestSpec::get("fetch-poll", format!("{}/qp_api/poll/x", server.uri())))
        .await
        .unwrap();
    assert_eq!(response.status, 426);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let transport = HttpTransport::new("Rust/org.quizpoll/0.1.0/1").unwrap();
    let outcome = transport.send(&RequestSpec::get("quiz", format!("{uri}/qp_api/quiz/x"))).await;
    assert!(outcome.is_err());
}
