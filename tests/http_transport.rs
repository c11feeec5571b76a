//! End-to-end tests over the reqwest transport against a local mock server.

use std::time::Duration;

use phishnet_core::{
    ClientConfig, HttpMethod, Params, PhishnetClient, PhishnetError, RetryPolicy,
};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "apikey123456789test1";

const AUTHORITY: &str =
    r#"{"error_code":0,"error_message":null,"response":{"count":1,"data":{"appid":12345,"authkey":"B6386A2485D94C73DAA"}}}"#;

const SHOWS: &str =
    r#"{"error_code":0,"error_message":null,"response":{"count":1,"data":[{"showid":1252691618,"showdate":"1997-11-22"}]}}"#;

fn client_for(server: &MockServer, retry: RetryPolicy) -> PhishnetClient {
    let config = ClientConfig::new(API_KEY)
        .with_base_url(server.uri())
        .with_retry(retry);
    PhishnetClient::new(config).expect("reqwest client builds")
}

#[tokio::test]
async fn authorize_against_a_live_http_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/authority/get"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains(format!("apikey={API_KEY}")))
        .and(body_string_contains("uid=15"))
        .and(body_string_contains("unique_hash="))
        .respond_with(ResponseTemplate::new(200).set_body_string(AUTHORITY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server, RetryPolicy::default());
    client
        .authorize(15, "123456789abcdefghij")
        .await
        .expect("authorized");
    client
        .authorize(15, "123456789abcdefghij")
        .await
        .expect("cached");

    assert_eq!(client.user_id(), Some(15));
    assert_eq!(client.auth_key(), Some("B6386A2485D94C73DAA"));
    assert_eq!(client.app_id(), Some(12345));
}

#[tokio::test]
async fn form_body_is_url_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/shows/query"))
        .and(body_string_contains("city=Hampton%20Roads"))
        .and(body_string_contains("showdate=1997-11-22"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHOWS))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server, RetryPolicy::default());
    let response = client
        .query_shows(
            Params::new()
                .with("showdate", "1997-11-22")
                .with("city", "Hampton Roads"),
        )
        .await
        .expect("shows");

    assert_eq!(response.count, Some(1));
    assert_eq!(response.data[0]["showid"], 1252691618);
}

#[tokio::test]
async fn get_sends_parameters_as_query_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/shows/query"))
        .and(query_param("apikey", API_KEY))
        .and(query_param("year", "1997"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHOWS))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server, RetryPolicy::default());
    client
        .request(HttpMethod::Get.as_str(), "shows/query", Params::new().with("year", 1997), 0)
        .await
        .expect("shows");
}

#[tokio::test]
async fn non_200_status_is_retried_until_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/artists/all"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server, RetryPolicy::default());
    let err = client.get_all_artists().await.expect_err("always unavailable");

    assert!(matches!(err, PhishnetError::RetriesExhausted { attempts: 4, .. }));
}

#[tokio::test]
async fn api_error_on_a_200_is_returned_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/user/get"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"error_code":2,"error_message":"No such user"}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server, RetryPolicy::default());
    let err = client
        .get_user(Params::new().with("username", "nobody"))
        .await
        .expect_err("unknown user");

    assert!(matches!(err, PhishnetError::Api { code: 2, .. }));
}

#[tokio::test]
async fn slow_responses_time_out_per_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/setlists/latest"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SHOWS)
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new(API_KEY)
        .with_base_url(mock_server.uri())
        .with_timeout(Duration::from_millis(50))
        .with_retry(RetryPolicy::immediate(1));
    let mut client = PhishnetClient::new(config).expect("reqwest client builds");

    let err = client.get_latest_setlist().await.expect_err("too slow");

    match err {
        PhishnetError::RetriesExhausted {
            attempts, source, ..
        } => {
            assert_eq!(attempts, 2);
            assert!(source.retryable());
            assert!(!source.message().contains(API_KEY));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn session_cookies_ride_along_on_later_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/artists/all"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "phishnet_session=abc123; Path=/")
                .set_body_string(SHOWS),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/venues/all"))
        .and(header("cookie", "phishnet_session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHOWS))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server, RetryPolicy::no_retry());
    client.get_all_artists().await.expect("artists");
    client.get_all_venues().await.expect("venues carry the session cookie");
}
