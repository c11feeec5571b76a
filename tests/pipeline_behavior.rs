//! Behavior-driven tests for the request pipeline
//!
//! These tests verify HOW a call travels from parameters to a result:
//! validation, credential injection, bounded retry and error classification.

use std::sync::Arc;

use phishnet_core::{
    catalog::{GET_ALL_ARTISTS, GET_BLOGS, GET_RECENT_BLOGS, QUERY_COLLECTIONS},
    ClientConfig, HttpError, HttpMethod, HttpResponse, ParamValidator, Params, PhishnetClient,
    PhishnetError, RequestPipeline, RetryPolicy, ScriptedHttpClient, ValidationError,
};

const RECENT_BLOGS: &str = r#"{
    "error_code": 0,
    "error_message": null,
    "response": {
        "count": 3,
        "data": [
            {"blogid": 1, "title": "Fall Tour"},
            {"blogid": 2, "title": "Baker's Dozen"},
            {"blogid": 3, "title": "Big Cypress"}
        ]
    }
}"#;

fn client_over(transport: Arc<ScriptedHttpClient>, retries: u32) -> PhishnetClient {
    let config =
        ClientConfig::new("apikey123456789test1").with_retry(RetryPolicy::immediate(retries));
    PhishnetClient::with_transport(config, transport)
        .with_validator(ParamValidator::with_current_year(2024))
}

fn flaky_transport(failures: usize) -> Arc<ScriptedHttpClient> {
    let transport = Arc::new(ScriptedHttpClient::new());
    for attempt in 0..failures {
        if attempt % 2 == 0 {
            transport.push_error(HttpError::new("connection reset by peer"));
        } else {
            transport.push_response(HttpResponse::new(502, "bad gateway"));
        }
    }
    transport.push_response(HttpResponse::ok_json(RECENT_BLOGS));
    transport
}

// =============================================================================
// Success path
// =============================================================================

#[tokio::test]
async fn when_api_returns_blogs_client_exposes_count_and_data() {
    // Given: A transport returning three recent blog posts
    let transport = ScriptedHttpClient::always_json(RECENT_BLOGS);
    let mut client = client_over(transport.clone(), 3);

    // When: The caller asks for recent blogs
    let response = client.get_recent_blogs().await.expect("blogs");

    // Then: The payload is decoded and the API key rode along
    assert!(response.is_success());
    assert_eq!(response.count, Some(3));
    assert_eq!(response.data.as_array().map(Vec::len), Some(3));

    let request = transport.requests().remove(0);
    assert_eq!(request.method, HttpMethod::Post);
    assert!(request.url.ends_with("/v3/blog/get"));
    assert_eq!(request.form_field("apikey").as_deref(), Some("apikey123456789test1"));
}

// =============================================================================
// Retry: transient transport failures
// =============================================================================

#[tokio::test]
async fn when_failures_fit_the_budget_call_eventually_succeeds() {
    for failures in 0..=4 {
        for retries in failures..=5 {
            // Given: A transport that fails `failures` times then succeeds
            let transport = flaky_transport(failures);
            let mut client = client_over(transport.clone(), retries as u32);

            // When: The call runs with a budget of `retries`
            let result = client.get_recent_blogs().await;

            // Then: It succeeds after exactly failures + 1 attempts
            assert!(result.is_ok(), "failures={failures} retries={retries}");
            assert_eq!(transport.calls(), failures + 1);
        }
    }
}

#[tokio::test]
async fn when_failures_exceed_the_budget_retries_are_exhausted() {
    for failures in 1..=5 {
        for retries in 0..failures {
            // Given: More transient failures than retries
            let transport = flaky_transport(failures);
            let mut client = client_over(transport.clone(), retries as u32);

            // When: The call runs
            let err = client.get_recent_blogs().await.expect_err("gave up");

            // Then: The terminal error is RetriesExhausted after budget + 1 attempts
            match err {
                PhishnetError::RetriesExhausted {
                    endpoint, attempts, ..
                } => {
                    assert_eq!(endpoint, "blog/get");
                    assert_eq!(attempts as usize, retries + 1);
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(transport.calls(), retries + 1);
        }
    }
}

#[tokio::test]
async fn when_budget_is_zero_a_single_failure_is_terminal() {
    // Given: No retry budget and a failing transport
    let transport = Arc::new(ScriptedHttpClient::new());
    transport.push_error(HttpError::new("timed out"));
    let mut client = client_over(transport.clone(), 0);

    // When: The call runs
    let err = client.get_all_artists().await.expect_err("one shot");

    // Then: Exhaustion is reported distinctly from the transport failure
    assert!(matches!(err, PhishnetError::RetriesExhausted { attempts: 1, .. }));
    assert_eq!(transport.calls(), 1);
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn per_call_budget_overrides_the_configured_one() {
    // Given: A configured budget of 3 but a caller asking for 1
    let transport = flaky_transport(2);
    let mut client = client_over(transport.clone(), 3);

    // When: The low-level request entry is used
    let err = client
        .request("post", "blog/get", Params::new(), 1)
        .await
        .expect_err("budget of one is too small");

    // Then: Only two attempts were made
    assert!(matches!(err, PhishnetError::RetriesExhausted { attempts: 2, .. }));
    assert_eq!(transport.calls(), 2);
}

// =============================================================================
// API errors are never retried
// =============================================================================

#[tokio::test]
async fn when_payload_reports_an_error_it_is_returned_after_one_attempt() {
    for code in [1_i64, 2, 5, 99] {
        // Given: A transport whose payload carries error_code > 0
        let body = format!(
            r#"{{"error_code":{code},"error_message":"Invalid apikey","response":null}}"#
        );
        let transport = ScriptedHttpClient::always_json(body);
        let mut client = client_over(transport.clone(), 3);

        // When: Any call runs
        let err = client.get_all_artists().await.expect_err("api error");

        // Then: ApiError with the code and message, one attempt only
        match err {
            PhishnetError::Api {
                endpoint,
                code: got,
                message,
            } => {
                assert_eq!(endpoint, "artists/all");
                assert_eq!(got, code);
                assert_eq!(message.as_deref(), Some("Invalid apikey"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
    }
}

#[tokio::test]
async fn error_code_zero_never_raises() {
    // Given: A success payload with an (ignored) message
    let transport = ScriptedHttpClient::always_json(
        r#"{"error_code":0,"error_message":"","response":{"count":0,"data":[]}}"#,
    );
    let mut client = client_over(transport, 3);

    // When/Then: The call succeeds
    let response = client.get_all_artists().await.expect("success");
    assert_eq!(response.error_code, 0);
}

#[tokio::test]
async fn undecodable_success_body_is_not_retried() {
    // Given: A 200 response that is not JSON
    let transport = ScriptedHttpClient::always_json("<html>maintenance</html>");
    let mut client = client_over(transport.clone(), 3);

    // When: A call runs
    let err = client.get_all_artists().await.expect_err("not json");

    // Then: Decode error after a single attempt
    assert!(matches!(err, PhishnetError::Decode { .. }));
    assert_eq!(transport.calls(), 1);
}

// =============================================================================
// Validation aborts before the network
// =============================================================================

#[tokio::test]
async fn invalid_parameters_never_reach_the_transport() {
    let transport = ScriptedHttpClient::always_json(RECENT_BLOGS);
    let mut client = client_over(transport.clone(), 3);

    let cases = [
        Params::new().with("year", 2008),
        Params::new().with("month", 13),
        Params::new().with("day", 0),
        Params::new().with("monthname", "Smarch"),
    ];
    for params in cases {
        let err = client.get_blogs(params).await.expect_err("invalid");
        assert!(matches!(err, PhishnetError::Validation(_)));
    }

    let err = client
        .query_collections(Params::new().with("contains", "100,abc,200"))
        .await
        .expect_err("bad id list");
    match err {
        PhishnetError::Validation(ref validation) => {
            assert_eq!(validation.field(), Some("contains"));
            assert!(err.to_string().contains("100,abc,200"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn blog_year_floor_is_2009() {
    let transport = ScriptedHttpClient::always_json(RECENT_BLOGS);
    let mut client = client_over(transport.clone(), 3);

    let err = client
        .get_blogs(Params::new().with("year", 2008))
        .await
        .expect_err("too early");
    assert!(matches!(
        err,
        PhishnetError::Validation(ValidationError::YearOutOfRange { floor: 2009, .. })
    ));

    client
        .get_blogs(Params::new().with("year", 2009))
        .await
        .expect("2009 is allowed");
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn unsupported_method_fails_without_network() {
    let transport = ScriptedHttpClient::always_json(RECENT_BLOGS);
    let mut client = client_over(transport.clone(), 3);

    for method in ["PUT", "delete", "PATCH"] {
        let err = client
            .request(method, "blog/get", Params::new(), 3)
            .await
            .expect_err("only GET and POST");
        assert!(matches!(err, PhishnetError::UnsupportedMethod { .. }));
        assert!(!err.is_retryable());
    }
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn get_requests_carry_parameters_in_the_query_string() {
    let transport = ScriptedHttpClient::always_json(RECENT_BLOGS);
    let mut client = client_over(transport.clone(), 3);

    client
        .request("GET", "blog/get", Params::new().with("monthname", "march"), 0)
        .await
        .expect("get works");

    let request = transport.requests().remove(0);
    assert_eq!(request.method, HttpMethod::Get);
    assert!(request.body.is_none());
    assert_eq!(request.form_field("monthname").as_deref(), Some("march"));
    assert_eq!(request.form_field("apikey").as_deref(), Some("apikey123456789test1"));
}

// =============================================================================
// Pipeline used directly
// =============================================================================

#[tokio::test]
async fn pipeline_does_not_validate_on_its_own() {
    // The pipeline only builds and sends; validation belongs to the client.
    let transport = ScriptedHttpClient::always_json(RECENT_BLOGS);
    let pipeline = RequestPipeline::new(ClientConfig::new("k"), transport.clone());

    pipeline
        .send(HttpMethod::Post, &GET_BLOGS, Params::new().with("year", 1900))
        .await
        .expect("sent as-is");
    pipeline
        .send(HttpMethod::Post, &QUERY_COLLECTIONS, Params::new())
        .await
        .expect("sent as-is");
    pipeline
        .send(HttpMethod::Post, &GET_RECENT_BLOGS, Params::new())
        .await
        .expect("sent as-is");
    pipeline
        .send(HttpMethod::Get, &GET_ALL_ARTISTS, Params::new())
        .await
        .expect("sent as-is");

    assert_eq!(transport.calls(), 4);
}
