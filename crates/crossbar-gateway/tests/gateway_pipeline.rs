//! End-to-end tests for the gateway dispatch pipeline.
//!
//! Collaborators are mocked inline: a scripted authorization service, a
//! validator that interprets schemas as simple shape names, and a
//! recording durable request service.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{header, Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crossbar_core::{
    AuthError, AuthInfo, AuthResult, AuthorizationService, BeginRequest, BoxFuture,
    CompleteRequest, DurableRequestService, FaultTable, HandlerError, RequestServiceError,
    RequestTicket, Schema, SchemaValidator,
};
use crossbar_gateway::{
    Gateway, GatewayDeps, HandlerDescriptor, HttpResponse, RouteTable,
};

// --- mock collaborators ---------------------------------------------------

#[derive(Clone, Copy)]
enum AuthMode {
    Accept,
    RejectToken,
    RejectAuthorize,
}

struct ScriptedAuth {
    mode: AuthMode,
}

impl AuthorizationService for ScriptedAuth {
    fn authenticate<'a>(
        &'a self,
        _request: &'a http::request::Parts,
    ) -> BoxFuture<'a, Result<AuthInfo, AuthError>> {
        let mode = self.mode;
        Box::pin(async move {
            match mode {
                AuthMode::RejectToken => Err(AuthError::InvalidToken),
                _ => Ok(AuthInfo {
                    principal_id: "acct.user".to_string(),
                    account_id: Some("acct".to_string()),
                    session_id: None,
                    kind: "bearer".to_string(),
                    token: "token-1".to_string(),
                }),
            }
        })
    }

    fn authorize<'a>(
        &'a self,
        _request: &'a http::request::Parts,
        info: &'a AuthInfo,
        _action: Option<&'a str>,
        _body: &'a Value,
    ) -> BoxFuture<'a, Result<AuthResult, AuthError>> {
        let mode = self.mode;
        Box::pin(async move {
            match mode {
                AuthMode::RejectAuthorize => Err(AuthError::NotAuthorized),
                _ => Ok(AuthResult {
                    principal_id: info.principal_id.clone(),
                    claims: Some(json!({"role": "manager"})),
                }),
            }
        })
    }
}

/// Interprets a schema as a shape name: `"object"` requires a JSON object,
/// anything else accepts everything.
struct ShapeValidator;

impl SchemaValidator for ShapeValidator {
    fn validate(&self, schema: &Schema, value: Option<&Value>, root: &str) -> Vec<String> {
        match schema.as_str() {
            Some("object") => {
                if matches!(value, Some(Value::Object(_))) {
                    Vec::new()
                } else {
                    vec![format!("{root} is not an object.")]
                }
            }
            _ => Vec::new(),
        }
    }
}

#[derive(Default)]
struct RecordingRequests {
    begun: Mutex<Vec<BeginRequest>>,
    completed: Mutex<Vec<CompleteRequest>>,
}

impl DurableRequestService for RecordingRequests {
    fn begin_request(
        &self,
        begin: BeginRequest,
    ) -> BoxFuture<'_, Result<RequestTicket, RequestServiceError>> {
        Box::pin(async move {
            let mut begun = self.begun.lock();
            begun.push(begin);
            Ok(RequestTicket {
                request_id: format!("req-{}", begun.len()),
            })
        })
    }

    fn complete_request(
        &self,
        complete: CompleteRequest,
    ) -> BoxFuture<'_, Result<(), RequestServiceError>> {
        Box::pin(async move {
            self.completed.lock().push(complete);
            Ok(())
        })
    }
}

// --- helpers --------------------------------------------------------------

fn gateway(
    routes: RouteTable,
    mode: AuthMode,
    requests: Option<Arc<RecordingRequests>>,
) -> Gateway {
    Gateway::new(
        routes,
        GatewayDeps {
            authorization: Arc::new(ScriptedAuth { mode }),
            validator: Arc::new(ShapeValidator),
            request_service: requests
                .map(|r| r as Arc<dyn DurableRequestService>),
        },
    )
}

fn post(path: &str, body: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

async fn body_json(response: HttpResponse) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// --- routing and validation ----------------------------------------------

#[tokio::test]
async fn unknown_route_responds_invalid_request_with_200() {
    let routes = RouteTable::builder().build(false).unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let response = gateway.handle(post("/nowhere", "{}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"code": "invalid-request"}));
}

#[tokio::test]
async fn unknown_method_responds_invalid_request() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/echo",
            HandlerDescriptor::method(Arc::new(|_ctx, payload| {
                Box::pin(async move { Ok(payload) })
            }))
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/echo")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = gateway.handle(request).await;
    assert_eq!(body_json(response).await, json!({"code": "invalid-request"}));
}

#[tokio::test]
async fn invalid_json_body_responds_invalid_request() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/echo",
            HandlerDescriptor::method(Arc::new(|_ctx, payload| {
                Box::pin(async move { Ok(payload) })
            }))
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let response = gateway.handle(post("/echo", "not json")).await;
    assert_eq!(body_json(response).await, json!({"code": "invalid-request"}));
}

#[tokio::test]
async fn violated_request_schema_responds_errors() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/echo",
            HandlerDescriptor::method(Arc::new(|_ctx, payload| {
                Box::pin(async move { Ok(payload) })
            }))
            .request_schema(json!("object"))
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let response = gateway.handle(post("/echo", "[1, 2]")).await;
    assert_eq!(
        body_json(response).await,
        json!({"code": "invalid-request", "data": ["body is not an object."]})
    );
}

#[tokio::test]
async fn form_body_is_decoded_to_flat_pairs() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/echo",
            HandlerDescriptor::method(Arc::new(|_ctx, payload| {
                Box::pin(async move { Ok(payload) })
            }))
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/echo")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Full::new(Bytes::from_static(b"item=book&note=hello+world")))
        .unwrap();

    let response = gateway.handle(request).await;
    assert_eq!(
        body_json(response).await,
        json!({"code": "ok", "data": {"item": "book", "note": "hello world"}})
    );
}

#[tokio::test]
async fn preflight_is_auto_registered_for_post_paths() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/echo",
            HandlerDescriptor::method(Arc::new(|_ctx, payload| {
                Box::pin(async move { Ok(payload) })
            }))
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/echo")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = gateway.handle(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap(),
        "OPTIONS, POST"
    );
}

// --- authorization --------------------------------------------------------

#[tokio::test]
async fn invalid_token_responds_not_authorized() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/secure",
            HandlerDescriptor::method(Arc::new(|_ctx, payload| {
                Box::pin(async move { Ok(payload) })
            }))
            .requires_auth(true)
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::RejectToken, None);

    let response = gateway.handle(post("/secure", "{}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"code": "not-authorized"}));
}

#[tokio::test]
async fn authorize_rejection_responds_not_authorized() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/secure",
            HandlerDescriptor::method(Arc::new(|_ctx, payload| {
                Box::pin(async move { Ok(payload) })
            }))
            .requires_auth(true)
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::RejectAuthorize, None);

    let response = gateway.handle(post("/secure", "{}")).await;
    assert_eq!(body_json(response).await, json!({"code": "not-authorized"}));
}

#[tokio::test]
async fn authorized_principal_reaches_the_handler() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/whoami",
            HandlerDescriptor::method(Arc::new(|ctx, _payload| {
                Box::pin(async move {
                    Ok(Some(json!({
                        "principalId": ctx.principal_id,
                        "claims": ctx.claims,
                    })))
                })
            }))
            .requires_auth(true)
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let response = gateway.handle(post("/whoami", "{}")).await;
    assert_eq!(
        body_json(response).await,
        json!({
            "code": "ok",
            "data": {"principalId": "acct.user", "claims": {"role": "manager"}}
        })
    );
}

// --- immediate dispatch ---------------------------------------------------

#[tokio::test]
async fn response_schema_violation_hides_the_data() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/broken",
            HandlerDescriptor::method(Arc::new(|_ctx, _payload| {
                Box::pin(async move { Ok(Some(json!([1, 2, 3]))) })
            }))
            .response_schema(json!("object"))
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let response = gateway.handle(post("/broken", "{}")).await;
    assert_eq!(body_json(response).await, json!({"code": "internal-error"}));
}

#[tokio::test]
async fn fault_table_maps_handler_failures() {
    let mut table = FaultTable::new();
    table.insert("x".to_string(), Some("y".to_string()));
    table.insert("pass".to_string(), None);

    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/fail",
            HandlerDescriptor::method(Arc::new(|_ctx, payload| {
                Box::pin(async move {
                    let message = payload
                        .as_ref()
                        .and_then(|p| p.get("message"))
                        .and_then(Value::as_str)
                        .unwrap_or("unmapped")
                        .to_string();
                    Err(HandlerError::new(message))
                })
            }))
            .fault_table(table)
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let response = gateway.handle(post("/fail", r#"{"message": "x"}"#)).await;
    assert_eq!(body_json(response).await, json!({"code": "y"}));

    let response = gateway.handle(post("/fail", r#"{"message": "pass"}"#)).await;
    assert_eq!(body_json(response).await, json!({"code": "pass"}));

    let response = gateway.handle(post("/fail", r#"{"message": "other"}"#)).await;
    assert_eq!(body_json(response).await, json!({"code": "internal-error"}));
}

#[tokio::test]
async fn unmapped_failure_without_table_is_internal_error() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/fail",
            HandlerDescriptor::method(Arc::new(|_ctx, _payload| {
                Box::pin(async move { Err(HandlerError::new("anything")) })
            }))
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let response = gateway.handle(post("/fail", "{}")).await;
    assert_eq!(body_json(response).await, json!({"code": "internal-error"}));
}

#[tokio::test]
async fn raw_handler_response_is_not_overwritten() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/direct",
            HandlerDescriptor::raw(|_request, writer| {
                Box::pin(async move {
                    writer.send_ok(Some(json!({"wrote": "directly"})));
                    // A later failure must not produce a second response.
                    Err(HandlerError::new("late-failure"))
                })
            })
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let response = gateway.handle(post("/direct", "{}")).await;
    assert_eq!(
        body_json(response).await,
        json!({"code": "ok", "data": {"wrote": "directly"}})
    );
}

#[tokio::test]
async fn cors_header_follows_the_descriptor() {
    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/open",
            HandlerDescriptor::method(Arc::new(|_ctx, payload| {
                Box::pin(async move { Ok(payload) })
            }))
            .cors(true)
            .build(),
        )
        .build(false)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, None);

    let response = gateway.handle(post("/open", "{}")).await;
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

// --- deferred dispatch ----------------------------------------------------

fn deferred_routes(gate: Arc<Notify>, result: Result<Option<Value>, String>) -> RouteTable {
    RouteTable::builder()
        .route(
            Method::POST,
            "/orders/place",
            HandlerDescriptor::method(Arc::new(move |_ctx, _payload| {
                let gate = Arc::clone(&gate);
                let result = result.clone();
                Box::pin(async move {
                    gate.notified().await;
                    result.map_err(HandlerError::new)
                })
            }))
            .requires_auth(true)
            .action("orders.place")
            .deferred("orders")
            .build(),
        )
        .build(true)
        .unwrap()
}

#[tokio::test]
async fn deferred_route_acknowledges_before_the_handler_resolves() {
    let gate = Arc::new(Notify::new());
    let requests = Arc::new(RecordingRequests::default());
    let routes = deferred_routes(Arc::clone(&gate), Ok(Some(json!({"done": true}))));
    let gateway = gateway(routes, AuthMode::Accept, Some(Arc::clone(&requests)));

    // The acknowledgment arrives while the handler is still blocked.
    let response = gateway.handle(post("/orders/place", "{}")).await;
    assert_eq!(
        body_json(response).await,
        json!({"code": "ok", "data": {"requestId": "req-1"}})
    );

    {
        let begun = requests.begun.lock();
        assert_eq!(begun.len(), 1);
        assert_eq!(begun[0].principal_id, "acct.user");
        assert_eq!(begun[0].service_id, "orders");
        assert_eq!(begun[0].action, "orders.place");
    }
    assert!(requests.completed.lock().is_empty());

    // Release the handler; the record becomes terminal exactly once.
    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let completed = requests.completed.lock();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].request_id, "req-1");
    assert_eq!(completed[0].code, "ok");
    assert_eq!(completed[0].data, Some(json!({"done": true})));
}

#[tokio::test]
async fn deferred_handler_failure_completes_with_resolved_fault() {
    let gate = Arc::new(Notify::new());
    let requests = Arc::new(RecordingRequests::default());

    let mut table = FaultTable::new();
    table.insert("stock-missing".to_string(), Some("rejected".to_string()));

    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/orders/place",
            HandlerDescriptor::method({
                let gate = Arc::clone(&gate);
                Arc::new(move |_ctx, _payload| {
                    let gate = Arc::clone(&gate);
                    Box::pin(async move {
                        gate.notified().await;
                        Err(HandlerError::new("stock-missing"))
                    })
                })
            })
            .requires_auth(true)
            .action("orders.place")
            .deferred("orders")
            .fault_table(table)
            .build(),
        )
        .build(true)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, Some(Arc::clone(&requests)));

    let response = gateway.handle(post("/orders/place", "{}")).await;
    assert_eq!(
        body_json(response).await,
        json!({"code": "ok", "data": {"requestId": "req-1"}})
    );

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let completed = requests.completed.lock();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].code, "rejected");
    assert_eq!(completed[0].data, None);
}

#[tokio::test]
async fn deferred_handler_without_value_leaves_the_record_open() {
    let gate = Arc::new(Notify::new());
    let requests = Arc::new(RecordingRequests::default());
    let routes = deferred_routes(Arc::clone(&gate), Ok(None));
    let gateway = gateway(routes, AuthMode::Accept, Some(Arc::clone(&requests)));

    let response = gateway.handle(post("/orders/place", "{}")).await;
    assert_eq!(
        body_json(response).await,
        json!({"code": "ok", "data": {"requestId": "req-1"}})
    );

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Completion belongs to a later actor; the gateway must not complete.
    assert!(requests.completed.lock().is_empty());
}

#[tokio::test]
async fn deferred_response_schema_violation_completes_internal_error() {
    let gate = Arc::new(Notify::new());
    let requests = Arc::new(RecordingRequests::default());

    let routes = RouteTable::builder()
        .route(
            Method::POST,
            "/orders/place",
            HandlerDescriptor::method({
                let gate = Arc::clone(&gate);
                Arc::new(move |_ctx, _payload| {
                    let gate = Arc::clone(&gate);
                    Box::pin(async move {
                        gate.notified().await;
                        Ok(Some(json!([1, 2, 3])))
                    })
                })
            })
            .requires_auth(true)
            .action("orders.place")
            .deferred("orders")
            .response_schema(json!("object"))
            .build(),
        )
        .build(true)
        .unwrap();
    let gateway = gateway(routes, AuthMode::Accept, Some(Arc::clone(&requests)));

    let _response = gateway.handle(post("/orders/place", "{}")).await;

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let completed = requests.completed.lock();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].code, "internal-error");
    assert_eq!(completed[0].data, None);
}
