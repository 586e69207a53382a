mod common;

use std::time::Duration;

use callrx::transport::{HyperTransport, StringConverter};
use callrx::{
    Adapted, CallError, CallResult, Flowable, Response, ReturnShape, RxCallAdapterFactory,
};
use common::{MockResponse, MockServer};
use futures::StreamExt;

#[tokio::test]
async fn test_single_yields_body() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::ok("Hi"));
    let transport = HyperTransport::new().unwrap();
    let call = transport.get(&server.url("/"), StringConverter).unwrap();

    let body = RxCallAdapterFactory::create().body(call).into_single().await;
    assert_eq!(body.unwrap(), "Hi");
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn test_single_disconnect_is_transport_error() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::Disconnect);
    let transport = HyperTransport::new().unwrap();
    let call = transport.get(&server.url("/"), StringConverter).unwrap();

    let err = RxCallAdapterFactory::create()
        .body(call)
        .into_single()
        .await
        .unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_resubscribe_fails_without_second_request() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::ok("Hi"));
    server.enqueue(MockResponse::ok("again"));
    let transport = HyperTransport::new().unwrap();
    let call = transport.get(&server.url("/"), StringConverter).unwrap();

    let single = RxCallAdapterFactory::create().body(call).into_single();
    assert_eq!(single.subscribe().await.unwrap(), "Hi");

    let err = single.subscribe().await.unwrap_err();
    assert!(matches!(err, CallError::IllegalState(ref msg) if msg == "Already executed"));
    assert_eq!(server.request_count(), 1);
}

#[derive(Clone, Copy, Debug)]
enum Projection {
    Response,
    Body,
    Result,
}

struct FlowableCase {
    projection: Projection,
    response: MockResponse,
    expected: &'static [&'static str],
}

fn hi() -> MockResponse {
    MockResponse::ok("Hi")
}

fn not_found() -> MockResponse {
    MockResponse::status(404, "Client Error", "Hi")
}

fn case(
    projection: Projection,
    response: MockResponse,
    expected: &'static [&'static str],
) -> FlowableCase {
    FlowableCase {
        projection,
        response,
        expected,
    }
}

fn flowable_cases() -> Vec<FlowableCase> {
    let disconnect = MockResponse::Disconnect;
    vec![
        case(Projection::Response, hi(), &["response 200"]),
        case(Projection::Response, not_found(), &["response 404"]),
        case(Projection::Response, disconnect.clone(), &["transport error"]),
        case(Projection::Body, hi(), &["body Hi"]),
        case(Projection::Body, not_found(), &["http error 404"]),
        case(Projection::Body, disconnect.clone(), &["transport error"]),
        case(Projection::Result, hi(), &["result response 200"]),
        case(Projection::Result, not_found(), &["result response 404"]),
        case(Projection::Result, disconnect, &["result error"]),
    ]
}

/// Subscribe, let the call finish before any demand, then drain.
async fn drain_flowable<T: Send + 'static>(
    server: &MockServer,
    flowable: Flowable<T>,
    describe: fn(T) -> String,
) -> Vec<String> {
    let mut stream = flowable.subscribe();

    // The request goes out before the consumer asks for anything.
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.request_count() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        events.push(match item {
            Ok(value) => describe(value),
            Err(CallError::Http(err)) => format!("http error {}", err.code()),
            Err(CallError::Transport(_)) => "transport error".to_string(),
            Err(err) => format!("unexpected error {err}"),
        });
    }
    assert!(stream.next().await.is_none());
    assert_eq!(stream.dropped(), 0);
    events
}

#[tokio::test]
async fn test_flowable_holds_latest_until_polled() {
    for case in flowable_cases() {
        let server = MockServer::start().await;
        server.enqueue(case.response.clone());
        let transport = HyperTransport::new().unwrap();
        let call = transport.get(&server.url("/"), StringConverter).unwrap();
        let factory = RxCallAdapterFactory::create();

        let events = match case.projection {
            Projection::Response => {
                let flowable = factory.response(call).into_flowable();
                drain_flowable(&server, flowable, |r: Response<String>| {
                    format!("response {}", r.code())
                })
                .await
            }
            Projection::Body => {
                let flowable = factory.body(call).into_flowable();
                drain_flowable(&server, flowable, |b: String| format!("body {b}")).await
            }
            Projection::Result => {
                let flowable = factory.result(call).into_flowable();
                drain_flowable(&server, flowable, |r: CallResult<String>| match r {
                    CallResult::Response(response) => {
                        format!("result response {}", response.code())
                    }
                    CallResult::Error(_) => "result error".to_string(),
                })
                .await
            }
        };

        assert_eq!(
            events, case.expected,
            "{:?} with {:?}",
            case.projection, case.response
        );
        assert_eq!(
            server.request_count(),
            1,
            "{:?} with {:?}",
            case.projection,
            case.response
        );
    }
}

#[tokio::test]
async fn test_maybe_and_completable_over_http() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::ok("Hi"));
    server.enqueue(MockResponse::status(500, "Server Error", "boom"));
    let transport = HyperTransport::new().unwrap();
    let factory = RxCallAdapterFactory::create();

    let call = transport.get(&server.url("/"), StringConverter).unwrap();
    assert_eq!(factory.body(call).into_maybe().await.unwrap(), Some("Hi".into()));

    let call = transport.get(&server.url("/"), StringConverter).unwrap();
    let err = factory.body(call).into_completable().await.unwrap_err();
    assert_eq!(err.http().unwrap().code(), 500);
}

#[tokio::test]
async fn test_shape_chosen_at_runtime() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::ok("Hi"));
    let transport = HyperTransport::new().unwrap();
    let call = transport.get(&server.url("/"), StringConverter).unwrap();

    let adapted = RxCallAdapterFactory::create()
        .response(call)
        .into_shape(ReturnShape::Single);
    let Adapted::Single(single) = adapted else {
        panic!("expected a single");
    };
    let response = single.await.unwrap();
    assert_eq!(response.code(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_subscribe_on_scheduler() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::ok("Hi"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();

    let transport = HyperTransport::builder()
        .runtime(runtime.handle().clone())
        .build()
        .unwrap();
    let call = transport.get(&server.url("/"), StringConverter).unwrap();

    let factory = RxCallAdapterFactory::builder()
        .scheduler(runtime.handle().clone())
        .build();
    let body = factory.body(call).into_single().await.unwrap();
    assert_eq!(body, "Hi");

    runtime.shutdown_background();
}
