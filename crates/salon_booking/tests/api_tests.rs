mod fixtures;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use fixtures::*;
use salon_booking::routes::routes;
use salon_booking::BookingState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(h: &Harness) -> Router {
    routes(Arc::new(BookingState::new(h.context.clone())))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn booking_body(time: &str) -> Value {
    json!({
        "date": "2031-03-04",
        "time": time,
        "duration_minutes": 60,
        "professional": "Anna",
        "customer": {"name": "Jane Doe", "email": "jane@example.com"}
    })
}

#[tokio::test]
async fn test_availability_endpoint() {
    let h = harness(FakeDirectory::new(vec![anna(), ben()]));
    let (status, body) = send(
        app(&h),
        get("/availability?date=2031-03-04&duration_minutes=60&service=Beard"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closed"], json!(false));
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 25);
    assert_eq!(slots[0]["time"], json!("08:00"));
    assert_eq!(slots[0]["available_professionals"], json!(["Ben"]));
}

#[tokio::test]
async fn test_availability_bad_date_is_400_with_kind() {
    let h = harness(FakeDirectory::new(vec![anna()]));
    let (status, body) = send(app(&h), get("/availability?date=tomorrow&duration_minutes=60")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], json!("validation"));
    assert_eq!(body["error"]["code"], json!(400));
}

#[tokio::test]
async fn test_availability_unknown_professional_is_404() {
    let h = harness(FakeDirectory::new(vec![anna()]));
    let (status, body) = send(
        app(&h),
        get("/availability?date=2031-03-04&duration_minutes=60&professional=Zoe"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], json!("professional_not_found"));
}

#[tokio::test]
async fn test_book_then_conflict() {
    let h = harness(FakeDirectory::new(vec![anna()]));

    let (status, body) = send(app(&h), json_request("POST", "/book", booking_body("10:00"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["professional"], json!("Anna"));
    assert_eq!(body["time"], json!("10:00"));
    assert_eq!(body["warnings"], json!([]));

    let (status, body) = send(app(&h), json_request("POST", "/book", booking_body("10:30"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], json!("conflict"));
}

#[tokio::test]
async fn test_upstream_detail_is_not_exposed() {
    let h = harness(FakeDirectory::new(vec![anna()]));
    h.calendar.fail_inserts();
    let (status, body) = send(app(&h), json_request("POST", "/book", booking_body("10:00"))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(!message.contains("insert refused"));
}

#[tokio::test]
async fn test_admin_list_cancel_and_patch() {
    let h = harness(FakeDirectory::new(vec![anna()]));
    let (_, booked) = send(app(&h), json_request("POST", "/book", booking_body("10:00"))).await;
    let event_id = booked["event_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app(&h),
        get("/admin/bookings?start_date=2031-03-04&end_date=2031-03-04"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings"][0]["event_id"], json!(event_id));
    assert_eq!(body["bookings"][0]["customer_name"], json!("Jane Doe"));
    assert_eq!(body["bookings"][0]["professional"], json!("Anna"));

    let uri = format!("/admin/bookings/Anna/{}", event_id);
    let (status, _) = send(
        app(&h),
        json_request(
            "PATCH",
            &uri,
            json!({"date": "2031-03-04", "time": "15:00", "duration_minutes": 30}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.calendar.events("anna@cal")[0].start, local(15, 0));

    let request = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&h), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(h.calendar.events("anna@cal").is_empty());
}

#[tokio::test]
async fn test_professionals_and_health() {
    let h = harness(FakeDirectory::new(vec![anna(), ben()]));
    let (status, body) = send(app(&h), get("/professionals")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[1]["name"], json!("Ben"));
    assert_eq!(body[1]["services"], json!(["Beard", "Cut"]));

    let (status, body) = send(app(&h), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["calendar"], json!(true));
}
