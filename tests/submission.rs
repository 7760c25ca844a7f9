//! End-to-end submission tests against a loopback HTTP server.

use std::io::Read;
use std::sync::mpsc;
use std::time::Duration;

use fbwidget::capture::SoftwareCapture;
use fbwidget::geometry::Rect;
use fbwidget::page::{ElementHit, Page, PageLocation, PageMetrics};
use fbwidget::rendering::raster::RasterSurface;
use fbwidget::{FeedbackWidget, HelperKind, SubmitStatus, View, WidgetOptions};

struct FakePage;

impl Page for FakePage {
    fn metrics(&self) -> PageMetrics {
        PageMetrics {
            scroll_width: 800.0,
            scroll_height: 1200.0,
            client_width: 800.0,
            client_height: 600.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    fn location(&self) -> PageLocation {
        PageLocation { host: "app.example.com".into(), path: "/checkout".into() }
    }

    fn hit_stack(&self, _x: f64, _y: f64) -> Vec<ElementHit> {
        vec![ElementHit { tag: "body".into(), rect: Rect::new(0.0, 0.0, 800.0, 1200.0) }]
    }
}

struct ReceivedRequest {
    method: String,
    content_type: String,
    body: serde_json::Value,
}

/// Serve `responses` status codes in order, forwarding each received
/// request to the returned channel.
fn start_endpoint(responses: Vec<u16>) -> (String, mpsc::Receiver<ReceivedRequest>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        for status in responses {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let content_type = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.as_str().to_string())
                .unwrap_or_default();
            let received = ReceivedRequest {
                method: request.method().as_str().to_string(),
                content_type,
                body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
            };
            let _ = tx.send(received);
            let _ = request.respond(tiny_http::Response::from_string("ok").with_status_code(status));
        }
    });

    (format!("http://{}/feedback", addr), rx)
}

fn widget_with_endpoint(endpoint: &str) -> FeedbackWidget<FakePage, RasterSurface> {
    let options = WidgetOptions { endpoint: endpoint.to_string(), ..Default::default() };
    FeedbackWidget::new(
        FakePage,
        RasterSurface::new(0, 0),
        Box::new(SoftwareCapture::new()),
        options,
    )
    .unwrap()
}

#[test]
fn end_to_end_single_post_with_description() {
    let (endpoint, requests) = start_endpoint(vec![200]);
    let mut widget = widget_with_endpoint(&endpoint);

    widget.open();
    widget.open_drawer();
    widget.draw_start(50.0, 50.0);
    widget.draw_move(150.0, 120.0);
    assert!(widget.draw_stop().is_some());

    widget.set_mode(HelperKind::Blackout);
    widget.draw_start(200.0, 200.0);
    widget.draw_move(260.0, 260.0);
    assert!(widget.draw_stop().is_some());

    widget.close_drawer();
    widget.set_description("test");

    assert_eq!(widget.submit_status(), SubmitStatus::Idle);
    widget.submit().unwrap();
    assert_eq!(widget.submit_status(), SubmitStatus::Sending);
    assert_eq!(widget.view(), View::Sending);

    let status = widget.wait_submission(Duration::from_secs(10));
    assert_eq!(status, SubmitStatus::Sent);
    assert_eq!(widget.view(), View::Sent);

    let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.content_type.to_ascii_lowercase(),
        "application/x-www-form-urlencoded; charset=utf-8"
    );
    assert_eq!(request.body["description"], "test");
    assert_eq!(request.body["url"], "app.example.com");
    assert_eq!(request.body["path"], "/checkout");
    let screenshot = request.body["screenshot"].as_str().unwrap();
    assert!(screenshot.starts_with("data:image/png;base64,"));

    // Exactly one POST was issued.
    assert!(requests.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn non_success_status_reaches_the_error_view_and_back_recovers() {
    let (endpoint, requests) = start_endpoint(vec![500, 200]);
    let mut widget = widget_with_endpoint(&endpoint);
    widget.open();
    widget.set_description("still broken");

    widget.submit().unwrap();
    assert_eq!(widget.wait_submission(Duration::from_secs(10)), SubmitStatus::Error);
    assert_eq!(widget.view(), View::Error);
    assert!(widget.submit_error().unwrap().contains("500"));

    // No automatic retry happened.
    let _ = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(requests.recv_timeout(Duration::from_millis(300)).is_err());

    // Submitting straight from the error view is rejected.
    assert!(widget.submit().is_err());

    widget.back_to_form();
    assert_eq!(widget.view(), View::Form);

    widget.submit().unwrap();
    assert_eq!(widget.wait_submission(Duration::from_secs(10)), SubmitStatus::Sent);
    let second = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(second.body["description"], "still broken");
}

#[test]
fn screenshot_is_empty_when_excluded() {
    let (endpoint, requests) = start_endpoint(vec![200]);
    let mut widget = widget_with_endpoint(&endpoint);
    widget.open();
    widget.toggle_screenshot();
    widget.submit().unwrap();
    widget.wait_submission(Duration::from_secs(10));

    let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(request.body["screenshot"], "");
}

#[test]
fn late_completion_after_close_mutates_nothing() {
    // The endpoint delays its answer until after the widget has closed.
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();
    let endpoint = format!("http://{}/feedback", addr);
    let responder = std::thread::spawn(move || {
        if let Ok(request) = server.recv() {
            std::thread::sleep(Duration::from_millis(300));
            let _ = request.respond(tiny_http::Response::from_string("ok"));
        }
    });

    let mut widget = widget_with_endpoint(&endpoint);
    widget.open();
    widget.submit().unwrap();
    assert_eq!(widget.submit_status(), SubmitStatus::Sending);

    widget.close();
    assert!(!widget.is_open());
    assert_eq!(widget.submit_status(), SubmitStatus::Idle);

    // Let the in-flight completion land, then pump: nothing may change.
    responder.join().unwrap();
    std::thread::sleep(Duration::from_millis(200));
    widget.pump();
    assert!(!widget.is_open());
    assert_eq!(widget.submit_status(), SubmitStatus::Idle);
    assert!(widget.helpers().is_empty());
}
