#![cfg(feature = "htmlpage")]

//! Hit-testing and widget integration over the HTML page backend.

use fbwidget::htmlpage::HtmlPage;
use fbwidget::page::Page;
use fbwidget::widget::Cursor;
use fbwidget::{widget_for_html, Viewport, WidgetOptions};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Pricing</title></head>
<body>
  <div class="hero">
    <h1>Plans</h1>
    <p>Pick the plan that fits your team.</p>
    <button id="buy">Buy now</button>
  </div>
</body>
</html>"#;

#[test]
fn fetched_page_reports_metrics_and_location() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();

    std::thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let _ = request.respond(tiny_http::Response::from_string(PAGE));
        }
    });

    let url = format!("http://{}/pricing", addr);
    let page = HtmlPage::fetch(&url, Viewport::default(), 5000).expect("fetch failed");

    let m = page.metrics();
    assert_eq!(m.client_width, 1280.0);
    assert!(m.scroll_height >= m.client_height);

    let loc = page.location();
    assert_eq!(loc.path, "/pricing");
    assert_eq!(loc.host, "127.0.0.1");
}

#[test]
fn hovering_a_button_snaps_to_its_box() {
    let mut widget = widget_for_html(PAGE, None, WidgetOptions::default()).unwrap();
    let button = widget.page().bounding_rect("button").unwrap();

    widget.open();
    widget.open_drawer();
    widget.pointer_hover(button.x + 2.0, button.y + 2.0);
    assert_eq!(widget.cursor(), Cursor::Pointer);
    assert_eq!(widget.candidate().unwrap(), button);

    let idx = widget.accept_candidate().unwrap();
    assert_eq!(widget.helpers().get(idx).unwrap().rect, button);
}

#[test]
fn hovering_a_container_div_is_not_snappable() {
    let mut widget = widget_for_html(PAGE, None, WidgetOptions::default()).unwrap();
    let div = widget.page().bounding_rect("div").unwrap();
    let button = widget.page().bounding_rect("button").unwrap();

    widget.open();
    widget.open_drawer();
    // A point inside the div but outside all of its whitelisted children.
    let x = div.x + 1.0;
    let y = button.bottom() + 1.0;
    widget.pointer_hover(x, y);
    assert_eq!(widget.cursor(), Cursor::Crosshair);
    assert!(widget.candidate().is_none());
}

#[test]
fn hit_test_skip_walks_past_inner_elements() {
    let options = WidgetOptions { hit_test_skip: Some(1), ..Default::default() };
    let mut widget = widget_for_html(PAGE, None, options).unwrap();
    let button = widget.page().bounding_rect("button").unwrap();

    widget.open();
    widget.open_drawer();
    // Skipping one entry lands on the container div, which is not in the
    // whitelist, so no candidate is proposed.
    widget.pointer_hover(button.x + 2.0, button.y + 2.0);
    assert_eq!(widget.cursor(), Cursor::Crosshair);
    assert!(widget.candidate().is_none());
}

#[test]
fn heading_and_paragraph_are_snappable() {
    let mut widget = widget_for_html(PAGE, None, WidgetOptions::default()).unwrap();
    widget.open();
    widget.open_drawer();

    for tag in ["h1", "p"] {
        let rect = widget.page().bounding_rect(tag).unwrap();
        widget.pointer_hover(rect.x + 2.0, rect.y + 2.0);
        assert_eq!(widget.cursor(), Cursor::Pointer, "tag {} should snap", tag);
        assert_eq!(widget.candidate().unwrap(), rect);
    }
}
