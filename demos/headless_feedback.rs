//! Headless feedback round-trip: serve a page and an endpoint on loopback,
//! annotate the page, and submit.

use std::io::Read;
use std::time::Duration;

use fbwidget::{widget_for_url, HelperKind, WidgetOptions};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Use a tiny HTTP server to provide repeatable content
    let server = tiny_http::Server::http("127.0.0.1:0")?;
    let addr = server.server_addr();

    std::thread::spawn(move || {
        let page = r#"<html><head><title>Demo</title></head>
<body><div><h1>Demo page</h1><p>Some content worth commenting on.</p>
<button>Save</button></div></body></html>"#;
        loop {
            let Ok(mut request) = server.recv() else { break };
            if request.url().starts_with("/feedback") {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                println!("endpoint received: {}", body);
                let _ = request.respond(tiny_http::Response::from_string("ok"));
            } else {
                let _ = request.respond(tiny_http::Response::from_string(page));
            }
        }
    });

    let options = WidgetOptions {
        endpoint: format!("http://{}/feedback", addr),
        ..Default::default()
    };

    let mut widget = widget_for_url(&format!("http://{}/", addr), options)?;
    widget.open();
    widget.open_drawer();

    widget.set_mode(HelperKind::Highlight);
    widget.draw_start(50.0, 50.0);
    widget.draw_move(150.0, 120.0);
    println!("highlight committed: {:?}", widget.draw_stop());

    widget.set_mode(HelperKind::Blackout);
    widget.draw_start(200.0, 200.0);
    widget.draw_move(260.0, 260.0);
    println!("blackout committed: {:?}", widget.draw_stop());

    widget.close_drawer();
    widget.set_description("The save button does nothing");
    widget.submit()?;

    let status = widget.wait_submission(Duration::from_secs(10));
    println!("submission: {:?}", status);

    Ok(())
}
