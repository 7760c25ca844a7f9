//! The worker-thread-backed async handle.

use fbwidget::capture::{Capture, CaptureOptions};
use fbwidget::geometry::Rect;
use fbwidget::page::{ElementHit, Page, PageLocation, PageMetrics};
use fbwidget::rendering::paint::Recorder;
use fbwidget::rendering::Screenshot;
use fbwidget::widget::Cursor;
use fbwidget::{FeedbackWidget, HelperKind, View, WidgetHandle, WidgetOptions};

struct FakePage;

impl Page for FakePage {
    fn metrics(&self) -> PageMetrics {
        PageMetrics {
            scroll_width: 800.0,
            scroll_height: 800.0,
            client_width: 800.0,
            client_height: 600.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    fn location(&self) -> PageLocation {
        PageLocation::default()
    }

    fn hit_stack(&self, x: f64, y: f64) -> Vec<ElementHit> {
        let label = Rect::new(10.0, 10.0, 80.0, 20.0);
        if label.contains(x, y) {
            vec![ElementHit { tag: "label".into(), rect: label }]
        } else {
            Vec::new()
        }
    }
}

struct NoopCapture;

impl Capture for NoopCapture {
    fn capture(
        &self,
        _page: &dyn Page,
        _overlay: Option<&(u32, u32, Vec<u8>)>,
        options: &CaptureOptions,
    ) -> fbwidget::Result<Screenshot> {
        Ok(Screenshot { width: options.width, height: options.height, png_data: vec![1] })
    }
}

async fn handle() -> WidgetHandle {
    WidgetHandle::spawn(|| {
        FeedbackWidget::new(
            FakePage,
            Recorder::new(0, 0),
            Box::new(NoopCapture),
            WidgetOptions::default(),
        )
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn full_flow_through_the_handle() {
    let widget = handle().await;
    widget.open().await.unwrap();
    widget.open_drawer().await.unwrap();
    assert_eq!(widget.view().await.unwrap(), View::Drawing);

    widget.set_mode(HelperKind::Highlight).await.unwrap();
    let idx = widget.draw_rect(50.0, 50.0, 150.0, 120.0).await.unwrap();
    assert!(idx.is_some());
    assert_eq!(widget.helper_count().await.unwrap(), 1);

    // Sub-threshold gestures are discarded through the handle too.
    assert!(widget.draw_rect(0.0, 0.0, 3.0, 3.0).await.unwrap().is_none());

    assert_eq!(widget.hover(20.0, 20.0).await.unwrap(), Cursor::Pointer);
    let snapped = widget.accept_candidate().await.unwrap().unwrap();
    assert!(widget.remove_helper(snapped).await.unwrap());
    assert_eq!(widget.helper_count().await.unwrap(), 1);

    widget.close_drawer().await.unwrap();
    widget.set_description("handle flow").await.unwrap();
    assert_eq!(widget.view().await.unwrap(), View::Form);
}

#[tokio::test(flavor = "multi_thread")]
async fn escape_closes_through_the_handle() {
    let widget = handle().await;
    widget.open().await.unwrap();
    widget.open_drawer().await.unwrap();
    widget.key("Escape").await.unwrap();
    assert_eq!(widget.view().await.unwrap(), View::Form);
    assert_eq!(widget.helper_count().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn commands_after_close_fail_gracefully() {
    let widget = handle().await;
    widget.open().await.unwrap();
    widget.close().await.unwrap();

    // The worker is gone; a clone observes an error, not a panic.
    let err = widget.view().await;
    assert!(err.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn handles_are_cloneable() {
    let widget = handle().await;
    let other = widget.clone();
    widget.open().await.unwrap();
    assert_eq!(other.view().await.unwrap(), View::Form);
}
