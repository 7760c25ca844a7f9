//! Async-friendly widget facade backed by a dedicated worker thread.
//!
//! The worker thread owns a synchronous [`FeedbackWidget`] and executes
//! commands sent from async tasks, so embedders can drive the widget from
//! an async context without the widget types being shared across threads.

use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::helpers::HelperKind;
use crate::page::Page;
use crate::rendering::paint::DrawSurface;
use crate::submit::SubmitStatus;
use crate::widget::{Cursor, FeedbackWidget, View};

enum Command {
    Open(oneshot::Sender<()>),
    OpenDrawer(oneshot::Sender<()>),
    CloseDrawer(oneshot::Sender<()>),
    SetMode(HelperKind, oneshot::Sender<()>),
    DrawRect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        reply: oneshot::Sender<Option<u64>>,
    },
    Hover(f64, f64, oneshot::Sender<Cursor>),
    AcceptCandidate(oneshot::Sender<Option<u64>>),
    RemoveHelper(u64, oneshot::Sender<bool>),
    HelperCount(oneshot::Sender<usize>),
    SetDescription(String, oneshot::Sender<()>),
    Submit(oneshot::Sender<Result<()>>),
    WaitSubmission(u64, oneshot::Sender<SubmitStatus>),
    Key(String, oneshot::Sender<()>),
    View(oneshot::Sender<View>),
    Close(oneshot::Sender<()>),
}

/// A cloneable async handle to a widget running on its own worker thread.
#[derive(Clone)]
pub struct WidgetHandle {
    cmd_tx: Sender<Command>,
}

impl WidgetHandle {
    /// Spawn a worker thread that builds the widget and serves commands.
    /// Construction happens on the worker so the widget types never cross
    /// threads and blocking HTTP clients are never created inside an async
    /// runtime.
    pub async fn spawn<P, S, F>(factory: F) -> Result<Self>
    where
        P: Page + Send + 'static,
        S: DrawSurface + Send + 'static,
        F: FnOnce() -> Result<FeedbackWidget<P, S>> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // Build the widget on the worker thread
            let mut widget = match factory() {
                Ok(w) => w,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                widget.pump();
                match cmd {
                    Command::Open(resp) => {
                        widget.open();
                        let _ = resp.send(());
                    }
                    Command::OpenDrawer(resp) => {
                        widget.open_drawer();
                        let _ = resp.send(());
                    }
                    Command::CloseDrawer(resp) => {
                        widget.close_drawer();
                        let _ = resp.send(());
                    }
                    Command::SetMode(kind, resp) => {
                        widget.set_mode(kind);
                        let _ = resp.send(());
                    }
                    Command::DrawRect { x0, y0, x1, y1, reply } => {
                        widget.draw_start(x0, y0);
                        widget.draw_move(x1, y1);
                        let _ = reply.send(widget.draw_stop());
                    }
                    Command::Hover(x, y, resp) => {
                        widget.pointer_hover(x, y);
                        let _ = resp.send(widget.cursor());
                    }
                    Command::AcceptCandidate(resp) => {
                        let _ = resp.send(widget.accept_candidate());
                    }
                    Command::RemoveHelper(index, resp) => {
                        let _ = resp.send(widget.remove_helper(index));
                    }
                    Command::HelperCount(resp) => {
                        let _ = resp.send(widget.helpers().len());
                    }
                    Command::SetDescription(text, resp) => {
                        widget.set_description(&text);
                        let _ = resp.send(());
                    }
                    Command::Submit(resp) => {
                        let _ = resp.send(widget.submit());
                    }
                    Command::WaitSubmission(timeout_ms, resp) => {
                        let status = widget.wait_submission(Duration::from_millis(timeout_ms));
                        let _ = resp.send(status);
                    }
                    Command::Key(key, resp) => {
                        widget.key_down(&key);
                        let _ = resp.send(());
                    }
                    Command::View(resp) => {
                        let _ = resp.send(widget.view());
                    }
                    Command::Close(resp) => {
                        widget.close();
                        let _ = resp.send(());
                        break;
                    }
                }
            }
        });

        // Wait for the worker to report construction success or failure
        let init_res = init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    async fn roundtrip<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
        what: &str,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .map_err(|_| Error::Other(format!("{} failed: widget worker is gone", what)))?;
        rx.await
            .map_err(|e| Error::Other(format!("{} canceled: {}", what, e)))
    }

    pub async fn open(&self) -> Result<()> {
        self.roundtrip(Command::Open, "Open").await
    }

    pub async fn open_drawer(&self) -> Result<()> {
        self.roundtrip(Command::OpenDrawer, "OpenDrawer").await
    }

    pub async fn close_drawer(&self) -> Result<()> {
        self.roundtrip(Command::CloseDrawer, "CloseDrawer").await
    }

    pub async fn set_mode(&self, kind: HelperKind) -> Result<()> {
        self.roundtrip(|tx| Command::SetMode(kind, tx), "SetMode").await
    }

    /// Draw one rectangle as a full pointer gesture; returns the committed
    /// helper index, or `None` for a discarded gesture.
    pub async fn draw_rect(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Option<u64>> {
        self.roundtrip(|reply| Command::DrawRect { x0, y0, x1, y1, reply }, "DrawRect")
            .await
    }

    pub async fn hover(&self, x: f64, y: f64) -> Result<Cursor> {
        self.roundtrip(|tx| Command::Hover(x, y, tx), "Hover").await
    }

    pub async fn accept_candidate(&self) -> Result<Option<u64>> {
        self.roundtrip(Command::AcceptCandidate, "AcceptCandidate").await
    }

    pub async fn remove_helper(&self, index: u64) -> Result<bool> {
        self.roundtrip(|tx| Command::RemoveHelper(index, tx), "RemoveHelper").await
    }

    pub async fn helper_count(&self) -> Result<usize> {
        self.roundtrip(Command::HelperCount, "HelperCount").await
    }

    pub async fn set_description(&self, text: &str) -> Result<()> {
        let text = text.to_string();
        self.roundtrip(|tx| Command::SetDescription(text, tx), "SetDescription")
            .await
    }

    /// Start the submission (Idle -> Sending).
    pub async fn submit(&self) -> Result<()> {
        self.roundtrip(Command::Submit, "Submit").await?
    }

    /// Block the worker until the in-flight submission resolves.
    pub async fn wait_submission(&self, timeout_ms: u64) -> Result<SubmitStatus> {
        self.roundtrip(|tx| Command::WaitSubmission(timeout_ms, tx), "WaitSubmission")
            .await
    }

    pub async fn key(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.roundtrip(|tx| Command::Key(key, tx), "Key").await
    }

    pub async fn view(&self) -> Result<View> {
        self.roundtrip(Command::View, "View").await
    }

    /// Close the widget and shut the worker down. Further commands on any
    /// clone of this handle fail with an error instead of panicking.
    pub async fn close(&self) -> Result<()> {
        self.roundtrip(Command::Close, "Close").await
    }
}
