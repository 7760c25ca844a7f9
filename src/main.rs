//! Headless CLI for the feedback widget: load a page, annotate it with
//! rectangles, optionally submit, and report the outcome as JSON.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use fbwidget::{widget_for_html, widget_for_url, HelperKind, SubmitStatus, WidgetOptions};

#[derive(Parser, Debug)]
#[command(
    name = "fbwidget",
    version,
    about = "Drive the feedback widget headlessly over a page"
)]
struct Cli {
    /// Page to annotate: an http(s) URL or a local HTML file
    page: String,

    /// Highlight rectangle "X,Y,W,H" in page pixels (repeatable)
    #[arg(long = "highlight", value_name = "X,Y,W,H")]
    highlights: Vec<String>,

    /// Blackout rectangle "X,Y,W,H" in page pixels (repeatable)
    #[arg(long = "blackout", value_name = "X,Y,W,H")]
    blackouts: Vec<String>,

    /// Feedback description text
    #[arg(long, default_value = "")]
    description: String,

    /// Submission endpoint; nothing is sent when omitted
    #[arg(long)]
    endpoint: Option<String>,

    /// Skip the screenshot capture pass
    #[arg(long)]
    no_screenshot: bool,

    /// Write the composed annotation mask to this PNG file
    #[arg(long, value_name = "PATH")]
    mask_out: Option<PathBuf>,

    /// Submission wait limit in seconds
    #[arg(long, default_value_t = 30)]
    wait: u64,
}

fn parse_rect(raw: &str) -> anyhow::Result<(f64, f64, f64, f64)> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("invalid rectangle '{}', expected X,Y,W,H", raw))?;
    if parts.len() != 4 {
        bail!("invalid rectangle '{}', expected X,Y,W,H", raw);
    }
    Ok((parts[0], parts[1], parts[2], parts[3]))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = WidgetOptions {
        endpoint: cli.endpoint.clone().unwrap_or_default(),
        ..Default::default()
    };

    let mut widget = if cli.page.starts_with("http://") || cli.page.starts_with("https://") {
        widget_for_url(&cli.page, options)?
    } else {
        let html = std::fs::read_to_string(&cli.page)
            .with_context(|| format!("failed to read {}", cli.page))?;
        widget_for_html(&html, None, options)?
    };

    if cli.no_screenshot && widget.state().include_screenshot {
        widget.toggle_screenshot();
    }
    widget.open();
    widget.open_drawer();

    let mut committed = 0usize;
    let mut discarded = 0usize;
    for (raw_rects, kind) in [
        (&cli.highlights, HelperKind::Highlight),
        (&cli.blackouts, HelperKind::Blackout),
    ] {
        widget.set_mode(kind);
        for raw in raw_rects {
            let (x, y, w, h) = parse_rect(raw)?;
            widget.draw_start(x, y);
            widget.draw_move(x + w, y + h);
            match widget.draw_stop() {
                Some(_) => committed += 1,
                None => discarded += 1,
            }
        }
    }

    widget.close_drawer();
    widget.set_description(&cli.description);

    let submission = if cli.endpoint.is_some() {
        widget.submit()?;
        let status = widget.wait_submission(Duration::from_secs(cli.wait));
        if status == SubmitStatus::Error {
            if let Some(err) = widget.submit_error() {
                eprintln!("submission failed: {}", err);
            }
        }
        format!("{:?}", status).to_lowercase()
    } else {
        "skipped".to_string()
    };

    if let Some(path) = &cli.mask_out {
        let png = widget.surface().png_bytes()?;
        std::fs::write(path, png).with_context(|| format!("failed to write {}", path.display()))?;
    }

    let report = serde_json::json!({
        "page": cli.page,
        "helpers": committed,
        "discarded": discarded,
        "screenshot": widget.screenshot().is_some(),
        "submission": submission,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
