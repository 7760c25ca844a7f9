//! Compose an annotation mask and write it to mask.png.

use fbwidget::geometry::Area;
use fbwidget::helpers::{HelperKind, HelperStore};
use fbwidget::rendering::mask::MaskPainter;
use fbwidget::rendering::raster::RasterSurface;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let painter = MaskPainter::new(0.5, 4.0, 6.0);
    let mut store = HelperStore::new();

    let mut highlight = Area::anchored(80.0, 60.0);
    highlight.resize_to(420.0, 220.0);
    let _ = store.commit(&highlight, HelperKind::Highlight, 6.0);

    let mut blackout = Area::anchored(500.0, 300.0);
    blackout.resize_to(700.0, 420.0);
    let _ = store.commit(&blackout, HelperKind::Blackout, 6.0);

    let mut surface = RasterSurface::new(800, 480);
    painter.repaint(&mut surface, &store, None, true);

    std::fs::write("mask.png", surface.png_bytes()?)?;
    println!("wrote mask.png ({} helpers)", store.len());
    Ok(())
}
