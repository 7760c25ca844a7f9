//! Rendering module: paint commands, surfaces, and the mask repaint pipeline.

pub mod mask;
pub mod paint;
pub mod raster;

use crate::error::{Error, Result};

/// A captured page frame as encoded PNG bytes.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    pub fn empty(width: u32, height: u32) -> Self {
        Self { width, height, png_data: Vec::new() }
    }

    /// Embeddable data-URL form, as carried in the submission payload.
    pub fn to_data_url(&self) -> Result<String> {
        use base64::Engine as _;
        if self.png_data.is_empty() {
            return Err(Error::RenderError("screenshot has no pixel data".into()));
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.png_data);
        Ok(format!("data:image/png;base64,{}", encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_screenshot_has_no_data_url() {
        let s = Screenshot::empty(64, 32);
        assert_eq!(s.width, 64);
        assert!(s.to_data_url().is_err());
    }

    #[test]
    fn data_url_is_png_prefixed() {
        let s = Screenshot { width: 1, height: 1, png_data: vec![0x89, 0x50, 0x4e, 0x47] };
        let url = s.to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
