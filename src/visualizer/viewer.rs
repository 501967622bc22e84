// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Window for displaying a rendered figure.

use image::RgbImage;
use minifb::{Key, Window, WindowOptions};

use crate::error::{OverlayError, Result};

/// A simple image viewer using minifb.
pub struct Viewer {
    window: Window,
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl Viewer {
    /// Create a viewer window sized to `figure` and load its pixels.
    pub fn new(title: &str, figure: &RgbImage) -> Result<Self> {
        let (width, height) = (figure.width() as usize, figure.height() as usize);
        if width == 0 || height == 0 {
            return Err(OverlayError::VisualizerError(
                "Cannot display an empty figure".to_string(),
            ));
        }

        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| OverlayError::VisualizerError(format!("Failed to create window: {e}")))?;

        // Limit update rate
        window.set_target_fps(60);

        // Pack as 0x00RRGGBB
        let buffer = figure
            .pixels()
            .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]))
            .collect();

        Ok(Self {
            window,
            width,
            height,
            buffer,
        })
    }

    /// Block until the window is closed or Escape/Q is pressed.
    pub fn show(&mut self) -> Result<()> {
        while self.window.is_open()
            && !self.window.is_key_down(Key::Escape)
            && !self.window.is_key_down(Key::Q)
        {
            self.window
                .update_with_buffer(&self.buffer, self.width, self.height)
                .map_err(|e| {
                    OverlayError::VisualizerError(format!("Failed to update window: {e}"))
                })?;
        }
        Ok(())
    }
}
