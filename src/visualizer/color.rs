// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use image::Rgb;

/// Color type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Red color.
    pub const RED: Color = Color(255, 0, 0);
    /// White color.
    pub const WHITE: Color = Color(255, 255, 255);
    /// Black color.
    pub const BLACK: Color = Color(0, 0, 0);

    /// Get a color from the OpenPose palette by index.
    pub fn from_index(index: usize) -> Self {
        let color = OPENPOSE_COLORS[index % OPENPOSE_COLORS.len()];
        Self(color[0], color[1], color[2])
    }

    /// Convert to an `image` pixel.
    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.0, self.1, self.2])
    }
}

/// OpenPose color cycle. The first and last entries are both red.
pub const OPENPOSE_COLORS: [[u8; 3]; 19] = [
    [255, 0, 0],   // #ff0000
    [255, 85, 0],  // #ff5500
    [255, 170, 0], // #ffaa00
    [255, 255, 0], // #ffff00
    [170, 255, 0], // #aaff00
    [85, 255, 0],  // #55ff00
    [0, 255, 0],   // #00ff00
    [0, 255, 85],  // #00ff55
    [0, 255, 170], // #00ffaa
    [0, 255, 255], // #00ffff
    [0, 170, 255], // #00aaff
    [0, 85, 255],  // #0055ff
    [0, 0, 255],   // #0000ff
    [85, 0, 255],  // #5500ff
    [170, 0, 255], // #aa00ff
    [255, 0, 255], // #ff00ff
    [255, 0, 170], // #ff00aa
    [255, 0, 85],  // #ff0055
    [255, 0, 0],   // #ff0000
];

/// Endless iterator over [`OPENPOSE_COLORS`].
///
/// Every drawn primitive takes the next color, so the color of a marker or limb
/// depends on how many primitives were drawn before it.
#[derive(Debug, Clone, Default)]
pub struct ColorCycle {
    next: usize,
}

impl ColorCycle {
    /// Start a new cycle at the first palette entry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for ColorCycle {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        let color = Color::from_index(self.next);
        self.next = (self.next + 1) % OPENPOSE_COLORS.len();
        Some(color)
    }
}
