use crate::foundation::error::{SweepError, SweepResult};

/// Frame rate as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Frames.
    pub num: u32,
    /// Seconds; must be > 0.
    pub den: u32,
}

impl Fps {
    /// Checked constructor; both parts must be positive.
    pub fn new(num: u32, den: u32) -> SweepResult<Self> {
        if den == 0 {
            return Err(SweepError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SweepError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole frames per second.
    pub fn integer(num: u32) -> SweepResult<Self> {
        Self::new(num, 1)
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// `num/den` form accepted by ffmpeg rate options.
    pub fn to_ffmpeg_rate(self) -> String {
        if self.den == 1 {
            self.num.to_string()
        } else {
            format!("{}/{}", self.num, self.den)
        }
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 24, den: 1 }
    }
}

/// Output frame size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Pixels.
    pub width: u32,
    /// Pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas grown to the next even width/height (yuv420p needs even dimensions).
    pub fn even(self) -> Self {
        Self {
            width: self.width + self.width % 2,
            height: self.height + self.height % 2,
        }
    }
}

/// Axis-aligned pixel rectangle, top-left origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Pixels.
    pub width: u32,
    /// Pixels.
    pub height: u32,
}

impl PixelRect {
    /// Horizontal midpoint.
    pub fn center_x(self) -> u32 {
        self.x + self.width / 2
    }

    /// Vertical midpoint.
    pub fn center_y(self) -> u32 {
        self.y + self.height / 2
    }

    /// One past the last column.
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    /// One past the last row.
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    /// `true` when the two rectangles share at least one pixel.
    pub fn overlaps(self, other: PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
