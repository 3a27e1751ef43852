use std::sync::Arc;

use serde::Serialize;

use super::decoder::CanonicalImage;
use super::language::ModelKey;

/// A point in image pixel coordinates, serialized as `[x, y]`.
pub type Point = [i32; 2];

/// Four corners of a text region, clockwise from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quad {
    /// Axis-aligned quadrilateral for a `left, top, width, height` box.
    pub fn from_rect(left: i32, top: i32, width: i32, height: i32) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self {
            top_left: [left, top],
            top_right: [right, top],
            bottom_right: [right, bottom],
            bottom_left: [left, bottom],
        }
    }
}

/// Scale an engine reports its confidences on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceScale {
    /// 0.0 to 1.0
    Unit,
    /// 0.0 to 100.0
    Percent,
}

impl ConfidenceScale {
    /// Converts to a percentage clamped to `[0, 100]`. NaN maps to 0.
    pub fn to_percent(self, raw: f64) -> f64 {
        let pct = match self {
            ConfidenceScale::Unit => raw * 100.0,
            ConfidenceScale::Percent => raw,
        };
        if pct.is_nan() {
            0.0
        } else {
            pct.clamp(0.0, 100.0)
        }
    }
}

/// One region as produced by an engine, before confidence normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    pub text: String,
    pub confidence: f64,
    pub bbox: Quad,
}

/// One recognized line. `confidence` is always a percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct LineResult {
    pub text: String,
    pub confidence: f64,
    pub bbox: Quad,
}

/// Construction options for a recognition model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub model: ModelKey,
    pub data_path: Option<String>,
    /// Locate text regions before recognition. When off the whole image is
    /// read as a single line.
    pub detection: bool,
    /// Produce text for each region. When off only geometry is returned.
    pub recognition: bool,
    /// Detect and correct rotated text.
    pub angle_classification: bool,
    pub use_gpu: bool,
}

/// An initialized, language-specific recognition model.
///
/// Calls block and may take seconds; callers run them on the blocking pool.
pub trait RecognitionEngine: Send + Sync {
    fn confidence_scale(&self) -> ConfidenceScale;

    /// Regions in reading order. An image without text yields an empty vec.
    fn recognize(&self, image: &CanonicalImage) -> Result<Vec<RawLine>, String>;
}

/// Builds engines on first use of a model. Construction is expensive and
/// blocking.
pub trait EngineFactory: Send + Sync {
    /// Short engine name reported by the health endpoint.
    fn name(&self) -> &'static str;

    fn create(&self, options: &EngineOptions) -> Result<Arc<dyn RecognitionEngine>, String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_from_rect_is_clockwise() {
        let quad = Quad::from_rect(10, 20, 30, 5);
        assert_eq!(quad.top_left, [10, 20]);
        assert_eq!(quad.top_right, [40, 20]);
        assert_eq!(quad.bottom_right, [40, 25]);
        assert_eq!(quad.bottom_left, [10, 25]);
    }

    #[test]
    fn test_confidence_scale_normalization() {
        assert_eq!(ConfidenceScale::Unit.to_percent(0.25), 25.0);
        assert_eq!(ConfidenceScale::Percent.to_percent(93.5), 93.5);
        assert_eq!(ConfidenceScale::Percent.to_percent(140.0), 100.0);
        assert_eq!(ConfidenceScale::Unit.to_percent(-0.2), 0.0);
        assert_eq!(ConfidenceScale::Percent.to_percent(f64::NAN), 0.0);
    }

    #[test]
    fn test_quad_serializes_as_point_pairs() {
        let json = serde_json::to_value(Quad::from_rect(0, 0, 4, 2)).unwrap();
        assert_eq!(json["top_left"], serde_json::json!([0, 0]));
        assert_eq!(json["bottom_right"], serde_json::json!([4, 2]));
    }
}
