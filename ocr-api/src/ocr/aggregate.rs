use serde::Serialize;

use super::engine::{LineResult, Quad};

/// Successful `/ocr` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrResponse {
    pub success: bool,
    pub text: String,
    pub language: String,
    pub confidence: f64,
    pub lines_count: usize,
    pub words_count: usize,
    pub details: Vec<LineDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineDetail {
    pub text: String,
    pub confidence: f64,
    pub bbox: Quad,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds the response for one request from the engine's lines, keeping their
/// order. Confidences are percentages rounded to two decimals.
pub fn aggregate(lines: Vec<LineResult>, language: &str) -> OcrResponse {
    let lines_count = lines.len();
    let confidence = if lines.is_empty() {
        0.0
    } else {
        let total: f64 = lines.iter().map(|line| line.confidence).sum();
        round2((total / lines_count as f64).clamp(0.0, 100.0))
    };

    let text = lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let words_count = text.split_whitespace().count();

    let details = lines
        .into_iter()
        .map(|line| LineDetail {
            text: line.text,
            confidence: round2(line.confidence),
            bbox: line.bbox,
        })
        .collect();

    OcrResponse {
        success: true,
        text,
        language: language.to_string(),
        confidence,
        lines_count,
        words_count,
        details,
    }
}
