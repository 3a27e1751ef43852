use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use image::ImageFormat;
use leptess::{LepTess, Variable};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::decoder::CanonicalImage;
use super::engine::{
    ConfidenceScale, EngineFactory, EngineOptions, Quad, RawLine, RecognitionEngine,
};

/// Tesseract page segmentation modes used by the engine options.
const PSM_AUTO_OSD: &str = "1";
const PSM_AUTO: &str = "3";
const PSM_SINGLE_LINE: &str = "7";

/// Builds one Tesseract instance per traineddata model.
#[derive(Debug, Clone, Copy, Default)]
pub struct TesseractFactory;

fn page_segmentation_mode(options: &EngineOptions) -> &'static str {
    if !options.detection {
        PSM_SINGLE_LINE
    } else if options.angle_classification {
        PSM_AUTO_OSD
    } else {
        PSM_AUTO
    }
}

impl EngineFactory for TesseractFactory {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn create(&self, options: &EngineOptions) -> Result<Arc<dyn RecognitionEngine>, String> {
        if options.use_gpu {
            warn!(model = %options.model, "Tesseract has no GPU backend, running on CPU");
        }

        let mut lt = LepTess::new(options.data_path.as_deref(), options.model.as_str())
            .map_err(|e| format!("Tesseract not available for '{}': {e}", options.model))?;

        let psm = page_segmentation_mode(options);
        lt.set_variable(Variable::TesseditPagesegMode, psm)
            .map_err(|e| format!("Failed to set page segmentation mode: {e:?}"))?;

        info!(model = %options.model, psm, "Tesseract OCR initialized");

        Ok(Arc::new(TesseractEngine {
            tesseract: Mutex::new(lt),
            recognition: options.recognition,
        }))
    }
}

/// A Tesseract handle is not reentrant; calls are serialized per instance.
pub struct TesseractEngine {
    tesseract: Mutex<LepTess>,
    recognition: bool,
}

impl RecognitionEngine for TesseractEngine {
    fn confidence_scale(&self) -> ConfidenceScale {
        ConfidenceScale::Percent
    }

    fn recognize(&self, image: &CanonicalImage) -> Result<Vec<RawLine>, String> {
        let mut encoded = Vec::new();
        image
            .pixels()
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|e| format!("Failed to encode image: {e}"))?;

        let tsv = {
            let mut lt = self.tesseract.blocking_lock();
            lt.set_image_from_mem(&encoded)
                .map_err(|e| format!("Failed to set image: {e}"))?;
            lt.get_tsv_text(0)
                .map_err(|e| format!("Failed to extract text: {e}"))?
        };

        let mut lines = parse_tsv_lines(&tsv);
        if !self.recognition {
            for line in &mut lines {
                line.text.clear();
                line.confidence = 0.0;
            }
        }
        Ok(lines)
    }
}

struct Word<'a> {
    text: &'a str,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    conf: f64,
}

/// Groups Tesseract TSV word rows into lines.
///
/// Rows are keyed by `(page, block, paragraph, line)`, which is Tesseract's
/// reading order. Rows that are not words (level 5), carry a negative
/// confidence, or have empty text are skipped.
pub(crate) fn parse_tsv_lines(tsv: &str) -> Vec<RawLine> {
    let mut grouped: BTreeMap<(i32, i32, i32, i32), Vec<Word<'_>>> = BTreeMap::new();

    for row in tsv.lines() {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let Ok(level) = cols[0].parse::<i32>() else {
            // header row
            continue;
        };
        if level != 5 {
            continue;
        }

        let num = |idx: usize| cols[idx].trim().parse::<i32>().unwrap_or(0);
        let conf: f64 = cols[10].trim().parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let (left, top) = (num(6), num(7));
        grouped
            .entry((num(1), num(2), num(3), num(4)))
            .or_default()
            .push(Word {
                text,
                left,
                top,
                right: left + num(8),
                bottom: top + num(9),
                conf,
            });
    }

    grouped
        .into_values()
        .map(|words| {
            let text = words.iter().map(|w| w.text).collect::<Vec<_>>().join(" ");
            let conf = words.iter().map(|w| w.conf).sum::<f64>() / words.len() as f64;
            let left = words.iter().map(|w| w.left).min().unwrap_or(0);
            let top = words.iter().map(|w| w.top).min().unwrap_or(0);
            let right = words.iter().map(|w| w.right).max().unwrap_or(left);
            let bottom = words.iter().map(|w| w.bottom).max().unwrap_or(top);

            RawLine {
                text,
                confidence: conf,
                bbox: Quad::from_rect(left, top, right - left, bottom - top),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::language::ModelKey;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    fn options(detection: bool, angle: bool) -> EngineOptions {
        EngineOptions {
            model: ModelKey::new("eng"),
            data_path: None,
            detection,
            recognition: true,
            angle_classification: angle,
            use_gpu: false,
        }
    }

    #[test]
    fn test_parse_groups_words_into_lines() {
        let input = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t400\t200\t-1\t",
            "4\t1\t1\t1\t1\t0\t10\t10\t180\t30\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t12\t80\t28\t96.5\tBonjour",
            "5\t1\t1\t1\t1\t2\t100\t10\t90\t30\t91.5\tmonde",
            "5\t1\t1\t1\t2\t1\t12\t60\t50\t25\t88\tSalut",
        ]);

        let lines = parse_tsv_lines(&input);
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0].text, "Bonjour monde");
        assert_eq!(lines[0].confidence, 94.0);
        assert_eq!(lines[0].bbox, Quad::from_rect(10, 10, 180, 30));

        assert_eq!(lines[1].text, "Salut");
        assert_eq!(lines[1].bbox.bottom_right, [62, 85]);
    }

    #[test]
    fn test_parse_keeps_reading_order_across_blocks() {
        let input = tsv(&[
            "5\t1\t2\t1\t1\t1\t10\t200\t40\t20\t90\tsecond",
            "5\t1\t1\t1\t1\t1\t10\t10\t40\t20\t90\tfirst",
            "5\t1\t10\t1\t1\t1\t10\t400\t40\t20\t90\tthird",
        ]);

        let texts: Vec<String> = parse_tsv_lines(&input)
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_parse_skips_blank_and_unscored_words() {
        let input = tsv(&[
            "5\t1\t1\t1\t1\t1\t10\t12\t80\t28\t-1\tghost",
            "5\t1\t1\t1\t1\t2\t10\t12\t80\t28\t95\t ",
            "garbage row",
        ]);
        assert!(parse_tsv_lines(&input).is_empty());
        assert!(parse_tsv_lines("").is_empty());
    }

    #[test]
    fn test_page_segmentation_mode() {
        assert_eq!(page_segmentation_mode(&options(false, true)), PSM_SINGLE_LINE);
        assert_eq!(page_segmentation_mode(&options(true, true)), PSM_AUTO_OSD);
        assert_eq!(page_segmentation_mode(&options(true, false)), PSM_AUTO);
    }

    #[test]
    fn test_missing_traineddata_is_an_error() {
        let mut opts = options(true, false);
        opts.data_path = Some("/nonexistent/tessdata".to_string());
        let result = TesseractFactory.create(&opts);
        assert!(result.is_err());
    }
}
