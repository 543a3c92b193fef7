use serde_json::{Value, json};

use super::value::{array_at, pages, score, stringify};

fn empty() -> Value {
    json!({"text": "", "regions": [], "detected_lines": 0})
}

/// Normalize text-OCR output into `{text, regions, detected_lines}`.
///
/// Only the first page is read. Region `i` pairs `rec_texts[i]` with
/// `rec_scores[i]` (0.0 when missing), `dt_polys[i]` as `polygon` and
/// `rec_boxes[i]` as `bbox`.
pub fn format_ocr(raw: Value) -> Value {
    let Some(page) = pages(raw).into_iter().next() else {
        return empty();
    };

    let texts = array_at(&page, "rec_texts");
    if texts.is_empty() {
        return empty();
    }

    let scores = array_at(&page, "rec_scores");
    let polygons = array_at(&page, "dt_polys");
    let boxes = array_at(&page, "rec_boxes");

    let mut lines = Vec::with_capacity(texts.len());
    let mut regions = Vec::with_capacity(texts.len());

    for (i, text) in texts.iter().enumerate() {
        let text = stringify(text);
        let mut region = json!({
            "text": text,
            "score": score(scores.get(i)),
        });
        if let Some(polygon) = polygons.get(i) {
            region["polygon"] = polygon.clone();
        }
        if let Some(bbox) = boxes.get(i) {
            region["bbox"] = bbox.clone();
        }

        lines.push(text);
        regions.push(region);
    }

    json!({
        "text": lines.join("\n"),
        "detected_lines": regions.len(),
        "regions": regions,
    })
}
