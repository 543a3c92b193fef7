use std::collections::BTreeMap;

use serde_json::{Value, json};

use super::value::{
    BBOX_KEYS, CONTENT_KEYS, LABEL_KEYS, field, pages, stringify, to_serializable,
};

fn blocks(page: &Value) -> &[Value] {
    page.get("parsing_res_list")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn layout_boxes(page: &Value) -> &[Value] {
    page.get("layout_det_res")
        .and_then(|res| res.get("boxes"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Normalize vision-language output into `{text, layout, elements_count, pages}`.
///
/// Every labelled block becomes a layout element. Pages without parsed
/// blocks fall back to their raw layout detection boxes, which carry
/// position and score but no content.
pub fn format_vl_json(raw: Value) -> Value {
    let pages = pages(raw);
    if pages.is_empty() {
        return json!({"text": "", "layout": [], "elements_count": {}, "pages": 0});
    }

    let mut layout = Vec::new();
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut text = Vec::new();

    for page in &pages {
        let page_index = page.get("page_index").filter(|v| !v.is_null());
        let blocks = blocks(page);

        for block in blocks {
            let Some(label) = field(block, LABEL_KEYS).map(stringify) else {
                continue;
            };
            let content = field(block, CONTENT_KEYS)
                .map(stringify)
                .unwrap_or_default();
            let bbox = field(block, BBOX_KEYS)
                .map(to_serializable)
                .unwrap_or(Value::Null);

            let mut element = json!({"type": label, "content": content, "bbox": bbox});
            if let Some(index) = page_index {
                element["page"] = index.clone();
            }

            *counts.entry(label).or_default() += 1;
            if !content.is_empty() {
                text.push(content);
            }
            layout.push(element);
        }

        if blocks.is_empty() {
            for bx in layout_boxes(page) {
                let label = bx.get("label").map(stringify).unwrap_or_default();
                let bbox = bx
                    .get("coordinate")
                    .map(to_serializable)
                    .unwrap_or(Value::Null);
                let score = bx.get("score").map(to_serializable).unwrap_or(json!(0.0));

                let mut element = json!({
                    "type": label,
                    "content": "",
                    "bbox": bbox,
                    "score": score,
                });
                if let Some(index) = page_index {
                    element["page"] = index.clone();
                }

                *counts.entry(label).or_default() += 1;
                layout.push(element);
            }
        }
    }

    json!({
        "text": text.join("\n"),
        "layout": layout,
        "elements_count": counts,
        "pages": pages.len(),
    })
}

/// Render vision-language output as Markdown.
///
/// Title-like labels become `#` headings and heading-like labels `##`.
/// Multi-page documents get a rule and a page heading before each page.
pub fn format_vl_markdown(raw: Value) -> Value {
    let pages = pages(raw);
    if pages.is_empty() {
        return json!({"markdown": "", "elements_count": {}, "pages": 0});
    }

    let multi_page = pages.len() > 1;
    let mut sections = Vec::new();
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for (idx, page) in pages.iter().enumerate() {
        let page_index = page
            .get("page_index")
            .and_then(Value::as_u64)
            .unwrap_or(idx as u64);

        let mut parts = Vec::new();
        for block in blocks(page) {
            let Some(label) = field(block, LABEL_KEYS).map(stringify) else {
                continue;
            };
            let content = field(block, CONTENT_KEYS)
                .map(stringify)
                .unwrap_or_default();

            let lowered = label.to_lowercase();
            *counts.entry(label).or_default() += 1;

            if content.is_empty() {
                continue;
            }
            if lowered.contains("title") {
                parts.push(format!("# {}", content));
            } else if lowered.contains("heading") {
                parts.push(format!("## {}", content));
            } else {
                parts.push(content);
            }
        }

        if parts.is_empty() {
            continue;
        }
        let body = parts.join("\n\n");
        if multi_page {
            let number = page_index.saturating_add(1);
            sections.push(format!("\n---\n## Page {}\n\n{}", number, body));
        } else {
            sections.push(body);
        }
    }

    json!({
        "markdown": sections.join("\n"),
        "elements_count": counts,
        "pages": pages.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_page_document() -> Value {
        json!([
            {
                "page_index": 0,
                "parsing_res_list": [
                    {"block_label": "doc_title", "block_content": "Annual Report", "block_bbox": [0, 0, 100, 20]},
                    {"block_label": "text", "block_content": "Revenue grew.", "block_bbox": [0, 30, 100, 60]},
                    {"block_label": "image", "block_content": "", "block_bbox": [0, 70, 100, 90]}
                ]
            },
            {
                "page_index": 1,
                "parsing_res_list": [],
                "layout_det_res": {"boxes": [
                    {"label": "table", "coordinate": [1.5, 2.5, 3.5, 4.5], "score": 0.91}
                ]}
            }
        ])
    }

    #[test]
    fn test_json_collects_blocks_and_fallback_boxes() {
        let result = format_vl_json(two_page_document());

        assert_eq!(result["pages"], 2);
        assert_eq!(result["text"], "Annual Report\nRevenue grew.");
        assert_eq!(
            result["elements_count"],
            json!({"doc_title": 1, "image": 1, "table": 1, "text": 1})
        );

        let layout = result["layout"].as_array().unwrap();
        assert_eq!(layout.len(), 4);
        assert_eq!(layout[0]["type"], "doc_title");
        assert_eq!(layout[0]["page"], 0);
        assert_eq!(layout[3]["content"], "");
        assert_eq!(layout[3]["score"], 0.91);
        assert_eq!(layout[3]["page"], 1);
    }

    #[test]
    fn test_json_without_page_index_omits_page() {
        let raw = json!({"parsing_res_list": [{"label": "text", "content": "hi"}]});
        let result = format_vl_json(raw);

        assert_eq!(result["pages"], 1);
        assert!(result["layout"][0].get("page").is_none());
        assert_eq!(result["layout"][0]["bbox"], Value::Null);
    }

    #[test]
    fn test_json_empty() {
        assert_eq!(
            format_vl_json(json!([])),
            json!({"text": "", "layout": [], "elements_count": {}, "pages": 0})
        );
    }

    #[test]
    fn test_markdown_single_page() {
        let raw = json!([{
            "parsing_res_list": [
                {"label": "paragraph_title", "content": "Intro"},
                {"label": "Section_Heading", "content": "Scope"},
                {"label": "text", "content": "Body"},
                {"label": "figure", "content": ""}
            ]
        }]);

        let result = format_vl_markdown(raw);
        assert_eq!(result["markdown"], "# Intro\n\n## Scope\n\nBody");
        assert_eq!(result["elements_count"]["figure"], 1);
        assert_eq!(result["pages"], 1);
    }

    #[test]
    fn test_markdown_page_index_at_limit() {
        let raw = json!([
            {"page_index": u64::MAX, "parsing_res_list": [{"label": "text", "content": "end"}]},
            {"page_index": 0, "parsing_res_list": [{"label": "text", "content": "start"}]}
        ]);

        let result = format_vl_markdown(raw);
        let markdown = result["markdown"].as_str().unwrap();
        assert!(markdown.contains(&format!("## Page {}\n\nend", u64::MAX)));
        assert!(markdown.contains("## Page 1\n\nstart"));
    }

    #[test]
    fn test_markdown_multi_page_separators() {
        let result = format_vl_markdown(two_page_document());
        assert_eq!(
            result["markdown"],
            "\n---\n## Page 1\n\n# Annual Report\n\nRevenue grew."
        );
        assert_eq!(result["pages"], 2);
    }
}
