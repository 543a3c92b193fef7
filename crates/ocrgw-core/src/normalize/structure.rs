use serde_json::{Map, Value, json};

use super::value::{CONTENT_KEYS, LABEL_KEYS, field, pages, stringify, to_serializable};

fn first_page(raw: Value) -> Option<Map<String, Value>> {
    match pages(raw).into_iter().next() {
        Some(Value::Object(page)) => Some(page),
        _ => None,
    }
}

/// Normalize structure output into `{layout, tables, formulas, parsing_res, format}`.
///
/// With `return_html` unset the table entries drop their `html` member.
pub fn format_structure_json(raw: Value, return_html: bool) -> Value {
    let Some(page) = first_page(raw) else {
        return json!({
            "layout": [],
            "tables": [],
            "formulas": [],
            "parsing_res": [],
            "format": "json",
        });
    };

    let layout: Vec<Value> = page
        .get("layout_det_res")
        .and_then(|res| res.get("boxes"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|bx| bx.is_object())
        .map(|bx| {
            json!({
                "label": bx.get("label").map(stringify).unwrap_or_default(),
                "bbox": bx.get("coordinate").map(to_serializable).unwrap_or(json!([])),
                "score": bx.get("score").map(to_serializable).unwrap_or(json!(0.0)),
            })
        })
        .collect();

    let tables: Vec<Value> = page
        .get("table_res_list")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|table| table.is_object())
        .map(|table| {
            let mut entry = Map::new();
            if return_html {
                let html = table.get("pred_html").map(stringify).unwrap_or_default();
                entry.insert("html".to_string(), Value::String(html));
            }
            entry.insert(
                "cell_ocr_res".to_string(),
                table
                    .get("cell_ocr_res")
                    .map(to_serializable)
                    .unwrap_or(json!([])),
            );
            Value::Object(entry)
        })
        .collect();

    let serialized = |key: &str| page.get(key).map(to_serializable).unwrap_or(json!([]));

    json!({
        "layout": layout,
        "tables": tables,
        "formulas": serialized("formula_res_list"),
        "parsing_res": serialized("parsing_res_list"),
        "format": "json",
    })
}

/// Render structure output as Markdown, mapping title labels to headings.
pub fn format_structure_markdown(raw: Value) -> Value {
    let Some(page) = first_page(raw) else {
        return json!({"markdown": "", "format": "markdown"});
    };

    let mut lines = Vec::new();
    let blocks = page
        .get("parsing_res_list")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();

    for block in blocks.filter(|b| b.is_object()) {
        let label = field(block, LABEL_KEYS).map(stringify).unwrap_or_default();
        let content = field(block, CONTENT_KEYS).map(stringify).unwrap_or_default();
        if content.is_empty() {
            continue;
        }

        let line = match label.as_str() {
            "doc_title" => format!("# {}\n", content),
            "section_title" => format!("## {}\n", content),
            "paragraph_title" => format!("### {}\n", content),
            _ => format!("{}\n", content),
        };
        lines.push(line);
    }

    json!({
        "markdown": lines.join("\n"),
        "format": "markdown",
    })
}
