use serde_json::Value;

/// Serving envelope keys holding the per-page result list.
const ENVELOPE_KEYS: [&str; 3] = ["ocrResults", "layoutParsingResults", "tableRecResults"];

pub(crate) const LABEL_KEYS: &[&str] = &["label", "block_label"];
pub(crate) const CONTENT_KEYS: &[&str] = &["content", "block_content"];
pub(crate) const BBOX_KEYS: &[&str] = &["bbox", "block_bbox"];

/// Split a raw backend response into its page results, in order.
///
/// A lone object is a single page; `null` and empty lists have no pages.
pub fn pages(raw: Value) -> Vec<Value> {
    match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(unwrap_page).collect(),
        Value::Object(mut map) => {
            if map
                .get("result")
                .is_some_and(|r| r.is_object() || r.is_array())
            {
                return pages(map.remove("result").unwrap_or(Value::Null));
            }

            for key in ENVELOPE_KEYS {
                if map.get(key).is_some_and(Value::is_array) {
                    return pages(map.remove(key).unwrap_or(Value::Null));
                }
            }

            vec![unwrap_page(Value::Object(map))]
        }
        other => vec![other],
    }
}

fn unwrap_page(page: Value) -> Value {
    match page {
        Value::Object(mut map) => {
            for key in ["prunedResult", "res"] {
                if map.get(key).is_some_and(Value::is_object) {
                    return map.remove(key).unwrap_or(Value::Null);
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// First non-null value among `names` on an object.
pub(crate) fn field<'a>(item: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| item.get(*name))
        .find(|v| !v.is_null())
}

/// Render a scalar as display text; `null` becomes the empty string.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Serialized array stored under `key`, or an empty list.
pub(crate) fn array_at(item: &Value, key: &str) -> Vec<Value> {
    match item.get(key).map(to_serializable) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Confidence score from a number or numeric string, defaulting to 0.0.
pub fn score(value: Option<&Value>) -> f64 {
    match value.map(to_serializable) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Recursively flatten tensor-like and boxed values into plain JSON.
///
/// `{"data": [...], "shape": [...]}` and `{"__ndarray__": [...]}` collapse
/// to nested lists; `{"item": x}` and `{"value": x}` singletons holding a
/// scalar collapse to the scalar.
pub fn to_serializable(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(to_serializable).collect()),
        Value::Object(map) => {
            if let Some(Value::Array(data)) = map.get("__ndarray__") {
                return Value::Array(data.iter().map(to_serializable).collect());
            }

            if let (Some(Value::Array(data)), Some(Value::Array(shape))) =
                (map.get("data"), map.get("shape"))
            {
                let tensor_keys = map
                    .keys()
                    .all(|k| matches!(k.as_str(), "data" | "shape" | "dtype"));
                if tensor_keys {
                    let data: Vec<Value> = data.iter().map(to_serializable).collect();
                    let shape: Option<Vec<usize>> = shape
                        .iter()
                        .map(|d| d.as_u64().and_then(|d| usize::try_from(d).ok()))
                        .collect();
                    return shape
                        .and_then(|shape| reshape(&data, &shape))
                        .unwrap_or(Value::Array(data));
                }
            }

            if map.len() == 1 {
                if let Some(inner) = map.get("item").or_else(|| map.get("value")) {
                    if !inner.is_object() && !inner.is_array() {
                        return inner.clone();
                    }
                }
            }

            Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), to_serializable(v)))
                    .collect(),
            )
        }
        scalar => scalar.clone(),
    }
}

/// Most empty rows materialized for a tensor with a zero dimension.
const MAX_EMPTY_ROWS: usize = 1 << 16;

/// Number of elements a shape holds; `None` on overflow.
fn element_count(dims: &[usize]) -> Option<usize> {
    if dims.contains(&0) {
        return Some(0);
    }
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Rebuild nested rows from a flat buffer; `None` if the shape does not fit.
fn reshape(flat: &[Value], shape: &[usize]) -> Option<Value> {
    if shape.is_empty() || element_count(shape)? != flat.len() {
        return None;
    }
    // Already nested: the data length matches the outer dimension only.
    if shape.len() > 1 && flat.iter().any(Value::is_array) {
        return None;
    }
    // Rows above the first zero dimension are built empty, one by one.
    let leading = shape.iter().take_while(|&&d| d != 0).count();
    if leading < shape.len() && element_count(&shape[..leading])? > MAX_EMPTY_ROWS {
        return None;
    }
    Some(build_rows(flat, shape))
}

fn build_rows(flat: &[Value], shape: &[usize]) -> Value {
    match shape {
        [] | [_] => Value::Array(flat.to_vec()),
        [0, ..] => Value::Array(Vec::new()),
        [outer, rest @ ..] => match element_count(rest).unwrap_or(0) {
            0 => Value::Array(vec![build_rows(&[], rest); *outer]),
            stride => Value::Array(flat.chunks(stride).map(|c| build_rows(c, rest)).collect()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pages_from_serving_envelope() {
        let raw = json!({
            "logId": "abc",
            "result": {
                "layoutParsingResults": [
                    {"prunedResult": {"page_index": 0}},
                    {"prunedResult": {"page_index": 1}}
                ]
            }
        });

        let pages = pages(raw);
        assert_eq!(pages, vec![json!({"page_index": 0}), json!({"page_index": 1})]);
    }

    #[test]
    fn test_pages_from_bare_shapes() {
        assert!(pages(Value::Null).is_empty());
        assert!(pages(json!([])).is_empty());
        assert_eq!(pages(json!({"rec_texts": []})).len(), 1);
        assert_eq!(pages(json!([{"res": {"a": 1}}])), vec![json!({"a": 1})]);
    }

    #[test]
    fn test_tensor_reshape() {
        let tensor = json!({"data": [1, 2, 3, 4, 5, 6], "shape": [2, 3], "dtype": "int16"});
        assert_eq!(to_serializable(&tensor), json!([[1, 2, 3], [4, 5, 6]]));

        let mismatched = json!({"data": [1, 2, 3], "shape": [2, 2]});
        assert_eq!(to_serializable(&mismatched), json!([1, 2, 3]));

        let empty_rows = json!({"data": [], "shape": [2, 0]});
        assert_eq!(to_serializable(&empty_rows), json!([[], []]));

        let empty_outer = json!({"data": [], "shape": [0, 4]});
        assert_eq!(to_serializable(&empty_outer), json!([]));

        let ndarray = json!({"__ndarray__": [[0.5, 1.5]]});
        assert_eq!(to_serializable(&ndarray), json!([[0.5, 1.5]]));
    }

    #[test]
    fn test_oversized_shapes_stay_flat() {
        let overflowing = json!({"data": [], "shape": [u64::MAX, 2]});
        assert_eq!(to_serializable(&overflowing), json!([]));

        let huge = json!({"data": [1], "shape": [1u64 << 32, 1u64 << 32, 2]});
        assert_eq!(to_serializable(&huge), json!([1]));

        let too_many_empty_rows = json!({"data": [], "shape": [u64::MAX, 0]});
        assert_eq!(to_serializable(&too_many_empty_rows), json!([]));

        let zero_then_overflow = json!({"data": [], "shape": [0, u64::MAX, u64::MAX]});
        assert_eq!(to_serializable(&zero_then_overflow), json!([]));
    }

    #[test]
    fn test_boxed_scalars_collapse() {
        let value = json!({"score": {"item": 0.93}, "nested": [{"value": "x"}], "keep": {"value": [1]}});
        assert_eq!(
            to_serializable(&value),
            json!({"score": 0.93, "nested": ["x"], "keep": {"value": [1]}})
        );
    }

    #[test]
    fn test_score_and_field_helpers() {
        assert_eq!(score(Some(&json!(0.5))), 0.5);
        assert_eq!(score(Some(&json!("0.25"))), 0.25);
        assert_eq!(score(Some(&json!("n/a"))), 0.0);
        assert_eq!(score(None), 0.0);

        let block = json!({"label": null, "block_label": "text"});
        assert_eq!(field(&block, LABEL_KEYS), Some(&json!("text")));
        assert_eq!(stringify(&json!(3)), "3");
    }
}
