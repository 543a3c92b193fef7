//! Output normalization - turn raw pipeline output into the gateway's
//! uniform result shapes.
//!
//! Backends answer with heterogeneous JSON: bare page results, lists of
//! pages, or serving envelopes wrapping `prunedResult` objects. Layout
//! blocks may spell their fields `label/content/bbox` or
//! `block_label/block_content/block_bbox`, and arrays may arrive either as
//! plain nested lists or as `{data, shape}` tensors. Everything here is
//! pure over [`serde_json::Value`].

mod ocr;
mod structure;
mod value;
mod vl;

pub use ocr::format_ocr;
pub use structure::{format_structure_json, format_structure_markdown};
pub use value::{pages, score, to_serializable};
pub use vl::{format_vl_json, format_vl_markdown};
