//! Recognition endpoints - one per pipeline, sharing a single flow:
//! read and validate the upload, stage it, run inference, report metrics.

use std::time::Instant;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use ocrgw_core::domain::{PipelineInput, PipelineKind, RequestMetrics};
use ocrgw_shared::{MetricsBody, OcrResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::state::AppState;
use crate::upload;

/// POST {prefix}/text - basic text recognition (OCRv5).
pub async fn text(
    state: web::Data<AppState>,
    request_id: RequestId,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    recognize(PipelineKind::Ocrv5, state, request_id, payload).await
}

/// POST {prefix}/document - complex document parsing (VL).
pub async fn document(
    state: web::Data<AppState>,
    request_id: RequestId,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    recognize(PipelineKind::Vl, state, request_id, payload).await
}

/// POST {prefix}/table - table and structure recognition (StructureV3).
pub async fn table(
    state: web::Data<AppState>,
    request_id: RequestId,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    recognize(PipelineKind::Structure, state, request_id, payload).await
}

async fn recognize(
    kind: PipelineKind,
    state: web::Data<AppState>,
    request_id: RequestId,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let pipeline = state.pipelines.get(kind).cloned().ok_or_else(|| {
        AppError::ServiceUnavailable(format!("{} service not initialized", kind.display_name()))
    })?;

    let total_start = Instant::now();

    let form = upload::read_form(payload, &state.limits).await?;
    upload::check_content(&form, kind)?;
    let upload_time = total_start.elapsed().as_secs_f64();
    let size_kb = form.size_kb();

    // The staged file lives until `staged` drops at the end of this function.
    let stage_start = Instant::now();
    let staged = state.stager.stage(&form.bytes, &form.extension).await?;
    let preprocess_time = stage_start.elapsed().as_secs_f64();

    let input = PipelineInput {
        path: staged.path().to_path_buf(),
        file_kind: form.file_kind,
        options: form.options,
    };

    let prediction = pipeline.predict(&input).await.map_err(|e| {
        tracing::error!(
            request_id = %request_id.as_str(),
            pipeline = %kind,
            error = %e,
            "{} inference failed",
            kind.display_name()
        );
        AppError::from(e)
    })?;

    let total_time = total_start.elapsed().as_secs_f64();

    let metrics = RequestMetrics {
        pipeline: kind,
        timestamp: chrono::Utc::now(),
        total_time,
        inference_time: prediction.inference_time,
        upload_time: Some(upload_time),
        preprocess_time: Some(preprocess_time),
        image_size_kb: size_kb,
        compressed: form.compress,
        source: prediction.source,
    };
    if let Err(e) = state.metrics.record(&metrics).await {
        tracing::warn!(pipeline = %kind, error = %e, "Failed to export request metrics");
    }

    tracing::info!(
        request_id = %request_id.as_str(),
        pipeline = %kind,
        total_time,
        inference_time = prediction.inference_time,
        size_kb,
        "Recognition completed"
    );

    Ok(HttpResponse::Ok().json(OcrResponse::ok(
        kind.as_str(),
        prediction.result,
        MetricsBody {
            total_time,
            inference_time: metrics.inference_time,
            upload_time: metrics.upload_time,
            preprocess_time: metrics.preprocess_time,
            image_size_kb: size_kb,
            compressed: metrics.compressed,
            source: metrics.source.as_str().to_string(),
        },
    )))
}
