//! Async entry points
//!
//! The engine is synchronous CPU work; these run it on the blocking pool so
//! async callers don't stall their executor. Dropping the returned future
//! discards the result without any other visible effect.

use crate::request::WatermarkRequest;
use crate::watermark::{apply_watermark, watermark_with_identity};
use crate::{Result, WatermarkError};

/// Async variant of [`apply_watermark`]
pub async fn apply_watermark_async(
    pdf_bytes: Vec<u8>,
    request: WatermarkRequest,
) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || apply_watermark(&pdf_bytes, &request))
        .await
        .map_err(|e| WatermarkError::TaskJoin(e.to_string()))?
}

/// Async variant of [`watermark_with_identity`]
pub async fn watermark_with_identity_async(
    pdf_bytes: Vec<u8>,
    full_name: String,
    department: String,
    include_timestamp: bool,
) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        watermark_with_identity(&pdf_bytes, &full_name, &department, include_timestamp)
    })
    .await
    .map_err(|e| WatermarkError::TaskJoin(e.to_string()))?
}
