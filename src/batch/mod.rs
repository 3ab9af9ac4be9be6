//! Batch orchestration: template + fields + rows → one PNG per row.
//!
//! The orchestrator loads the template once, pre-resolves every font
//! once, then walks the rows in fixed-size chunks. Chunks run strictly
//! in sequence; rows within a chunk render concurrently (raster work on
//! the blocking pool, writes via async I/O). That caps simultaneous
//! canvas memory at the chunk size no matter how many rows arrive,
//! while still overlapping CPU and disk work inside a chunk.

pub mod filename;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use image::RgbaImage;

use crate::error::LaurelError;
use crate::field::{FieldMapping, Row};
use crate::font::{FontLibrary, ResolvedFonts};
use crate::render;

/// Rows rendered concurrently per chunk. 25 concurrent canvases is safe
/// on most machines.
pub const DEFAULT_CHUNK_SIZE: usize = 25;

/// Runs certificate batches against a shared [`FontLibrary`].
pub struct BatchRunner {
    library: Arc<FontLibrary>,
    output_root: PathBuf,
    chunk_size: usize,
}

impl BatchRunner {
    pub fn new(library: Arc<FontLibrary>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            library,
            output_root: output_root.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the chunk size (mainly for tests and small machines).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Render every row to a PNG under a fresh timestamped batch
    /// directory and return the written paths in row order.
    ///
    /// Filenames come from `row[file_name_column]` (or a positional
    /// `certificate_<n>` fallback), sanitized and deduplicated across
    /// the batch. Any render or I/O error aborts the whole batch.
    pub async fn run(
        &self,
        template_path: &Path,
        fields: &[FieldMapping],
        rows: &[Row],
        file_name_column: &str,
    ) -> Result<Vec<PathBuf>, LaurelError> {
        let (template, fonts) = self.load_inputs(template_path, fields).await?;
        let template = Arc::new(template);
        let fonts = Arc::new(fonts);
        let fields: Arc<Vec<FieldMapping>> = Arc::new(fields.to_vec());

        let batch_dir = self
            .output_root
            .join(format!("batch_{}", Utc::now().timestamp_millis()));
        tokio::fs::create_dir_all(&batch_dir).await?;
        println!(
            "[batch] Rendering {} certificate(s) into {}",
            rows.len(),
            batch_dir.display()
        );

        let mut used_names: HashSet<String> = HashSet::new();
        let mut all_paths = Vec::with_capacity(rows.len());

        for (chunk_index, chunk) in rows.chunks(self.chunk_size).enumerate() {
            let mut handles = Vec::with_capacity(chunk.len());

            for (offset, row) in chunk.iter().enumerate() {
                let row_number = chunk_index * self.chunk_size + offset + 1;
                // Name bookkeeping stays on this loop so duplicate
                // detection is serialized even while renders overlap.
                let raw_name = row
                    .get(file_name_column)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("certificate_{row_number}"));
                let base = filename::sanitize(&raw_name);
                let file_name = filename::unique_name(&base, ".png", &mut used_names);
                let out_path = batch_dir.join(file_name);

                let template = Arc::clone(&template);
                let fields = Arc::clone(&fields);
                let fonts = Arc::clone(&fonts);
                let row = row.clone();
                handles.push(tokio::spawn(async move {
                    let png = tokio::task::spawn_blocking(move || {
                        render::composite(&template, &fields, &row, &fonts)
                    })
                    .await
                    .map_err(|e| LaurelError::Render(format!("render task failed: {e}")))??;
                    tokio::fs::write(&out_path, png).await?;
                    Ok::<PathBuf, LaurelError>(out_path)
                }));
            }

            // Collect positionally, not by completion time: the result
            // list must follow input row order. Awaiting every handle
            // also guarantees the next chunk starts only after this one
            // fully settles.
            for handle in handles {
                let path = handle
                    .await
                    .map_err(|e| LaurelError::Render(format!("render task failed: {e}")))??;
                all_paths.push(path);
            }
        }

        Ok(all_paths)
    }

    /// Render only the given (typically first) row and return the PNG
    /// buffer. Same pipeline as [`run`](Self::run), no file I/O; the
    /// caller decides where the bytes go.
    pub async fn preview(
        &self,
        template_path: &Path,
        fields: &[FieldMapping],
        row: &Row,
    ) -> Result<Vec<u8>, LaurelError> {
        let (template, fonts) = self.load_inputs(template_path, fields).await?;
        let fields = fields.to_vec();
        let row = row.clone();
        tokio::task::spawn_blocking(move || render::composite(&template, &fields, &row, &fonts))
            .await
            .map_err(|e| LaurelError::Render(format!("render task failed: {e}")))?
    }

    /// Shared batch/preview setup: validate fields, then read the
    /// template bytes and pre-resolve all fonts concurrently (both are
    /// independent I/O), and decode the template once.
    async fn load_inputs(
        &self,
        template_path: &Path,
        fields: &[FieldMapping],
    ) -> Result<(RgbaImage, ResolvedFonts), LaurelError> {
        for field in fields {
            field.validate()?;
        }

        let (template_bytes, fonts) = tokio::try_join!(
            async {
                tokio::fs::read(template_path).await.map_err(|e| {
                    LaurelError::Template(format!(
                        "failed to read template {}: {e}",
                        template_path.display()
                    ))
                })
            },
            async { Ok::<_, LaurelError>(self.library.pre_resolve(fields).await) },
        )?;

        let template = image::load_from_memory(&template_bytes)
            .map_err(|e| LaurelError::Template(format!("failed to decode template: {e}")))?
            .to_rgba8();

        Ok((template, fonts))
    }
}
