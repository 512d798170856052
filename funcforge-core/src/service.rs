// SPDX-License-Identifier: Apache-2.0

//! Load/execute orchestration.
//!
//! Ties the pipeline together: archive extraction into a per-request
//! working directory, handler detection, image build, and registration;
//! and the execute path from registry lookup to container run.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::archive;
use crate::builder::ImageBuilder;
use crate::detect;
use crate::engine::ContainerEngine;
use crate::error::{ForgeError, ForgeResult, RunError};
use crate::registry::FunctionRegistry;
use crate::template::TemplateStore;
use crate::types::{FunctionId, ImageId};

/// Prefix for per-request working directories under the system temp root.
const WORKDIR_PREFIX: &str = "funcforge-";

/// Outcome of a successful load, reported back to the client.
#[derive(Debug, Clone)]
pub struct LoadReceipt {
    pub function_id: FunctionId,
    pub image_id: ImageId,
}

/// The packaging and execution orchestrator.
///
/// One instance is shared by all in-flight requests; the registry is the
/// only mutable state and is concurrency-safe.
pub struct FunctionService<E> {
    registry: FunctionRegistry,
    builder: ImageBuilder<E>,
    engine: Arc<E>,
    run_deadline: Duration,
}

impl<E: ContainerEngine + 'static> FunctionService<E> {
    pub fn new(
        templates: TemplateStore,
        engine: Arc<E>,
        build_deadline: Duration,
        run_deadline: Duration,
    ) -> Self {
        Self {
            registry: FunctionRegistry::new(),
            builder: ImageBuilder::new(templates, Arc::clone(&engine), build_deadline),
            engine,
            run_deadline,
        }
    }

    /// Load an uploaded archive: extract, detect, build, register.
    ///
    /// The steps run strictly in sequence; the working directory is
    /// dropped (and removed) on every return path. A failed load
    /// registers nothing.
    pub async fn load(&self, archive_bytes: Vec<u8>) -> ForgeResult<LoadReceipt> {
        let workdir = TempDir::with_prefix(WORKDIR_PREFIX).map_err(|e| ForgeError::Io {
            context: "creating working directory",
            source: e,
        })?;
        let root = workdir.path().to_path_buf();

        let extract_root = root.clone();
        tokio::task::spawn_blocking(move || archive::extract_archive(&archive_bytes, &extract_root))
            .await
            .map_err(|e| ForgeError::Io {
                context: "extraction task",
                source: std::io::Error::other(e),
            })??;

        let (handler, language) = detect::detect_handler(&root)?;
        tracing::info!(%language, handler = %handler, "detected function handler");

        let image_id = self.builder.build(&root, language, &handler).await?;
        let function_id = self.registry.register(image_id.clone());
        tracing::info!(function_id = %function_id, image_id = %image_id, "function loaded");

        Ok(LoadReceipt {
            function_id,
            image_id,
        })
    }

    /// Execute a previously loaded function and return its combined output.
    pub async fn execute(&self, id: &FunctionId) -> ForgeResult<String> {
        let image = self.registry.lookup(id)?;
        tracing::debug!(function_id = %id, image_id = %image, "running function container");

        let output = self.engine.run(&image, self.run_deadline).await?;
        if !output.success {
            return Err(RunError::Failed {
                status: output.code,
                output: output.text(),
            }
            .into());
        }

        Ok(output.text())
    }

    /// Shared function registry.
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }
}
