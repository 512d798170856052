// SPDX-License-Identifier: Apache-2.0

//! Image building.
//!
//! Renders the language's build template into a Dockerfile inside the
//! working directory, invokes the engine build, and recovers the
//! content-addressed image identifier from the captured output.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::ContainerEngine;
use crate::error::{BuildError, ExtractionError, ForgeError, ForgeResult};
use crate::template::TemplateStore;
use crate::types::{ImageId, Language, CONTENT_ADDRESS_PREFIX};

/// Conventional build-descriptor filename the engine expects.
pub const BUILD_DESCRIPTOR_FILENAME: &str = "Dockerfile";

/// Marker line the engine emits when writing the final image.
const IMAGE_WRITE_MARKER: &str = "writing image";

/// Prefix for language-scoped image tags.
const IMAGE_TAG_PREFIX: &str = "funcforge";

/// Builds runnable container images from extracted function sources.
pub struct ImageBuilder<E> {
    templates: TemplateStore,
    engine: Arc<E>,
    deadline: Duration,
}

impl<E: ContainerEngine> ImageBuilder<E> {
    pub fn new(templates: TemplateStore, engine: Arc<E>, deadline: Duration) -> Self {
        Self {
            templates,
            engine,
            deadline,
        }
    }

    /// Build `workdir` into an image for `language` with entry point `handler`.
    ///
    /// On success the returned identifier is content-addressed and can be
    /// handed to the engine's run operation. No rollback is attempted on
    /// partial failure; the engine's own layer semantics govern any
    /// partial state.
    pub async fn build(
        &self,
        workdir: &Path,
        language: Language,
        handler: &str,
    ) -> ForgeResult<ImageId> {
        let template = self.templates.get(language)?;
        let dockerfile = template.render(handler)?;

        let descriptor_path = workdir.join(BUILD_DESCRIPTOR_FILENAME);
        std::fs::write(&descriptor_path, dockerfile).map_err(|e| ForgeError::Io {
            context: "writing build descriptor",
            source: e,
        })?;

        let tag = format!("{}/{}", IMAGE_TAG_PREFIX, language.tag());
        tracing::debug!(%language, %tag, workdir = %workdir.display(), "starting image build");

        let output = self.engine.build(workdir, &tag, self.deadline).await?;
        if !output.success {
            return Err(BuildError::Failed {
                status: output.code,
                output: output.text(),
            }
            .into());
        }

        let image_id = parse_image_id(&output.text())?;
        tracing::info!(%language, image_id = %image_id, "image build complete");
        Ok(image_id)
    }
}

/// Recover the content-addressed image identifier from engine build output.
///
/// Scans for the line marking the final image-write step and extracts the
/// token carrying the content-address prefix. This is the only place that
/// depends on the engine's log format; callers see just an [`ImageId`] or
/// an [`ExtractionError`].
pub fn parse_image_id(output: &str) -> Result<ImageId, ExtractionError> {
    for line in output.lines() {
        if !line.contains(IMAGE_WRITE_MARKER) {
            continue;
        }
        for token in line.split_whitespace() {
            if token.starts_with(CONTENT_ADDRESS_PREFIX) {
                return ImageId::new(token);
            }
        }
    }

    Err(ExtractionError::ImageIdNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILD_LOG: &str = "\
#7 exporting to image
#7 exporting layers done
#7 writing image sha256:4a1c7e3ba7c8d51f8e2b9a3c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f80 done
#7 naming to funcforge/python done";

    #[test]
    fn test_parse_image_id_from_build_log() {
        let id = parse_image_id(BUILD_LOG).unwrap();
        assert_eq!(
            id.as_str(),
            "sha256:4a1c7e3ba7c8d51f8e2b9a3c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f80"
        );
    }

    #[test]
    fn test_parse_image_id_no_marker() {
        let log = "#7 exporting layers\n#7 naming to funcforge/python done";
        let err = parse_image_id(log).unwrap_err();
        assert!(matches!(err, ExtractionError::ImageIdNotFound));
    }

    #[test]
    fn test_parse_image_id_marker_without_token() {
        let log = "#7 writing image ...interrupted";
        let err = parse_image_id(log).unwrap_err();
        assert!(matches!(err, ExtractionError::ImageIdNotFound));
    }

    #[test]
    fn test_parse_image_id_ignores_unrelated_sha_tokens() {
        let log = "\
#4 resolving sha256:1111111111111111111111111111111111111111111111111111111111111111
#7 writing image sha256:2222222222222222222222222222222222222222222222222222222222222222 done";
        let id = parse_image_id(log).unwrap();
        assert!(id.as_str().contains("2222"));
    }
}
