// SPDX-License-Identifier: Apache-2.0

//! Language-keyed build-template store.
//!
//! Templates live on disk as `<dir>/<tag>.yaml`, each carrying the
//! Dockerfile text for one language. All templates are loaded at startup
//! and the store is immutable afterwards.
//!
//! Templates for languages with a parameterized entry point carry a
//! `{handler}` placeholder that rendering substitutes with the detected
//! handler filename; self-contained builds use their text verbatim.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::TemplateError;
use crate::types::Language;

/// Placeholder substituted with the handler filename at render time.
pub const HANDLER_PLACEHOLDER: &str = "{handler}";

/// Raw template as parsed from YAML.
#[derive(Debug, Deserialize)]
struct RawTemplate {
    dockerfile: String,
}

/// A loaded build template for one language.
#[derive(Debug, Clone)]
pub struct BuildTemplate {
    language: Language,
    dockerfile: String,
}

impl BuildTemplate {
    /// Render the template into concrete build-descriptor text.
    ///
    /// Parameterized languages substitute `handler` at the placeholder;
    /// self-contained languages return the template verbatim.
    pub fn render(&self, handler: &str) -> Result<String, TemplateError> {
        if !self.language.parameterized() {
            return Ok(self.dockerfile.clone());
        }

        if !self.dockerfile.contains(HANDLER_PLACEHOLDER) {
            return Err(TemplateError::MissingPlaceholder {
                language: self.language,
            });
        }

        Ok(self.dockerfile.replace(HANDLER_PLACEHOLDER, handler))
    }
}

/// Immutable store of build templates, one per supported language.
#[derive(Debug)]
pub struct TemplateStore {
    templates: HashMap<Language, BuildTemplate>,
}

impl TemplateStore {
    /// Load templates for every supported language from `dir`.
    ///
    /// Fails fast: a missing or malformed file for any language prevents
    /// startup rather than surfacing at the first load request.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let dir = dir.as_ref();
        let mut templates = HashMap::new();

        for language in Language::ALL {
            let path = dir.join(format!("{}.yaml", language.tag()));

            let content = std::fs::read_to_string(&path).map_err(|_| TemplateError::NotFound {
                language,
                path: path.clone(),
            })?;

            let raw: RawTemplate =
                serde_yaml::from_str(&content).map_err(|e| TemplateError::Parse {
                    language,
                    message: e.to_string(),
                })?;

            let template = BuildTemplate {
                language,
                dockerfile: raw.dockerfile,
            };

            if language.parameterized()
                && !template.dockerfile.contains(HANDLER_PLACEHOLDER)
            {
                return Err(TemplateError::MissingPlaceholder { language });
            }

            templates.insert(language, template);
        }

        Ok(Self { templates })
    }

    /// Get the template for `language`.
    pub fn get(&self, language: Language) -> Result<&BuildTemplate, TemplateError> {
        self.templates
            .get(&language)
            .ok_or(TemplateError::NotFound {
                language,
                path: format!("{}.yaml", language.tag()).into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn write_templates(dir: &Path, python: &str, golang: &str) {
        fs::write(dir.join("python.yaml"), python).unwrap();
        fs::write(dir.join("golang.yaml"), golang).unwrap();
    }

    const PYTHON_YAML: &str = "dockerfile: |\n  FROM python:3.12-slim\n  CMD [\"python\", \"{handler}\"]\n";
    const GOLANG_YAML: &str = "dockerfile: |\n  FROM golang:1.22\n  RUN go build -o /function .\n";

    #[test]
    fn test_load_and_render_parameterized() {
        let dir = TempDir::new().unwrap();
        write_templates(dir.path(), PYTHON_YAML, GOLANG_YAML);

        let store = TemplateStore::load_dir(dir.path()).unwrap();
        let rendered = store
            .get(Language::Python)
            .unwrap()
            .render("handler.py")
            .unwrap();

        assert!(rendered.contains("\"handler.py\""));
        assert!(!rendered.contains(HANDLER_PLACEHOLDER));
    }

    #[test]
    fn test_render_self_contained_verbatim() {
        let dir = TempDir::new().unwrap();
        write_templates(dir.path(), PYTHON_YAML, GOLANG_YAML);

        let store = TemplateStore::load_dir(dir.path()).unwrap();
        let rendered = store
            .get(Language::Go)
            .unwrap()
            .render("main.go")
            .unwrap();

        assert!(rendered.contains("go build"));
        assert!(!rendered.contains("main.go"));
    }

    #[test]
    fn test_missing_template_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("python.yaml"), PYTHON_YAML).unwrap();

        let err = TemplateStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::NotFound {
                language: Language::Go,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_template_file() {
        let dir = TempDir::new().unwrap();
        write_templates(dir.path(), "dockerfile: [not, a, string]", GOLANG_YAML);

        let err = TemplateStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }

    #[test]
    fn test_parameterized_without_placeholder() {
        let dir = TempDir::new().unwrap();
        write_templates(
            dir.path(),
            "dockerfile: |\n  FROM python:3.12-slim\n  CMD [\"python\", \"main.py\"]\n",
            GOLANG_YAML,
        );

        let err = TemplateStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingPlaceholder { .. }));
    }
}
