//! Named styling templates.
//!
//! Built-in templates are always available; a templates directory may add
//! more (or replace a built-in of the same name) with `*.yaml`, `*.yml` or
//! `*.json` files.

use crate::error::{QuizError, QuizResult};
use crate::settings::{is_hex_color, VideoSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Name of the template used when none is requested
pub const DEFAULT_TEMPLATE: &str = "default";

/// A named bundle of colors and font settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Template name (defaults to the file stem for custom templates)
    #[serde(default)]
    pub name: String,
    /// One-line description
    #[serde(default)]
    pub description: String,
    /// Frame background
    pub background_color: String,
    /// Prompt and option text
    pub text_color: String,
    /// Option boxes, countdown and intro underline
    pub accent_color: String,
    /// Highlight for the correct answer
    pub correct_color: String,
    /// Font family
    pub font_family: String,
    /// Base font size at 1080p
    pub font_size: u32,
}

impl Template {
    #[allow(clippy::too_many_arguments)]
    fn builtin(
        name: &str,
        description: &str,
        background: &str,
        text: &str,
        accent: &str,
        correct: &str,
        font: &str,
        size: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            background_color: background.to_string(),
            text_color: text.to_string(),
            accent_color: accent.to_string(),
            correct_color: correct.to_string(),
            font_family: font.to_string(),
            font_size: size,
        }
    }

    /// Built-in templates
    #[must_use]
    pub fn builtins() -> Vec<Self> {
        vec![
            Self::builtin(
                DEFAULT_TEMPLATE,
                "Charcoal background with white text",
                "#1a1a1a",
                "#ffffff",
                "#3b82f6",
                "#22c55e",
                "Arial",
                24,
            ),
            Self::builtin(
                "dark",
                "Deep navy with soft indigo accents",
                "#0f172a",
                "#e2e8f0",
                "#6366f1",
                "#10b981",
                "Helvetica",
                26,
            ),
            Self::builtin(
                "light",
                "Bright background for projectors",
                "#f8fafc",
                "#1e293b",
                "#2563eb",
                "#16a34a",
                "Verdana",
                24,
            ),
            Self::builtin(
                "neon",
                "High-contrast arcade look",
                "#0a0014",
                "#f0f0ff",
                "#ff00d4",
                "#39ff14",
                "Courier",
                28,
            ),
            Self::builtin(
                "classroom",
                "Chalkboard green with chalk-yellow highlights",
                "#1f3b2c",
                "#fefce8",
                "#facc15",
                "#86efac",
                "Times New Roman",
                26,
            ),
        ]
    }

    /// Check colors, font and size
    pub fn validate(&self) -> QuizResult<()> {
        let invalid = |message: String| QuizError::Template { message };
        if self.name.trim().is_empty() {
            return Err(invalid("template name must not be empty".to_string()));
        }
        for (field, color) in [
            ("background_color", &self.background_color),
            ("text_color", &self.text_color),
            ("accent_color", &self.accent_color),
            ("correct_color", &self.correct_color),
        ] {
            if !is_hex_color(color) {
                return Err(invalid(format!(
                    "{}: {field} must be #rrggbb, got '{color}'",
                    self.name
                )));
            }
        }
        if self.font_family.trim().is_empty() {
            return Err(invalid(format!("{}: font_family must not be empty", self.name)));
        }
        if !(16..=48).contains(&self.font_size) {
            return Err(invalid(format!(
                "{}: font_size must be 16-48, got {}",
                self.name, self.font_size
            )));
        }
        Ok(())
    }

    /// Copy colors and font onto video settings
    pub fn apply(&self, settings: &mut VideoSettings) {
        settings.background_color = self.background_color.clone();
        settings.text_color = self.text_color.clone();
        settings.text_font = self.font_family.clone();
        settings.font_size = self.font_size;
    }
}

/// Lookup table of templates by name
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TemplateRegistry {
    /// Registry holding only the built-in templates
    #[must_use]
    pub fn with_builtins() -> Self {
        let templates = Template::builtins()
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();
        Self { templates }
    }

    /// Built-ins plus every template file in `dir`
    pub fn load(dir: Option<&Path>) -> QuizResult<Self> {
        let mut registry = Self::with_builtins();
        if let Some(dir) = dir {
            registry.load_dir(dir)?;
        }
        Ok(registry)
    }

    /// Add every template file in `dir`, replacing templates of the same name
    pub fn load_dir(&mut self, dir: &Path) -> QuizResult<usize> {
        if !dir.is_dir() {
            return Err(QuizError::config(format!(
                "templates directory not found: {}",
                dir.display()
            )));
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("yaml" | "yml" | "json")
                )
            })
            .collect();
        paths.sort();

        for path in &paths {
            let template = read_template(path)?;
            debug!(name = %template.name, path = %path.display(), "loaded template");
            self.insert(template)?;
        }
        Ok(paths.len())
    }

    /// Add or replace a template after validating it
    pub fn insert(&mut self, template: Template) -> QuizResult<()> {
        template.validate()?;
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Look up a template
    pub fn get(&self, name: &str) -> QuizResult<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| QuizError::TemplateNotFound {
                name: name.to_string(),
            })
    }

    /// Template names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Templates, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Number of templates
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn read_template(path: &Path) -> QuizResult<Template> {
    let text = std::fs::read_to_string(path)?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let mut template: Template = if is_json {
        serde_json::from_str(&text).map_err(|e| QuizError::parse("json", format!("{}: {e}", path.display())))?
    } else {
        serde_yaml_ng::from_str(&text)
            .map_err(|e| QuizError::parse("yaml", format!("{}: {e}", path.display())))?
    };
    if template.name.trim().is_empty() {
        template.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
    }
    Ok(template)
}
