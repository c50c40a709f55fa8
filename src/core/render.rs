//! SVG rendering for iconify-dl
//!
//! Turns a raw icon body into a standalone SVG document through a fixed template.

use std::borrow::Cow;

use handlebars::Handlebars;
use serde::Serialize;

use crate::core::catalog::{IconBatchResponse, IconBody};
use crate::core::error::Result;

/// Template shipped with the binary
const ICON_TEMPLATE: &str = include_str!("../../templates/icon.svg.hbs");

const TEMPLATE_NAME: &str = "icon";

/// Sentinel the catalog uses for the inherited foreground color
pub const COLOR_SENTINEL: &str = "currentColor";

/// Target size used when the user leaves width or height empty
const DEFAULT_TARGET_SIZE: &str = "1em";

/// User supplied rendering options, constant for a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderParams {
    pub width: Option<String>,
    pub height: Option<String>,
    pub color: Option<String>,
}

impl RenderParams {
    /// Build params from raw user input, treating blank values as unset
    pub fn from_input(width: &str, height: &str, color: &str) -> Self {
        Self {
            width: non_empty(width),
            height: non_empty(height),
            color: non_empty(color),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Nominal size an icon body was drawn against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    /// Resolve an icon's canvas: each per-icon dimension overrides the batch default on its own
    pub fn resolve(batch: &IconBatchResponse, icon: &IconBody) -> Self {
        Self {
            width: icon.width.unwrap_or(batch.width),
            height: icon.height.unwrap_or(batch.height),
        }
    }
}

#[derive(Serialize)]
struct TemplateData<'a> {
    width: &'a str,
    height: &'a str,
    canvas_width: String,
    canvas_height: String,
    body: Cow<'a, str>,
}

/// Renders icon bodies into SVG documents
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    /// Create a renderer from the bundled template
    pub fn new() -> Result<Self> {
        Self::from_template(ICON_TEMPLATE)
    }

    /// Create a renderer from a custom template source
    pub fn from_template(source: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Bodies are already SVG markup
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(TEMPLATE_NAME, source)?;

        Ok(Self { registry })
    }

    /// Render one icon body into a complete document
    pub fn render(&self, body: &str, canvas: Canvas, params: &RenderParams) -> Result<Vec<u8>> {
        let body = match params.color.as_deref() {
            Some(color) => Cow::Owned(body.replace(COLOR_SENTINEL, color)),
            None => Cow::Borrowed(body),
        };

        let data = TemplateData {
            width: params.width.as_deref().unwrap_or(DEFAULT_TARGET_SIZE),
            height: params.height.as_deref().unwrap_or(DEFAULT_TARGET_SIZE),
            canvas_width: format_dimension(canvas.width),
            canvas_height: format_dimension(canvas.height),
            body,
        };

        let document = self.registry.render(TEMPLATE_NAME, &data)?;
        Ok(document.into_bytes())
    }
}

/// Format a dimension in its shortest decimal form (`24`, `24.5`)
fn format_dimension(value: f64) -> String {
    format!("{}", value)
}
