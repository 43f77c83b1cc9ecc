use anyhow::{Context, Result};
use handlebars::{
    Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::templates;
use crate::queue::{QueueAttributes, QueueConfig, QueueDescriptor};

const MODULE_MAIN: &str = "module_main";
const MODULE_VARIABLES: &str = "module_variables";
const MODULE_OUTPUTS: &str = "module_outputs";
const MODULE_CALL: &str = "module_call";
const QUEUE_OUTPUTS: &str = "queue_outputs";

/// Render context for one queue's module call and outputs
#[derive(Debug, Clone, Serialize)]
pub struct QueueBlock {
    pub module_name: String,
    pub name: String,
    pub source: String,
    pub attributes: QueueAttributes,
    pub tags: Vec<TagEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagEntry {
    pub key: String,
    pub value: String,
}

impl QueueBlock {
    pub fn new(queue: &QueueDescriptor, config: &QueueConfig, source: &str) -> Self {
        Self {
            module_name: queue.module_name(),
            name: queue.name.clone(),
            source: source.to_string(),
            attributes: config.attributes.clone(),
            tags: config
                .tags
                .iter()
                .map(|(key, value)| TagEntry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

/// Renders module files, module calls and output declarations using Handlebars
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Output is HCL, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);
        handlebars.register_helper("hcl_string", Box::new(hcl_string_helper));

        for (name, source) in [
            (MODULE_MAIN, templates::MODULE_MAIN),
            (MODULE_VARIABLES, templates::MODULE_VARIABLES),
            (MODULE_OUTPUTS, templates::MODULE_OUTPUTS),
            (MODULE_CALL, templates::MODULE_CALL),
            (QUEUE_OUTPUTS, templates::QUEUE_OUTPUTS),
        ] {
            handlebars
                .register_template_string(name, source)
                .with_context(|| format!("Failed to register template '{}'", name))?;
        }

        Ok(Self { handlebars })
    }

    /// The three module files as (file name, contents)
    pub fn render_module_files(&self) -> Result<Vec<(&'static str, String)>> {
        let data = json!({ "defaults": QueueAttributes::default() });

        Ok(vec![
            ("main.tf", self.render(MODULE_MAIN, &data)?),
            ("variables.tf", self.render(MODULE_VARIABLES, &data)?),
            ("outputs.tf", self.render(MODULE_OUTPUTS, &data)?),
        ])
    }

    pub fn render_module_call(&self, block: &QueueBlock) -> Result<String> {
        self.render(MODULE_CALL, block)
    }

    pub fn render_outputs(&self, block: &QueueBlock) -> Result<String> {
        self.render(QUEUE_OUTPUTS, block)
    }

    fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .with_context(|| format!("Failed to render template '{}'", name))
    }
}

/// Quote a value as an HCL string literal
pub fn hcl_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');

    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            // Template sequences are literal in generated values
            '$' | '%' if chars.peek() == Some(&'{') => {
                quoted.push(c);
                quoted.push(c);
            }
            _ => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}

fn hcl_string_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h
        .param(0)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("hcl_string", 0))?;

    let text = match param.value() {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    out.write(&hcl_quote(&text))?;
    Ok(())
}
