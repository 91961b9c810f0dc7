use crate::error::{FlowError, Result};
use askama::Template;
use serde::Serialize;
use std::collections::HashMap;

pub const NEOS_FLOW_SETTINGS_TEMPLATE: &str = "neos-flow/Settings.ddev.yaml";

/// Values handed to a settings template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsContext {
    #[serde(rename = "DBHostname")]
    pub db_hostname: String,
    #[serde(rename = "DBDriver")]
    pub db_driver: String,
    #[serde(rename = "DBPort")]
    pub db_port: u16,
}

pub trait TemplateRenderer {
    fn render(&self, name: &str, context: &SettingsContext) -> Result<String>;
}

#[derive(Template)]
#[template(path = "neos-flow/Settings.ddev.yaml", escape = "none")]
struct NeosFlowSettings<'a> {
    db_hostname: &'a str,
    db_driver: &'a str,
    db_port: u16,
}

/// Templates compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct BundledTemplates;

impl TemplateRenderer for BundledTemplates {
    fn render(&self, name: &str, context: &SettingsContext) -> Result<String> {
        let rendered = match name {
            NEOS_FLOW_SETTINGS_TEMPLATE => NeosFlowSettings {
                db_hostname: &context.db_hostname,
                db_driver: &context.db_driver,
                db_port: context.db_port,
            }
            .render(),
            _ => {
                return Err(FlowError::Template {
                    name: name.to_string(),
                    message: "no bundled template with this name".to_string(),
                })
            }
        };

        rendered.map_err(|e| FlowError::Template {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

/// Named template sources rendered by plain `{{ Key }}` substitution, where
/// `Key` is a serialized [`SettingsContext`] field.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTemplates {
    sources: HashMap<String, String>,
}

impl InMemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, name: &str, source: &str) -> Self {
        self.sources.insert(name.to_string(), source.to_string());
        self
    }
}

impl TemplateRenderer for InMemoryTemplates {
    fn render(&self, name: &str, context: &SettingsContext) -> Result<String> {
        let template_error = |message: String| FlowError::Template {
            name: name.to_string(),
            message,
        };

        let source = self
            .sources
            .get(name)
            .ok_or_else(|| template_error("template not registered".to_string()))?;

        let values = serde_json::to_value(context).map_err(|e| template_error(e.to_string()))?;
        let mut rendered = source.clone();
        if let Some(fields) = values.as_object() {
            for (key, value) in fields {
                let replacement = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                rendered = rendered.replace(&format!("{{{{ {} }}}}", key), &replacement);
            }
        }

        Ok(rendered)
    }
}
