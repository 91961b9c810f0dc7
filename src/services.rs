// Collaborators the workflows call out to. Kept behind traits so the CLI wires
// real implementations and tests substitute recording ones.
use crate::error::Result;
use crate::project::{DatabaseType, ProjectDescriptor};
use crate::templates::{BundledTemplates, TemplateRenderer};
use colored::*;
use std::cell::RefCell;
use tracing::debug;

pub trait PortResolver {
    fn exposed_port(&self, project: &ProjectDescriptor, service: &str) -> Result<u16>;
}

/// Uses `ports` overrides from the project config, else the engine default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptorPorts;

impl PortResolver for DescriptorPorts {
    fn exposed_port(&self, project: &ProjectDescriptor, service: &str) -> Result<u16> {
        if let Some(port) = project.ports.get(service) {
            return Ok(*port);
        }

        Ok(match (service, project.database.db_type) {
            ("db", DatabaseType::Postgres) => 5432,
            ("db", _) => 3306,
            _ => 80,
        })
    }
}

pub trait WarningSink {
    fn warn(&self, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleWarnings;

impl WarningSink for ConsoleWarnings {
    fn warn(&self, message: &str) {
        debug!(%message, "user warning");
        eprintln!("{}", message.yellow());
    }
}

/// Keeps every warning in memory.
#[derive(Debug, Default)]
pub struct RecordedWarnings {
    messages: RefCell<Vec<String>>,
}

impl RecordedWarnings {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl WarningSink for RecordedWarnings {
    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

pub struct Services<'a> {
    pub templates: &'a dyn TemplateRenderer,
    pub ports: &'a dyn PortResolver,
    pub warnings: &'a dyn WarningSink,
}

impl Services<'static> {
    pub fn console() -> Self {
        Self {
            templates: &BundledTemplates,
            ports: &DescriptorPorts,
            warnings: &ConsoleWarnings,
        }
    }
}
