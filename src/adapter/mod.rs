mod neos_flow;

pub use neos_flow::NEOS_FLOW;

use crate::config::DocrootPolicy;
use crate::error::{FlowError, Result};
use crate::project::ProjectDescriptor;
use crate::services::Services;
use crate::{docroot, import, settings};
use std::path::{Path, PathBuf};
use tracing::info;

/// Declarative description of a supported framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameworkSpec {
    pub app_type: &'static str,
    pub display_name: &'static str,
    /// Entry under the composer root whose presence marks an installed framework.
    pub marker: &'static str,
    pub settings_dir: &'static [&'static str],
    pub settings_file: &'static str,
    pub template: &'static str,
    pub db_hostname: &'static str,
    pub default_docroot: &'static str,
    pub upload_dirs: &'static [&'static str],
    pub web_environment: &'static [&'static str],
}

pub trait FrameworkAdapter {
    fn spec(&self) -> &FrameworkSpec;

    fn name(&self) -> &'static str {
        self.spec().app_type
    }

    fn detect(&self, project: &ProjectDescriptor) -> bool {
        settings::is_framework_app(self.spec(), project)
    }

    fn settings_path(&self, project: &mut ProjectDescriptor) {
        settings::resolve_settings_path(self.spec(), project)
    }

    fn provision(&self, project: &ProjectDescriptor, services: &Services<'_>) -> Result<PathBuf> {
        settings::provision_settings(self.spec(), project, services)
    }

    fn normalize_docroot(
        &self,
        project: &mut ProjectDescriptor,
        policy: DocrootPolicy,
    ) -> Result<()> {
        docroot::normalize_docroot(self.spec(), project, policy)
    }

    fn import_files(
        &self,
        project: &ProjectDescriptor,
        upload_dir: &str,
        source: &Path,
        extract_path: &str,
    ) -> Result<()> {
        import::import_files(project, upload_dir, source, extract_path)
    }
}

/// Adapter whose whole behavior comes from its [`FrameworkSpec`].
#[derive(Debug, Clone, Copy)]
pub struct TableAdapter {
    spec: &'static FrameworkSpec,
}

impl TableAdapter {
    pub const fn new(spec: &'static FrameworkSpec) -> Self {
        Self { spec }
    }
}

impl FrameworkAdapter for TableAdapter {
    fn spec(&self) -> &FrameworkSpec {
        self.spec
    }
}

static BUILTIN_SPECS: [FrameworkSpec; 1] = [NEOS_FLOW];

pub struct AdapterRegistry {
    adapters: Vec<Box<dyn FrameworkAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for spec in BUILTIN_SPECS.iter() {
            registry.register(Box::new(TableAdapter::new(spec)));
        }
        registry
    }

    pub fn register(&mut self, adapter: Box<dyn FrameworkAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn get(&self, app_type: &str) -> Result<&dyn FrameworkAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == app_type)
            .map(|a| &**a)
            .ok_or_else(|| FlowError::UnknownAppType(app_type.to_string()))
    }

    /// First adapter whose marker is present in the project.
    pub fn detect(&self, project: &ProjectDescriptor) -> Option<&dyn FrameworkAdapter> {
        self.adapters
            .iter()
            .find(|a| a.detect(project))
            .map(|a| &**a)
    }

    /// Adapter for the configured type, falling back to detection when the
    /// project does not name one.
    pub fn for_project(&self, project: &ProjectDescriptor) -> Result<&dyn FrameworkAdapter> {
        if project.app_type.is_empty() {
            self.detect(project)
                .ok_or_else(|| FlowError::UnknownAppType(String::new()))
        } else {
            self.get(&project.app_type)
        }
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Runs the settings steps in order: path resolution, docroot
/// normalization, then provisioning.
pub fn configure(
    adapter: &dyn FrameworkAdapter,
    project: &mut ProjectDescriptor,
    services: &Services<'_>,
    policy: DocrootPolicy,
) -> Result<PathBuf> {
    adapter.settings_path(project);
    adapter.normalize_docroot(project, policy)?;
    let path = adapter.provision(project, services)?;

    info!(app_type = adapter.name(), settings = %path.display(), "project configured");
    Ok(path)
}
