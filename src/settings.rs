use crate::adapter::FrameworkSpec;
use crate::error::{FlowError, Result};
use crate::fileutil::{clean_path, ensure_writable_dir, fgrep_string_in_file, file_exists};
use crate::project::{DatabaseType, ProjectDescriptor};
use crate::services::Services;
use crate::templates::SettingsContext;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Marker written into every generated file. Files without it belong to the user.
pub const MANAGED_FILE_SIGNATURE: &str = "#ddev-generated";

pub const DB_SERVICE: &str = "db";

pub fn is_framework_app(spec: &FrameworkSpec, project: &ProjectDescriptor) -> bool {
    file_exists(&project.composer_root_path().join(spec.marker))
}

pub fn resolve_settings_path(spec: &FrameworkSpec, project: &mut ProjectDescriptor) {
    let base = project.composer_root_path();

    project.site_settings_file = if is_framework_app(spec, project) {
        spec.settings_dir
            .iter()
            .fold(base, |path, part| path.join(part))
            .join(spec.settings_file)
    } else {
        // Until the framework is installed, stay at the composer root so
        // ignore files are not generated inside a tree that doesn't exist yet.
        base.join(spec.settings_file)
    };

    debug!(path = %project.site_settings_file.display(), "resolved settings path");
}

pub fn database_driver(db_type: DatabaseType) -> &'static str {
    match db_type {
        DatabaseType::Postgres => "pdo_pgsql",
        DatabaseType::MySql | DatabaseType::MariaDb => "mysqli",
    }
}

/// Writes the database settings file unless it belongs to the user.
///
/// Returns the settings path whether or not a file was written.
pub fn provision_settings(
    spec: &FrameworkSpec,
    project: &ProjectDescriptor,
    services: &Services<'_>,
) -> Result<PathBuf> {
    let settings_file = project.site_settings_file.clone();

    let app_root = clean_path(&project.app_root);
    if settings_file.parent().map(clean_path) == Some(app_root) {
        debug!("settings location not final yet, skipping");
        return Ok(settings_file);
    }

    if !is_framework_app(spec, project) {
        services.warnings.warn(&format!(
            "{} does not seem to have been set up yet, missing {}",
            spec.display_name, spec.marker
        ));
    }

    let file_name = display_name(&settings_file);

    if file_exists(&settings_file) {
        let managed = fgrep_string_in_file(&settings_file, MANAGED_FILE_SIGNATURE).map_err(
            |source| FlowError::SignatureCheck {
                path: settings_file.clone(),
                source,
            },
        )?;

        if !managed {
            services
                .warnings
                .warn(&format!("{} already exists and is managed by the user.", file_name));
            return Ok(settings_file);
        }
    }

    info!("Generating {} file for database connection.", file_name);
    write_settings_file(spec, project, services, &settings_file)?;

    Ok(settings_file)
}

fn write_settings_file(
    spec: &FrameworkSpec,
    project: &ProjectDescriptor,
    services: &Services<'_>,
    settings_file: &Path,
) -> Result<()> {
    let context = SettingsContext {
        db_hostname: spec.db_hostname.to_string(),
        db_driver: database_driver(project.database.db_type).to_string(),
        db_port: services.ports.exposed_port(project, DB_SERVICE)?,
    };

    if let Some(dir) = settings_file.parent() {
        ensure_writable_dir(dir)?;
    }

    let content = services.templates.render(spec.template, &context)?;
    fs::write(settings_file, content).map_err(|e| FlowError::io("write", settings_file, e))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
