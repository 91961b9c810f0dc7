use crate::adapter::FrameworkSpec;
use crate::config::DocrootPolicy;
use crate::error::{FlowError, Result};
use crate::fileutil::{set_mode, DIR_MODE};
use crate::project::ProjectDescriptor;
use std::fs;
use tracing::debug;

/// Fills in the framework's docroot, upload directory and web environment.
///
/// Entries already present are not appended twice, so repeated runs on a
/// saved project config leave it stable.
pub fn normalize_docroot(
    spec: &FrameworkSpec,
    project: &mut ProjectDescriptor,
    policy: DocrootPolicy,
) -> Result<()> {
    if project.docroot.is_empty() {
        project.docroot = spec.default_docroot.to_string();
        debug!(docroot = %project.docroot, "using default docroot");

        if policy == DocrootPolicy::Create {
            let dir = project.composer_root_path().join(spec.default_docroot);
            fs::create_dir_all(&dir).map_err(|e| FlowError::io("create directory", &dir, e))?;
            set_mode(&dir, DIR_MODE).map_err(|source| FlowError::Permission {
                path: dir.clone(),
                source,
            })?;
        }
    }

    append_missing(&mut project.upload_dirs, spec.upload_dirs);
    append_missing(&mut project.web_environment, spec.web_environment);

    Ok(())
}

fn append_missing(target: &mut Vec<String>, entries: &[&str]) {
    for entry in entries {
        if !target.iter().any(|existing| existing.as_str() == *entry) {
            target.push(entry.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::NEOS_FLOW;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_empty_docroot_gets_default() {
        let temp = tempdir().unwrap();
        let mut project = ProjectDescriptor::new(temp.path(), "neos-flow");

        normalize_docroot(&NEOS_FLOW, &mut project, DocrootPolicy::AssignOnly).unwrap();

        assert_eq!(project.docroot, "Web");
        assert_eq!(project.upload_dirs, vec!["../Data/Persistent".to_string()]);
        assert_eq!(
            project.web_environment,
            vec![
                "FLOW_CONTEXT=Development/Ddev".to_string(),
                "FLOW_PATH_TEMPORARY_BASE=/tmp/Flow".to_string(),
                "FLOW_REWRITEURLS=1".to_string(),
            ]
        );
        assert!(!temp.path().join("Web").exists());
    }

    #[test]
    fn test_create_policy_makes_docroot_dir() {
        let temp = tempdir().unwrap();
        let mut project = ProjectDescriptor::new(temp.path(), "neos-flow");

        normalize_docroot(&NEOS_FLOW, &mut project, DocrootPolicy::Create).unwrap();

        assert!(temp.path().join("Web").is_dir());
    }

    #[test]
    fn test_custom_docroot_is_kept_and_entries_appended() {
        let temp = tempdir().unwrap();
        let mut project = ProjectDescriptor::new(temp.path(), "neos-flow");
        project.docroot = "public".to_string();
        project.upload_dirs.push("uploads".to_string());

        normalize_docroot(&NEOS_FLOW, &mut project, DocrootPolicy::Create).unwrap();

        assert_eq!(project.docroot, "public");
        assert!(!temp.path().join("Web").exists());
        assert_eq!(
            project.upload_dirs,
            vec!["uploads".to_string(), "../Data/Persistent".to_string()]
        );
        assert_eq!(project.web_environment.len(), 3);
    }

    #[test]
    fn test_repeated_normalization_is_stable() {
        let temp = tempdir().unwrap();
        let mut project = ProjectDescriptor::new(temp.path(), "neos-flow");

        normalize_docroot(&NEOS_FLOW, &mut project, DocrootPolicy::AssignOnly).unwrap();
        let once = project.clone();
        normalize_docroot(&NEOS_FLOW, &mut project, DocrootPolicy::AssignOnly).unwrap();

        assert_eq!(project, once);
    }
}
