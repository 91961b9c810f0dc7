use super::FrameworkSpec;
use crate::templates::NEOS_FLOW_SETTINGS_TEMPLATE;

pub const NEOS_FLOW: FrameworkSpec = FrameworkSpec {
    app_type: "neos-flow",
    display_name: "Neos Flow",
    marker: "flow",
    settings_dir: &["Configuration", "Development", "Ddev"],
    settings_file: "Settings.ddev.yaml",
    template: NEOS_FLOW_SETTINGS_TEMPLATE,
    db_hostname: "db",
    default_docroot: "Web",
    upload_dirs: &["../Data/Persistent"],
    web_environment: &[
        "FLOW_CONTEXT=Development/Ddev",
        "FLOW_PATH_TEMPORARY_BASE=/tmp/Flow",
        "FLOW_REWRITEURLS=1",
    ],
};
