use crate::project::{DatabaseType, ProjectDescriptor};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

mod import;

// Test utilities and helpers
pub(crate) struct TestUtils;

impl TestUtils {
    /// A project directory with the `flow` marker and a `Web` docroot.
    pub fn create_flow_project(db_type: DatabaseType) -> (TempDir, ProjectDescriptor) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("flow"), "#!/usr/bin/env php\n").unwrap();
        fs::create_dir_all(temp.path().join("Web")).unwrap();

        let mut project = ProjectDescriptor::new(temp.path(), "neos-flow");
        project.database.db_type = db_type;
        (temp, project)
    }

    pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            let path = root.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(fs::File::create(path).unwrap());
        let options = zip::write::FileOptions::default();
        for (name, content) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    pub fn write_tar(path: &Path, files: &[(&str, &str)]) {
        let mut builder = tar::Builder::new(fs::File::create(path).unwrap());
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.finish().unwrap();
    }

    /// Relative paths and contents of every file under `root`, sorted.
    pub fn snapshot(root: &Path) -> Vec<(String, String)> {
        let mut files: Vec<(String, String)> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let relative = e
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned();
                (relative, fs::read_to_string(e.path()).unwrap())
            })
            .collect();
        files.sort();
        files
    }
}
