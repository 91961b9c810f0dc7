use super::TestUtils;
use crate::adapter::AdapterRegistry;
use crate::config::DocrootPolicy;
use crate::error::FlowError;
use crate::project::DatabaseType;
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn test_import_leaves_exactly_the_source_contents() {
    let (temp, mut project) = TestUtils::create_flow_project(DatabaseType::MariaDb);
    let registry = AdapterRegistry::builtin();
    let adapter = registry.get("neos-flow").unwrap();
    adapter
        .normalize_docroot(&mut project, DocrootPolicy::AssignOnly)
        .unwrap();

    let dest = temp.path().join("Data/Persistent");
    TestUtils::write_tree(&dest, &[("Resources/old/1.jpg", "old"), ("leftover.txt", "x")]);

    let source = temp.path().join("backup");
    TestUtils::write_tree(
        &source,
        &[("Resources/a/1.jpg", "one"), ("Resources/b/2.jpg", "two")],
    );

    let upload_dir = project.default_upload_dir().unwrap().to_string();
    adapter
        .import_files(&project, &upload_dir, &source, "")
        .unwrap();

    assert_eq!(TestUtils::snapshot(&dest), TestUtils::snapshot(&source));
}

#[test]
fn test_zip_import_of_uploads_entry() {
    let (temp, mut project) = TestUtils::create_flow_project(DatabaseType::MariaDb);
    let registry = AdapterRegistry::builtin();
    let adapter = registry.get("neos-flow").unwrap();
    adapter
        .normalize_docroot(&mut project, DocrootPolicy::AssignOnly)
        .unwrap();
    fs::create_dir_all(temp.path().join("Data")).unwrap();

    let archive = temp.path().join("files.zip");
    TestUtils::write_zip(
        &archive,
        &[
            ("uploads/Resources/1.jpg", "one"),
            ("uploads/2.jpg", "two"),
            ("database.sql", "ignored"),
        ],
    );

    adapter
        .import_files(&project, "../Data/Persistent", &archive, "uploads")
        .unwrap();

    assert_eq!(
        TestUtils::snapshot(&temp.path().join("Data/Persistent")),
        vec![
            ("2.jpg".to_string(), "two".to_string()),
            ("Resources/1.jpg".to_string(), "one".to_string()),
        ]
    );
}

#[test]
fn test_tar_import_without_extract_path() {
    let (temp, mut project) = TestUtils::create_flow_project(DatabaseType::MariaDb);
    let registry = AdapterRegistry::builtin();
    let adapter = registry.get("neos-flow").unwrap();
    fs::create_dir_all(temp.path().join("Web/files")).unwrap();

    let archive = temp.path().join("files.tar");
    TestUtils::write_tar(&archive, &[("a.txt", "a"), ("sub/b.txt", "b")]);

    project.docroot = "Web".to_string();
    adapter
        .import_files(&project, "files/uploads", &archive, "")
        .unwrap();

    assert_eq!(
        TestUtils::snapshot(&temp.path().join("Web/files/uploads")),
        vec![
            ("a.txt".to_string(), "a".to_string()),
            ("sub/b.txt".to_string(), "b".to_string()),
        ]
    );
}

#[test]
fn test_absent_parent_creates_nothing() {
    let (temp, mut project) = TestUtils::create_flow_project(DatabaseType::MariaDb);
    let registry = AdapterRegistry::builtin();
    let adapter = registry.get("neos-flow").unwrap();
    adapter
        .normalize_docroot(&mut project, DocrootPolicy::AssignOnly)
        .unwrap();

    let source = temp.path().join("backup");
    TestUtils::write_tree(&source, &[("a.txt", "a")]);

    let err = adapter
        .import_files(&project, "../Data/Persistent", &source, "")
        .unwrap_err();

    assert!(matches!(err, FlowError::Precondition { .. }));
    assert!(!temp.path().join("Data").exists());
}

#[test]
fn test_tar_import_of_nested_extract_path() {
    let (temp, mut project) = TestUtils::create_flow_project(DatabaseType::MariaDb);
    let registry = AdapterRegistry::builtin();
    let adapter = registry.get("neos-flow").unwrap();
    adapter
        .normalize_docroot(&mut project, DocrootPolicy::AssignOnly)
        .unwrap();
    TestUtils::write_tree(
        &temp.path().join("Data/Persistent"),
        &[("stale.txt", "old")],
    );

    let archive = temp.path().join("backup.tar");
    TestUtils::write_tar(
        &archive,
        &[
            ("backup/Data/Persistent/Resources/1.jpg", "one"),
            ("backup/Data/Persistent/2.jpg", "two"),
            ("backup/dump.sql", "ignored"),
        ],
    );

    adapter
        .import_files(&project, "../Data/Persistent", &archive, "backup/Data/Persistent")
        .unwrap();

    assert_eq!(
        TestUtils::snapshot(&temp.path().join("Data/Persistent")),
        vec![
            ("2.jpg".to_string(), "two".to_string()),
            ("Resources/1.jpg".to_string(), "one".to_string()),
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_tar_import_cannot_write_through_symlink_entries() {
    let (temp, mut project) = TestUtils::create_flow_project(DatabaseType::MariaDb);
    let registry = AdapterRegistry::builtin();
    let adapter = registry.get("neos-flow").unwrap();
    adapter
        .normalize_docroot(&mut project, DocrootPolicy::AssignOnly)
        .unwrap();
    fs::create_dir_all(temp.path().join("Data")).unwrap();
    let outside = temp.path().join("outside");
    fs::create_dir_all(&outside).unwrap();

    let archive = temp.path().join("files.tar");
    let mut builder = tar::Builder::new(fs::File::create(&archive).unwrap());
    let mut link = tar::Header::new_gnu();
    link.set_entry_type(tar::EntryType::Symlink);
    link.set_size(0);
    link.set_mode(0o777);
    builder
        .append_link(&mut link, "uploads/link", &outside)
        .unwrap();
    let mut file = tar::Header::new_gnu();
    file.set_size(5);
    file.set_mode(0o644);
    builder
        .append_data(&mut file, "uploads/link/pwned.txt", "pwned".as_bytes())
        .unwrap();
    builder.finish().unwrap();
    drop(builder);

    adapter
        .import_files(&project, "../Data/Persistent", &archive, "uploads")
        .unwrap();

    assert!(!outside.join("pwned.txt").exists());
    assert_eq!(
        TestUtils::snapshot(&temp.path().join("Data/Persistent")),
        vec![("link/pwned.txt".to_string(), "pwned".to_string())]
    );
}
