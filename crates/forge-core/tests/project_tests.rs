//! End-to-end tests of project operations against a directory source.

use std::collections::BTreeMap;

use forge_core::{
    DiffStatus, DirectoryBundleSource, Error, ForgeConfig, InitOptions, InstallOptions,
    KeepReason, MergeAction, OwnershipRule, Project, ProjectContext, ProjectManifest,
    ReconcileOptions, RemoveOptions, SkipReason, VersionChange,
};
use forge_fs::compute_content_checksum;
use forge_test_utils::{TestProject, TestRegistry};
use pretty_assertions::assert_eq;
use serde_json::json;

fn open(project: &TestProject, registry: &TestRegistry) -> Project {
    let ctx = ProjectContext::new(project.root());
    let source = DirectoryBundleSource::new(vec![registry.root().to_path_buf()]);
    Project::with_source(ctx, ForgeConfig::default(), Box::new(source))
}

fn manifest(project: &TestProject) -> ProjectManifest {
    ProjectManifest::load(&ProjectContext::new(project.root())).unwrap()
}

fn actions(report: &forge_core::DeployReport) -> BTreeMap<String, MergeAction> {
    report
        .results()
        .map(|r| (r.path.clone(), r.action))
        .collect()
}

const FORCE: ReconcileOptions = ReconcileOptions {
    force: true,
    dry_run: false,
};

#[test]
fn deploy_creates_files_and_records_checksums() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "README.md", "hello");
    registry.add_bundle_file("core", "src/main.rs", "fn main() {}");
    project.init_manifest(&[("core", "1.0.0")]);

    let report = open(&project, &registry)
        .deploy(None, ReconcileOptions::default())
        .unwrap();

    assert_eq!(report.count(MergeAction::Created), 2);
    project.assert_file_contains("src/main.rs", "fn main() {}");

    let manifest = manifest(&project);
    assert_eq!(
        manifest.checksum("README.md"),
        Some(compute_content_checksum("hello").as_str())
    );
    assert_eq!(
        manifest.checksum("src/main.rs"),
        Some(compute_content_checksum("fn main() {}").as_str())
    );
}

#[test]
fn second_deploy_changes_nothing() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "README.md", "hello");
    registry.add_bundle_file("core", "config.json", r#"{"a": 1}"#);
    project.write_manifest(json!({
        "name": "demo",
        "version": "0.1.0",
        "bundles": [{"name": "core", "version": "1.0.0", "ownership": {"*.json": "merge", "README.md": "copy"}}],
        "checksums": {}
    }));
    let forge = open(&project, &registry);

    forge.deploy(None, ReconcileOptions::default()).unwrap();
    let checksums = manifest(&project).checksums;
    let second = forge.deploy(None, ReconcileOptions::default()).unwrap();

    assert!(!second.has_changes());
    assert_eq!(second.count(MergeAction::Skipped), 2);
    assert_eq!(manifest(&project).checksums, checksums);
}

#[test]
fn ownership_priority_decides_each_file() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "src/main.rs", "main");
    registry.add_bundle_file("core", "src/util.rs", "util");
    registry.add_bundle_file("core", "config.json", r#"{"b": 2}"#);
    registry.add_bundle_file("core", "README.md", "bundle readme");
    project.write_file("config.json", r#"{"a": 1}"#);
    project.write_file("README.md", "my readme");
    project.write_manifest(json!({
        "name": "demo",
        "version": "0.1.0",
        "bundles": [{
            "name": "core",
            "version": "1.0.0",
            "ownership": {"src/main.rs": "copy", "src/": "ignore", "*.json": "merge"}
        }],
        "checksums": {}
    }));

    let report = open(&project, &registry)
        .deploy(None, ReconcileOptions::default())
        .unwrap();

    let expected: BTreeMap<String, MergeAction> = [
        ("README.md", MergeAction::Skipped),
        ("config.json", MergeAction::Merged),
        ("src/main.rs", MergeAction::Created),
        ("src/util.rs", MergeAction::Skipped),
    ]
    .into_iter()
    .map(|(p, a)| (p.to_string(), a))
    .collect();
    assert_eq!(actions(&report), expected);

    project.assert_file_not_exists("src/util.rs");
    assert_eq!(project.read_file("README.md"), "my readme");
    let merged: serde_json::Value = serde_json::from_str(&project.read_file("config.json")).unwrap();
    assert_eq!(merged, json!({"a": 1, "b": 2}));

    let checksums = manifest(&project).checksums;
    assert!(checksums.contains_key("src/main.rs"));
    assert!(checksums.contains_key("config.json"));
    assert!(!checksums.contains_key("README.md"));
    assert!(!checksums.contains_key("src/util.rs"));
}

#[test]
fn bundle_changes_reach_unmodified_copy_files() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "src/lib.rs", "v1");
    project.write_manifest(json!({
        "name": "demo",
        "version": "0.1.0",
        "bundles": [{"name": "core", "version": "1.0.0", "ownership": {"src/": "copy"}}]
    }));
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();

    registry.add_bundle_file("core", "src/lib.rs", "v2");
    let report = forge.deploy(None, ReconcileOptions::default()).unwrap();

    assert_eq!(report.count(MergeAction::Updated), 1);
    assert_eq!(project.read_file("src/lib.rs"), "v2");
    assert_eq!(
        manifest(&project).checksum("src/lib.rs"),
        Some(compute_content_checksum("v2").as_str())
    );
}

#[test]
fn local_edits_survive_deploy_until_forced() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "src/lib.rs", "v1");
    project.write_manifest(json!({
        "name": "demo",
        "version": "0.1.0",
        "bundles": [{"name": "core", "version": "1.0.0", "ownership": {"src/": "copy"}}]
    }));
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();

    project.write_file("src/lib.rs", "edited");
    registry.add_bundle_file("core", "src/lib.rs", "v2");

    let report = forge.deploy(None, ReconcileOptions::default()).unwrap();
    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].skip_reason, Some(SkipReason::LocallyModified));
    assert_eq!(project.read_file("src/lib.rs"), "edited");

    let forced = forge.deploy(None, FORCE).unwrap();
    assert_eq!(forced.count(MergeAction::Updated), 1);
    assert_eq!(project.read_file("src/lib.rs"), "v2");
}

#[test]
fn missing_bundle_does_not_stop_the_others() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "a.txt", "a");
    project.init_manifest(&[("ghost", "1.0.0"), ("core", "1.0.0")]);

    let report = open(&project, &registry)
        .deploy(None, ReconcileOptions::default())
        .unwrap();

    assert_eq!(report.missing_bundles().collect::<Vec<_>>(), vec!["ghost"]);
    assert_eq!(report.count(MergeAction::Created), 1);
    project.assert_file_exists("a.txt");
}

#[test]
fn dry_run_writes_nothing() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "a.txt", "a");
    registry.add_bundle_file("core", "cfg.json", r#"{"b": 2}"#);
    project.write_file("cfg.json", r#"{"a": 1}"#);
    project.write_manifest(json!({
        "name": "demo",
        "version": "0.1.0",
        "bundles": [{"name": "core", "version": "1.0.0", "ownership": {"*.json": "merge"}}]
    }));
    let manifest_before = project.read_file(forge_core::MANIFEST_FILE);

    let report = open(&project, &registry)
        .deploy(
            None,
            ReconcileOptions {
                force: false,
                dry_run: true,
            },
        )
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.count(MergeAction::Created), 1);
    assert_eq!(report.count(MergeAction::Merged), 1);
    project.assert_file_not_exists("a.txt");
    assert_eq!(project.read_file("cfg.json"), r#"{"a": 1}"#);
    assert_eq!(project.read_file(forge_core::MANIFEST_FILE), manifest_before);
}

#[test]
fn deploy_of_uninstalled_bundle_is_an_error() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    project.init_manifest(&[]);

    let err = open(&project, &registry)
        .deploy(Some("nope"), ReconcileOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::BundleNotInstalled { .. }));
}

#[test]
fn operations_without_manifest_fail() {
    let project = TestProject::new();
    let registry = TestRegistry::new();

    let err = open(&project, &registry)
        .deploy(None, ReconcileOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::ManifestNotFound { .. }));
    assert!(err.is_configuration());
}

#[test]
fn diff_classifies_every_path() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "README.md", "readme");
    registry.add_bundle_file("core", "src/main.rs", "main");
    registry.add_bundle_file("core", "old.txt", "old");
    project.init_manifest(&[("core", "1.0.0")]);
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();

    project.write_file("src/main.rs", "edited");
    registry.remove_bundle_file("core", "old.txt");
    registry.add_bundle_file("core", "new.txt", "new");

    let report = forge.diff(None).unwrap();
    assert_eq!(report.bundles.len(), 1);
    let statuses: BTreeMap<_, _> = report.bundles[0]
        .results
        .iter()
        .map(|r| (r.path.as_str(), r.status))
        .collect();

    assert_eq!(
        statuses,
        BTreeMap::from([
            ("README.md", DiffStatus::Unchanged),
            ("new.txt", DiffStatus::Added),
            ("old.txt", DiffStatus::Deleted),
            ("src/main.rs", DiffStatus::Modified),
        ])
    );
}

#[test]
fn diff_does_not_report_other_bundles_files_as_deleted() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("alpha", "alpha.txt", "a");
    registry.add_bundle_file("beta", "beta.txt", "b");
    project.init_manifest(&[("alpha", "1.0.0"), ("beta", "1.0.0")]);
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();

    let report = forge.diff(None).unwrap();

    assert_eq!(report.bundles.len(), 2);
    for bundle in &report.bundles {
        assert!(!bundle.has_changes(), "unexpected changes in {}", bundle.bundle);
    }
}

#[test]
fn diff_of_missing_bundle_is_empty_and_unavailable() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    project.init_manifest(&[("ghost", "1.0.0")]);

    let report = open(&project, &registry).diff(Some("ghost")).unwrap();

    assert!(!report.bundles[0].available);
    assert!(report.bundles[0].results.is_empty());
}

#[test]
fn diff_never_writes() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "a.txt", "a");
    project.init_manifest(&[("core", "1.0.0")]);
    let before = project.read_file(forge_core::MANIFEST_FILE);

    let report = open(&project, &registry).diff(None).unwrap();

    assert_eq!(report.bundles[0].count(DiffStatus::Added), 1);
    project.assert_file_not_exists("a.txt");
    assert_eq!(project.read_file(forge_core::MANIFEST_FILE), before);
}

#[test]
fn line_diff_renders_unified_diff() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "notes.txt", "one\ntwo\n");
    project.write_file("notes.txt", "one\nthree\n");
    project.init_manifest(&[("core", "1.0.0")]);

    let rendered = open(&project, &registry)
        .line_diff("core", "notes.txt")
        .unwrap()
        .unwrap();

    assert!(rendered.contains("--- local/notes.txt"));
    assert!(rendered.contains("+++ bundle/notes.txt"));
    assert!(rendered.contains("-three"));
    assert!(rendered.contains("+two"));
}

#[test]
fn install_adds_bundle_with_descriptor_defaults_and_overrides() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "README.md", "readme");
    registry.add_bundle_file("core", "src/lib.rs", "lib");
    registry.add_descriptor(
        "core",
        json!({"version": "2.0.0", "ownership": {"src/": "copy", "README.md": "copy"}}),
    );
    project.init_manifest(&[]);

    let report = open(&project, &registry)
        .install(
            "core",
            InstallOptions {
                ownership: BTreeMap::from([("README.md".to_string(), OwnershipRule::Ignore)]),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(report.count(MergeAction::Created), 1);
    project.assert_file_exists("src/lib.rs");
    project.assert_file_not_exists("README.md");
    project.assert_file_not_exists("bundle.json");

    let manifest = manifest(&project);
    let bundle = manifest.bundle("core").unwrap();
    assert_eq!(bundle.version, "2.0.0");
    assert_eq!(bundle.ownership.get("src/"), Some(&OwnershipRule::Copy));
    assert_eq!(bundle.ownership.get("README.md"), Some(&OwnershipRule::Ignore));
}

#[test]
fn install_rejects_duplicates_and_unknown_bundles() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "a.txt", "a");
    project.init_manifest(&[("core", "1.0.0")]);
    let forge = open(&project, &registry);

    let duplicate = forge.install("core", InstallOptions::default()).unwrap_err();
    assert!(matches!(duplicate, Error::BundleAlreadyInstalled { .. }));

    let unknown = forge.install("missing", InstallOptions::default()).unwrap_err();
    assert!(matches!(unknown, Error::BundleNotFound { .. }));

    let forced = forge
        .install(
            "core",
            InstallOptions {
                force: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(forced.count(MergeAction::Created), 1);
    assert_eq!(manifest(&project).bundles.len(), 1);
}

#[test]
fn update_refreshes_versions_and_redeploys() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "a.txt", "a");
    registry.add_descriptor("core", json!({"version": "1.1.0"}));
    project.init_manifest(&[("core", "1.0.0")]);

    let report = open(&project, &registry)
        .update(None, ReconcileOptions::default())
        .unwrap();

    assert_eq!(
        report.versions,
        vec![VersionChange {
            bundle: "core".into(),
            from: "1.0.0".into(),
            to: "1.1.0".into(),
        }]
    );
    assert_eq!(report.deploy.count(MergeAction::Created), 1);
    assert_eq!(manifest(&project).bundle("core").unwrap().version, "1.1.0");
}

#[test]
fn remove_cleans_only_unmodified_files() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "docs/a.txt", "a");
    registry.add_bundle_file("core", "b.txt", "b");
    project.init_manifest(&[("core", "1.0.0")]);
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();
    project.write_file("b.txt", "edited");

    let report = forge
        .remove(
            "core",
            RemoveOptions {
                clean_files: true,
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(report.removed, vec!["docs/a.txt".to_string()]);
    assert_eq!(
        report.kept,
        vec![("b.txt".to_string(), KeepReason::LocallyModified)]
    );
    project.assert_file_not_exists("docs/a.txt");
    project.assert_file_not_exists("docs");
    project.assert_file_exists("b.txt");

    let manifest = manifest(&project);
    assert!(manifest.bundle("core").is_none());
    assert!(manifest.checksum("docs/a.txt").is_none());
}

#[test]
fn remove_keeps_files_shared_with_other_bundles() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("alpha", "shared.txt", "s");
    registry.add_bundle_file("beta", "shared.txt", "s");
    project.init_manifest(&[("alpha", "1.0.0"), ("beta", "1.0.0")]);
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();

    let report = forge
        .remove(
            "alpha",
            RemoveOptions {
                clean_files: true,
                force: true,
                ..Default::default()
            },
        )
        .unwrap();

    assert!(report.removed.is_empty());
    assert_eq!(
        report.kept,
        vec![("shared.txt".to_string(), KeepReason::SharedWithBundle)]
    );
    project.assert_file_exists("shared.txt");
}

#[test]
fn remove_dry_run_changes_nothing() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "a.txt", "a");
    project.init_manifest(&[("core", "1.0.0")]);
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();
    let before = project.read_file(forge_core::MANIFEST_FILE);

    let report = forge
        .remove(
            "core",
            RemoveOptions {
                clean_files: true,
                dry_run: true,
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(report.removed, vec!["a.txt".to_string()]);
    project.assert_file_exists("a.txt");
    assert_eq!(project.read_file(forge_core::MANIFEST_FILE), before);
}

#[test]
fn init_writes_manifest_and_starter_files() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_starter_file("web", "index.html", "<html></html>");
    registry.add_starter_file("web", "README.md", "starter readme");
    project.write_file("README.md", "mine");
    let forge = open(&project, &registry);

    let report = forge
        .init(InitOptions {
            name: Some("site".into()),
            starter: Some("web".into()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(report.created, vec!["index.html".to_string()]);
    assert_eq!(report.skipped, vec!["README.md".to_string()]);
    assert_eq!(project.read_file("README.md"), "mine");

    let manifest = manifest(&project);
    assert_eq!(manifest.name, "site");
    assert_eq!(manifest.version, "0.1.0");
    assert_eq!(manifest.environment, "development");
    assert_eq!(manifest.starter.as_deref(), Some("web"));

    let again = forge.init(InitOptions::default()).unwrap_err();
    assert!(matches!(again, Error::ManifestExists { .. }));

    forge
        .init(InitOptions {
            force: true,
            ..Default::default()
        })
        .unwrap();
    assert!(manifest_json_has_no_starter(&project));
}

#[test]
fn init_with_unknown_starter_writes_nothing() {
    let project = TestProject::new();
    let registry = TestRegistry::new();

    let err = open(&project, &registry)
        .init(InitOptions {
            starter: Some("nope".into()),
            ..Default::default()
        })
        .unwrap_err();

    assert!(matches!(err, Error::StarterNotFound { .. }));
    project.assert_file_not_exists(forge_core::MANIFEST_FILE);
}

fn manifest_json_has_no_starter(project: &TestProject) -> bool {
    project.manifest_json().get("starter").is_none()
}

#[test]
fn hand_synced_copy_file_converges() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "src/lib.rs", "v1");
    project.write_manifest(json!({
        "name": "demo",
        "version": "0.1.0",
        "bundles": [{"name": "core", "version": "1.0.0", "ownership": {"src/": "copy"}}]
    }));
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();

    registry.add_bundle_file("core", "src/lib.rs", "v2");
    project.write_file("src/lib.rs", "v2");

    let first = forge.deploy(None, ReconcileOptions::default()).unwrap();
    assert_eq!(first.warnings().count(), 0);
    assert_eq!(
        first.results().next().unwrap().skip_reason,
        Some(SkipReason::UpToDate)
    );
    assert_eq!(
        manifest(&project).checksum("src/lib.rs"),
        Some(compute_content_checksum("v2").as_str())
    );

    registry.add_bundle_file("core", "src/lib.rs", "v3");
    let second = forge.deploy(None, ReconcileOptions::default()).unwrap();
    assert_eq!(second.count(MergeAction::Updated), 1);
    assert_eq!(project.read_file("src/lib.rs"), "v3");
}

#[test]
fn update_reports_unreadable_descriptor() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "a.txt", "a");
    std::fs::write(registry.bundle_dir("core").join("bundle.json"), "{not json").unwrap();
    project.init_manifest(&[("core", "1.0.0")]);

    let report = open(&project, &registry)
        .update(None, ReconcileOptions::default())
        .unwrap();

    assert!(report.versions.is_empty());
    assert_eq!(report.unreadable.len(), 1);
    assert_eq!(report.unreadable[0].0, "core");
    assert_eq!(report.deploy.count(MergeAction::Created), 1);
}

#[test]
fn remove_of_unlocatable_bundle_reports_it() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("core", "a.txt", "a");
    project.init_manifest(&[("core", "1.0.0")]);
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();
    std::fs::remove_dir_all(registry.bundle_dir("core")).unwrap();

    let report = forge
        .remove(
            "core",
            RemoveOptions {
                clean_files: true,
                ..Default::default()
            },
        )
        .unwrap();

    assert!(!report.available);
    assert!(report.removed.is_empty());
    project.assert_file_exists("a.txt");
    assert!(manifest(&project).bundle("core").is_none());
}

#[test]
fn stale_checksum_key_is_reported_once() {
    let project = TestProject::new();
    let registry = TestRegistry::new();
    registry.add_bundle_file("alpha", "a.txt", "a");
    registry.add_bundle_file("beta", "b.txt", "b");
    project.init_manifest(&[("alpha", "1.0.0"), ("beta", "1.0.0")]);
    let forge = open(&project, &registry);
    forge.deploy(None, ReconcileOptions::default()).unwrap();

    let mut stale = manifest(&project);
    stale.record_checksum("legacy.txt".to_string(), compute_content_checksum("old"));
    stale.save(&ProjectContext::new(project.root())).unwrap();
    project.write_file("legacy.txt", "old");

    let report = forge.diff(None).unwrap();

    let deleted: Vec<(&str, &str)> = report
        .bundles
        .iter()
        .flat_map(|b| {
            b.results
                .iter()
                .filter(|r| r.status == DiffStatus::Deleted)
                .map(move |r| (b.bundle.as_str(), r.path.as_str()))
        })
        .collect();
    assert_eq!(deleted, vec![("alpha", "legacy.txt")]);

    let beta_only = forge.diff(Some("beta")).unwrap();
    assert_eq!(beta_only.bundles[0].count(DiffStatus::Deleted), 1);
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::{self, Permissions};
    use std::os::unix::fs::PermissionsExt;

    fn is_root() -> bool {
        match std::process::Command::new("id").arg("-u").output() {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }

    #[test]
    fn remove_continues_past_undeletable_file() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let project = TestProject::new();
        let registry = TestRegistry::new();
        registry.add_bundle_file("core", "a.txt", "a");
        registry.add_bundle_file("core", "z/b.txt", "b");
        project.init_manifest(&[("core", "1.0.0")]);
        let forge = open(&project, &registry);
        forge.deploy(None, ReconcileOptions::default()).unwrap();

        let locked = project.path("z");
        fs::set_permissions(&locked, Permissions::from_mode(0o555)).unwrap();
        let result = forge.remove(
            "core",
            RemoveOptions {
                clean_files: true,
                ..Default::default()
            },
        );
        let _ = fs::set_permissions(&locked, Permissions::from_mode(0o755));

        let report = result.unwrap();
        assert_eq!(report.removed, vec!["a.txt".to_string()]);
        assert_eq!(report.kept.len(), 1);
        assert_eq!(report.kept[0].0, "z/b.txt");
        assert!(matches!(report.kept[0].1, KeepReason::Failed { .. }));
        project.assert_file_exists("z/b.txt");

        let manifest = manifest(&project);
        assert!(manifest.bundle("core").is_none());
        assert!(manifest.checksum("a.txt").is_none());
        assert!(manifest.checksum("z/b.txt").is_some());
    }
}
