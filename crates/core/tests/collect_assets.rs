use satchel_api::ResolvedModule;
use satchel_core::fs::TokioFileSystem;
use satchel_core::{AssetCollector, CollectorConfig, InMemoryAssetRegistry, SymlinkPolicy};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn module(root: &Path, relative: &str) -> ResolvedModule {
    ResolvedModule::new(root.join(relative))
}

fn collector(config: CollectorConfig) -> AssetCollector {
    AssetCollector::new(Arc::new(TokioFileSystem::new()), config)
}

#[tokio::test]
async fn test_sibling_directory_is_copied_under_namespace() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "app/my-app.ext", b"module");
    write(root, "app/my-app/my-app.core.ext", b"core file");
    write(root, "app/my-app/styles/button.ext", b"button styles");

    let registry = InMemoryAssetRegistry::new();
    let report = collector(CollectorConfig::default())
        .emit(&[module(root, "app/my-app.ext")], &registry)
        .await
        .unwrap();

    assert_eq!(report.assets_emitted, 2);
    assert_eq!(
        registry.paths(),
        vec!["my-app/my-app.core.ext", "my-app/styles/button.ext"]
    );

    let core = registry.get("my-app/my-app.core.ext").unwrap();
    assert_eq!(core.source(), b"core file");
    assert_eq!(core.size(), 9);
    let button = registry.get("my-app/styles/button.ext").unwrap();
    assert_eq!(button.source(), b"button styles");
    assert_eq!(button.size(), 13);
}

#[tokio::test]
async fn test_directory_without_core_file_adds_nothing() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "app/my-app.ext", b"module");
    write(root, "app/my-app/unrelated.ext", b"x");

    let registry = InMemoryAssetRegistry::new();
    let report = collector(CollectorConfig::default())
        .emit(&[module(root, "app/my-app.ext")], &registry)
        .await
        .unwrap();

    assert!(registry.is_empty());
    assert_eq!(report.modules_skipped, 1);
}

#[tokio::test]
async fn test_module_without_sibling_directory_adds_nothing() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "lib/plain.ext", b"module");

    let registry = InMemoryAssetRegistry::new();
    let report = collector(CollectorConfig::default())
        .emit(&[module(root, "lib/plain.ext")], &registry)
        .await
        .unwrap();

    assert!(registry.is_empty());
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_output_base_is_prefixed() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/widget/widget.css", b"w");

    let registry = InMemoryAssetRegistry::new();
    collector(CollectorConfig::default().with_output_base("build"))
        .emit(&[module(root, "src/widget.ts")], &registry)
        .await
        .unwrap();

    assert_eq!(registry.paths(), vec!["build/widget/widget.css"]);
}

#[tokio::test]
async fn test_namespace_collision_keeps_one_entry() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "a/shared/shared.txt", b"from a");
    write(root, "b/shared/shared.txt", b"from b");

    let registry = InMemoryAssetRegistry::new();
    let report = collector(CollectorConfig::default())
        .emit(
            &[module(root, "a/shared.js"), module(root, "b/shared.js")],
            &registry,
        )
        .await
        .unwrap();

    assert_eq!(report.modules_copied, 2);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("shared/shared.txt"));
}

#[tokio::test]
async fn test_repeated_emits_are_identical() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "app/one/one.txt", b"1");
    write(root, "app/one/deep/er/file.bin", &[0, 1, 2, 3, 255]);
    write(root, "app/two/two-core.txt", b"2");
    write(root, "app/two/img/logo.svg", b"<svg/>");
    let modules = [module(root, "app/one.js"), module(root, "app/two.js")];
    let collector = collector(CollectorConfig::default());

    let first = InMemoryAssetRegistry::new();
    let second = InMemoryAssetRegistry::new();
    collector.emit(&modules, &first).await.unwrap();
    collector.emit(&modules, &second).await.unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(first.snapshot(), second.snapshot());
}

#[tokio::test]
async fn test_every_nested_file_is_emitted_once() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "pkg/tree/tree.js", b"core");
    let mut expected = vec!["tree/tree.js".to_string()];
    for a in 0..3 {
        for b in 0..3 {
            let relative = format!("l{a}/m{b}/leaf-{a}-{b}.txt");
            write(root, &format!("pkg/tree/{relative}"), relative.as_bytes());
            expected.push(format!("tree/{relative}"));
        }
    }
    expected.sort();

    let registry = InMemoryAssetRegistry::new();
    let report = collector(CollectorConfig::default().with_max_in_flight(2))
        .emit(&[module(root, "pkg/tree.js")], &registry)
        .await
        .unwrap();

    assert_eq!(report.assets_emitted, expected.len());
    assert_eq!(registry.paths(), expected);
    assert_eq!(
        registry.get("tree/l1/m2/leaf-1-2.txt").unwrap().source(),
        b"l1/m2/leaf-1-2.txt"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_files_follow_policy() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "shared/logo.svg", b"<svg/>");
    write(root, "app/brand/brand.css", b"css");
    std::os::unix::fs::symlink(root.join("shared/logo.svg"), root.join("app/brand/logo.svg"))
        .unwrap();

    let followed = InMemoryAssetRegistry::new();
    collector(CollectorConfig::default())
        .emit(&[module(root, "app/brand.js")], &followed)
        .await
        .unwrap();
    assert_eq!(followed.get("brand/logo.svg").unwrap().source(), b"<svg/>");

    let skipped = InMemoryAssetRegistry::new();
    collector(CollectorConfig::default().with_symlinks(SymlinkPolicy::Skip))
        .emit(&[module(root, "app/brand.js")], &skipped)
        .await
        .unwrap();
    assert_eq!(skipped.paths(), vec!["brand/brand.css"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_symlink_fails_emit_but_copies_siblings() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "app/brand/brand.css", b"css");
    std::os::unix::fs::symlink(root.join("missing.svg"), root.join("app/brand/gone.svg")).unwrap();

    let registry = InMemoryAssetRegistry::new();
    let err = collector(CollectorConfig::default())
        .emit(&[module(root, "app/brand.js")], &registry)
        .await
        .unwrap_err();

    assert!(matches!(err, satchel_core::CollectError::Incomplete { .. }));
    assert_eq!(registry.paths(), vec!["brand/brand.css"]);
}

#[tokio::test]
async fn test_output_base_parent_segments_are_folded() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "app/ns/ns.txt", b"a");

    let registry = InMemoryAssetRegistry::new();
    collector(CollectorConfig::default().with_output_base("build/../dist"))
        .emit(&[module(root, "app/ns.js")], &registry)
        .await
        .unwrap();

    assert_eq!(registry.paths(), vec!["dist/ns/ns.txt"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_self_links_do_not_recurse() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "app/ns/ns.js", b"core");
    write(root, "app/ns/img/logo.svg", b"<svg/>");
    std::os::unix::fs::symlink(".", root.join("app/ns/a")).unwrap();
    std::os::unix::fs::symlink(".", root.join("app/ns/b")).unwrap();

    let registry = InMemoryAssetRegistry::new();
    let report = collector(CollectorConfig::default())
        .emit(&[module(root, "app/ns.js")], &registry)
        .await
        .unwrap();

    assert_eq!(report.symlink_cycles, 2);
    assert_eq!(report.assets_emitted, 2);
    assert_eq!(registry.paths(), vec!["ns/img/logo.svg", "ns/ns.js"]);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_non_utf8_file_names_are_emitted() {
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "app/ns/ns.js", b"core");
    let name = std::ffi::OsStr::from_bytes(b"logo\xff.svg");
    std::fs::write(root.join("app/ns").join(name), b"<svg/>").unwrap();

    let registry = InMemoryAssetRegistry::new();
    let report = collector(CollectorConfig::default())
        .emit(&[module(root, "app/ns.js")], &registry)
        .await
        .unwrap();

    assert_eq!(report.assets_emitted, 2);
    assert_eq!(registry.paths(), vec!["ns/logo\u{FFFD}.svg", "ns/ns.js"]);
    assert_eq!(registry.get("ns/logo\u{FFFD}.svg").unwrap().source(), b"<svg/>");
}

#[cfg(unix)]
#[tokio::test]
async fn test_socket_entries_are_skipped() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "app/ns/ns.js", b"core");
    write(root, "app/ns/css/site.css", b"body {}");
    let _listener = std::os::unix::net::UnixListener::bind(root.join("app/ns/ctl.sock")).unwrap();

    let registry = InMemoryAssetRegistry::new();
    let report = collector(CollectorConfig::default())
        .emit(&[module(root, "app/ns.js")], &registry)
        .await
        .unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(registry.paths(), vec!["ns/css/site.css", "ns/ns.js"]);
}
