use forge_fs::NormalizedPath;
use proptest::prelude::*;
use std::path::Path;

#[test]
fn test_normalize_forward_slashes() {
    let path = NormalizedPath::new("foo/bar/baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("foo\\bar\\baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[test]
fn test_normalize_drops_dot_and_empty_segments() {
    let path = NormalizedPath::new("./foo//bar/./baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[test]
fn test_relative_strips_base() {
    let rel = NormalizedPath::relative(Path::new("/bundles/core/src/lib.rs"), Path::new("/bundles/core"))
        .unwrap();
    assert_eq!(rel.as_str(), "src/lib.rs");
}

#[test]
fn test_relative_outside_base_is_none() {
    assert!(NormalizedPath::relative(Path::new("/other/file"), Path::new("/bundles/core")).is_none());
}

#[test]
fn test_under_joins_native_root() {
    let rel = NormalizedPath::new("config/app.json");
    let native = rel.under(Path::new("/project"));
    assert_eq!(native, Path::new("/project").join("config").join("app.json"));
}

#[test]
fn test_file_name_and_extension() {
    let path = NormalizedPath::new("foo/bar/baz.txt");
    assert_eq!(path.file_name(), Some("baz.txt"));
    assert_eq!(path.extension(), Some("txt"));
    assert_eq!(NormalizedPath::new("foo/.env").extension(), None);
}

proptest! {
    #[test]
    fn normalized_paths_have_no_backslashes_or_empty_segments(s in "[a-z./\\\\]{0,40}") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));
        prop_assert!(!as_str.contains("//"));
        prop_assert_eq!(NormalizedPath::new(as_str), path.clone());
    }
}

#[test]
fn test_contained_paths() {
    assert!(NormalizedPath::new("src/lib.rs").is_contained());
    assert!(NormalizedPath::new("./a/b").is_contained());
    assert!(NormalizedPath::new("a/..b/c").is_contained());
}

#[test]
fn test_escaping_paths_are_not_contained() {
    assert!(!NormalizedPath::new("/etc/passwd").is_contained());
    assert!(!NormalizedPath::new("../outside.txt").is_contained());
    assert!(!NormalizedPath::new("a/../../b").is_contained());
    assert!(!NormalizedPath::new("C:\\Windows\\x").is_contained());
    assert!(!NormalizedPath::new("").is_contained());
}
