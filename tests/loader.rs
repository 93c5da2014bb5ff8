// tests/loader.rs
use std::fs;

use genz_model::package::Scope;
use genz_model::{build_element, build_elements, ExtractError, LoadConfig, LoadError, Loader, Package};
use tempfile::TempDir;

fn write_pkg(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, src) in files {
        fs::write(dir.path().join(name), src).expect("write");
    }
    dir
}

#[test]
fn package_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Package>();
}

#[test]
fn load_dir_reads_go_files_sorted() {
    let dir = write_pkg(&[
        ("b.go", "package models\n\nfunc (u *User) Save() error { return nil }\n"),
        ("a.go", "package models\n\n// User is a user.\ntype User struct {\n\tID int\n}\n"),
        ("README.md", "not go"),
    ]);
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/c.go"), "package other\n").unwrap();

    let pkg = Loader::default().load_dir(dir.path()).unwrap();
    assert_eq!(pkg.name(), "models");
    assert_eq!(pkg.files().len(), 2);
    assert!(pkg.files()[0].path.ends_with("a.go"));

    let user = build_element(&pkg, "User").unwrap();
    assert_eq!(user.typ.name, "models.User");
    assert_eq!(user.methods[0].name, "Save");
}

#[test]
fn test_files_are_opt_in() {
    let dir = write_pkg(&[
        ("a.go", "package models\n\ntype A struct{}\n"),
        ("a_test.go", "package models\n\ntype Fixture struct{}\n"),
        ("b_test.go", "package models_test\n\ntype External struct{}\n"),
    ]);

    let pkg = Loader::default().load_dir(dir.path()).unwrap();
    assert!(pkg.lookup_type("Fixture").is_none());

    let pkg = Loader::new(LoadConfig::default().with_tests(true))
        .load_dir(dir.path())
        .unwrap();
    assert!(pkg.lookup_type("Fixture").is_some());
    assert!(pkg.lookup_type("External").is_none());
}

#[test]
fn external_test_file_sorting_first_does_not_name_the_package() {
    let pkg = Loader::new(LoadConfig::default().with_tests(true))
        .load_sources([
            ("a_test.go", "package models_test\n\ntype External struct{}\n"),
            ("b.go", "package models\n\ntype B struct{}\n"),
            ("b_test.go", "package models\n\ntype Fixture struct{}\n"),
        ])
        .unwrap();
    assert_eq!(pkg.name(), "models");
    assert_eq!(pkg.files().len(), 2);
    assert!(pkg.lookup_type("B").is_some());
    assert!(pkg.lookup_type("Fixture").is_some());
    assert!(pkg.lookup_type("External").is_none());
}

#[test]
fn mismatched_package_names() {
    let err = Loader::default()
        .load_sources([("a.go", "package a\n"), ("b.go", "package b\n")])
        .unwrap_err();
    assert!(
        matches!(&err, LoadError::PackageMismatch { expected, found, .. } if expected == "a" && found == "b"),
        "{err}"
    );
}

#[test]
fn parse_errors_name_the_file() {
    let err = Loader::default()
        .load_sources([("ok.go", "package a\n"), ("bad.go", "package a\n\ntype A struct {\n")])
        .unwrap_err();
    match err {
        LoadError::Parse { path, failure } => {
            assert!(path.ends_with("bad.go"));
            assert!(!failure.diags.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn lexical_errors_fail_the_file() {
    let err = Loader::default()
        .load_str("a.go", "package a\n\ntype A struct { x int /* open\n")
        .unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }), "{err}");
}

#[test]
fn empty_directory_has_no_sources() {
    let dir = write_pkg(&[]);
    let err = Loader::default().load_dir(dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::NoSources(_)), "{err}");
}

#[test]
fn bodies_vars_and_consts_are_skipped() {
    let pkg = Loader::default()
        .load_str(
            "a.go",
            r#"package a

import "fmt"

const (
	One = iota
	Two
)

var registry = map[string]func() error{
	"x": func() error { return nil },
}

type A struct {
	Name string
}

func (a A) String() string {
	if a.Name == "" {
		return fmt.Sprintf("%v", struct{}{})
	}
	return a.Name
}

func New[T any](v T) *A { return &A{} }
"#,
        )
        .unwrap();
    let a = build_element(&pkg, "A").unwrap();
    assert_eq!(a.methods.len(), 1);
    assert_eq!(a.methods[0].returns[0].name, "string");
}

#[test]
fn scopes() {
    let pkg = Loader::default()
        .load_str(
            "a.go",
            "package a\n\nimport (\n\tu \"github.com/google/uuid\"\n\t_ \"embed\"\n)\n\ntype A struct{}\n",
        )
        .unwrap();
    let file = pkg.file_ids().next().unwrap();
    let sym = |s: &str| pkg.symbol(s).unwrap();

    assert_eq!(pkg.scope_of(file, None, sym("A")), Some(Scope::Local));
    assert_eq!(pkg.scope_of(file, Some(sym("u")), sym("A")), Some(Scope::Imported {
        name: "u".into(),
        path: "github.com/google/uuid".into(),
    }));
    assert_eq!(pkg.scope_of(file, Some(sym("embed")), sym("A")), None);
}

#[test]
fn not_found_and_unsupported_kinds() {
    let pkg = Loader::default()
        .load_str(
            "a.go",
            "package a\n\ntype S struct{}\ntype Alias = S\ntype ID int\ntype Fn func()\n",
        )
        .unwrap();
    for name in ["Missing", "Alias", "ID", "Fn", "", "not-an-ident", "S.x"] {
        let err = build_element(&pkg, name).unwrap_err();
        assert_eq!(
            err,
            ExtractError::NotFound {
                name: name.into(),
                package: "a".into(),
            }
        );
    }
}

#[test]
fn batch_extraction_preserves_order() {
    let pkg = Loader::default()
        .load_str(
            "a.go",
            "package a\n\ntype A struct{}\ntype B interface{ M() }\ntype C struct{ x Missing }\n",
        )
        .unwrap();
    let results = build_elements(&pkg, &["B", "A", "C", "Z"]);
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_ref().unwrap().typ.internal_name, "B");
    assert_eq!(results[1].as_ref().unwrap().typ.internal_name, "A");
    assert!(matches!(results[2], Err(ExtractError::UnresolvedType { .. })));
    assert!(matches!(results[3], Err(ExtractError::NotFound { .. })));
}

#[test]
fn elements_serialize_in_pascal_case() {
    let pkg = Loader::default()
        .load_str(
            "a.go",
            "package a\n\ntype A struct {\n\t// The id.\n\tID int `json:\"id\"`\n}\n\ntype I interface{ Do() }\n",
        )
        .unwrap();
    let a = serde_json::to_value(build_element(&pkg, "A").unwrap()).unwrap();
    assert_eq!(
        a,
        serde_json::json!({
            "Type": { "Name": "a.A", "InternalName": "A" },
            "Attributes": [{
                "Name": "ID",
                "Type": { "Name": "int", "InternalName": "int" },
                "Comments": ["The id."],
                "Tags": { "json": "id" }
            }],
            "Methods": []
        })
    );

    let i = serde_json::to_value(build_element(&pkg, "I").unwrap()).unwrap();
    assert!(i.get("Attributes").is_none());
    assert_eq!(i["Methods"][0]["IsPointerReceiver"], false);
}
