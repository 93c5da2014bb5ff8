// tests/struct_extraction.rs
use genz_model::{build_element, Attribute, Element, ExtractError, Loader, Method, Tags, Type};
use rstest::rstest;

fn element(src: &str, name: &str) -> Element {
    let pkg = Loader::default()
        .load_str("main.go", src)
        .unwrap_or_else(|e| panic!("load failed: {e}"));
    build_element(&pkg, name).unwrap_or_else(|e| panic!("extract failed: {e}"))
}

fn ty(name: &str, internal: &str) -> Type {
    Type::new(name, internal)
}

fn attr(name: &str, typ: Type) -> Attribute {
    Attribute {
        name: name.into(),
        typ,
        comments: vec![],
        tags: Tags::new(),
    }
}

fn method(name: &str, pointer: bool) -> Method {
    Method {
        name: name.into(),
        params: vec![],
        returns: vec![],
        is_pointer_receiver: pointer,
        is_exported: genz_model::extract::is_exported(name),
        comments: vec![],
    }
}

#[test]
fn empty_struct_has_empty_attributes() {
    let got = element("package main\n\ntype A struct {}\n", "A");
    assert_eq!(
        got,
        Element {
            typ: ty("main.A", "A"),
            attributes: Some(vec![]),
            methods: vec![],
        }
    );
}

#[test]
fn attributes_in_source_order() {
    let got = element(
        "package main\n\ntype A struct {\n\tfoo string\n\tbar uint\n}\n",
        "A",
    );
    assert_eq!(
        got.attributes.unwrap(),
        vec![attr("foo", ty("string", "string")), attr("bar", ty("uint", "uint"))]
    );
}

#[test]
fn leading_comments_become_attribute_comments() {
    let got = element(
        "package main\n\ntype A struct {\n\t//comment 1\n\t//comment 2\n\tfoo string\n}\n",
        "A",
    );
    let attrs = got.attributes.unwrap();
    assert_eq!(attrs[0].comments, ["comment 1", "comment 2"]);
}

#[test]
fn inline_comment_is_not_documentation() {
    let got = element(
        "package main\n\ntype A struct {\n\tfoo string // foo\n}\n",
        "A",
    );
    assert_eq!(got.attributes.unwrap(), vec![attr("foo", ty("string", "string"))]);
}

#[test]
fn comment_separated_by_blank_line_is_not_documentation() {
    let got = element(
        "package main\n\ntype A struct {\n\t// stray\n\n\tfoo string\n}\n",
        "A",
    );
    assert!(got.attributes.unwrap()[0].comments.is_empty());
}

#[rstest]
#[case::slice("[]string", "[]string", "[]string")]
#[case::local("A", "main.A", "A")]
#[case::slice_of_local("[]A", "[]main.A", "[]A")]
#[case::map("map[A]A", "map[main.A]main.A", "map[A]A")]
#[case::anonymous_struct(
    "struct {\n\t\tbar []A\n\t\tbaz string\n\t}",
    "struct{bar []main.A; baz string}",
    "struct{bar []A; baz string}"
)]
#[case::pointer("*A", "*main.A", "*A")]
#[case::array("[4]A", "[4]main.A", "[4]A")]
#[case::map_of_pointers("map[string][]*A", "map[string][]*main.A", "map[string][]*A")]
fn field_type_names(#[case] field_type: &str, #[case] name: &str, #[case] internal: &str) {
    let src = format!("package main\n\ntype A struct{{}}\n\ntype B struct {{\n\tfoo {field_type}\n}}\n");
    let got = element(&src, "B");
    assert_eq!(got.typ, ty("main.B", "B"));
    assert_eq!(got.attributes.unwrap()[0].typ, ty(name, internal));
}

#[test]
fn imported_types_keep_alias_only_in_name() {
    let got = element(
        "package main\n\nimport \"github.com/google/uuid\"\n\ntype A struct {\n\tfoo string\n\tbar uuid.UUID\n\tbaz map[uuid.UUID]uuid.UUID\n}\n",
        "A",
    );
    assert_eq!(
        got.attributes.unwrap(),
        vec![
            attr("foo", ty("string", "string")),
            attr("bar", ty("uuid.UUID", "UUID")),
            attr("baz", ty("map[uuid.UUID]uuid.UUID", "map[UUID]UUID")),
        ]
    );
}

#[test]
fn renamed_import_uses_the_local_name() {
    let got = element(
        "package main\n\nimport (\n\tgid \"github.com/google/uuid\"\n)\n\ntype A struct {\n\tid gid.UUID\n}\n",
        "A",
    );
    assert_eq!(got.attributes.unwrap()[0].typ, ty("gid.UUID", "UUID"));
}

#[test]
fn tags_are_parsed_per_field() {
    let got = element(
        "package main\n\ntype A struct {\n\tfoo string `json:\"foo\"`\n\tbar string `json:\"bar\" xml:\"bar\"`\n}\n",
        "A",
    );
    let attrs = got.attributes.unwrap();
    assert_eq!(attrs[0].tags, Tags::from([("json".into(), "foo".into())]));
    assert_eq!(
        attrs[1].tags,
        Tags::from([("json".into(), "bar".into()), ("xml".into(), "bar".into())])
    );
}

#[test]
fn malformed_tag_aborts_the_element() {
    let pkg = Loader::default()
        .load_str(
            "main.go",
            "package main\n\ntype A struct {\n\tfoo string `json:\"foo\" xml\"foo\"`\n}\n",
        )
        .unwrap();
    let err = build_element(&pkg, "A").unwrap_err();
    assert!(
        matches!(&err, ExtractError::MalformedTag { offending, .. } if offending == "xml\"foo\""),
        "{err:?}"
    );
}

#[test]
fn grouped_names_and_embedded_fields() {
    let got = element(
        "package main\n\nimport \"sync\"\n\ntype Base struct{}\n\ntype A struct {\n\t*Base\n\tsync.Mutex\n\tx, y int\n}\n",
        "A",
    );
    assert_eq!(
        got.attributes.unwrap(),
        vec![
            attr("Base", ty("*main.Base", "*Base")),
            attr("Mutex", ty("sync.Mutex", "Mutex")),
            attr("x", ty("int", "int")),
            attr("y", ty("int", "int")),
        ]
    );
}

#[test]
fn embedded_generic_instances_are_fields_named_after_their_type() {
    let got = element(
        "package main\n\ntype List[T any] struct{}\n\ntype A struct {\n\tList[int]\n\t*List[string] `json:\"l\"`\n\tfoo string\n\tbuf [4]byte\n}\n",
        "A",
    );
    let attrs = got.attributes.unwrap();
    let names: Vec<_> = attrs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["List", "List", "foo", "buf"]);
    assert_eq!(attrs[0].typ, ty("main.List[int]", "List[int]"));
    assert_eq!(attrs[1].typ, ty("*main.List[string]", "*List[string]"));
    assert_eq!(attrs[1].tags["json"], "l");
    assert_eq!(attrs[3].typ, ty("[4]byte", "[4]byte"));
}

#[test]
fn value_and_pointer_receivers() {
    let got = element(
        "package main\n\ntype A struct {}\n\nfunc (a A) foo() {}\n\nfunc (a *A) bar() {}\n",
        "A",
    );
    assert_eq!(got.methods, vec![method("foo", false), method("bar", true)]);
}

#[test]
fn method_comments_strip_marker_and_space() {
    let got = element(
        "package main\n\ntype A struct {}\n\n// comment 1\n// comment 2\nfunc (a A) foo() {}\n",
        "A",
    );
    assert_eq!(got.methods[0].comments, ["comment 1", "comment 2"]);
}

#[test]
fn method_params_and_returns() {
    let got = element(
        "package main\n\ntype A struct {}\n\nfunc (a A) foo(a string) int {\n\treturn 0\n}\n",
        "A",
    );
    assert_eq!(got.methods[0].params, [ty("string", "string")]);
    assert_eq!(got.methods[0].returns, [ty("int", "int")]);
}

#[test]
fn method_with_local_types() {
    let got = element(
        "package main\n\ntype T struct{}\n\ntype A struct {}\n\nfunc (a A) foo(a T) T {\n\treturn T{}\n}\n\nfunc (a A) bar(a map[T]T) struct{ name T } {\n\treturn struct{ name T }{}\n}\n",
        "A",
    );
    assert_eq!(got.methods[0].params, [ty("main.T", "T")]);
    assert_eq!(got.methods[0].returns, [ty("main.T", "T")]);
    assert_eq!(got.methods[1].params, [ty("map[main.T]main.T", "map[T]T")]);
    assert_eq!(got.methods[1].returns, [ty("struct{name main.T}", "struct{name T}")]);
}

#[test]
fn exported_method_with_two_params_and_two_returns() {
    let got = element(
        "package main\n\ntype A struct {}\n\n// comment\nfunc (a *A) Foo(a string, b uint) (int, error) {\n\treturn 0\n}\n",
        "A",
    );
    assert_eq!(
        got.methods,
        vec![Method {
            name: "Foo".into(),
            params: vec![ty("string", "string"), ty("uint", "uint")],
            returns: vec![ty("int", "int"), ty("error", "error")],
            is_pointer_receiver: true,
            is_exported: true,
            comments: vec!["comment".into()],
        }]
    );
}

#[test]
fn shared_and_variadic_parameters() {
    let got = element(
        "package main\n\ntype A struct {}\n\nfunc (A) Log(level, code int, args ...any) (n int, err error) {\n\treturn\n}\n",
        "A",
    );
    let m = &got.methods[0];
    assert_eq!(m.params, [ty("int", "int"), ty("int", "int"), ty("[]any", "[]any")]);
    assert_eq!(m.returns, [ty("int", "int"), ty("error", "error")]);
}

#[test]
fn methods_of_other_types_are_ignored() {
    let got = element(
        "package main\n\ntype A struct {}\ntype B struct {}\n\nfunc (b B) foo() {}\nfunc helper() {}\nfunc (a A) bar() {}\n",
        "A",
    );
    assert_eq!(got.methods, vec![method("bar", false)]);
}

#[test]
fn methods_across_files_follow_file_order() {
    let pkg = Loader::default()
        .load_sources([
            ("a.go", "package main\n\ntype A struct {}\n\nfunc (a A) one() {}\n"),
            ("b.go", "package main\n\nfunc (a *A) two() {}\n"),
        ])
        .unwrap();
    let got = build_element(&pkg, "A").unwrap();
    assert_eq!(got.methods, vec![method("one", false), method("two", true)]);
}

#[test]
fn generic_struct_type_parameters_render_bare() {
    let got = element(
        "package main\n\ntype List[T any] struct {\n\titems []T\n\tnext *List[T]\n}\n\nfunc (l *List[T]) Push(v T) {}\n",
        "List",
    );
    let attrs = got.attributes.unwrap();
    assert_eq!(attrs[0].typ, ty("[]T", "[]T"));
    assert_eq!(attrs[1].typ, ty("*main.List[T]", "*List[T]"));
    assert_eq!(got.methods[0].params, [ty("T", "T")]);
}

#[test]
fn dangling_reference_is_unresolved() {
    let pkg = Loader::default()
        .load_str("main.go", "package main\n\ntype A struct {\n\tfoo Missing\n}\n")
        .unwrap();
    let err = build_element(&pkg, "A").unwrap_err();
    assert!(
        matches!(&err, ExtractError::UnresolvedType { name, .. } if name == "Missing"),
        "{err:?}"
    );
}
