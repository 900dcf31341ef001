use nova_classfile::ACC_ABSTRACT;
use nova_property_order::{
    reorder, BinaryProvider, ClassRoots, ConfigError, Member, OrderOrigin, OrderRecovery,
    PropertyOrderConfig, RecoverOrder, RecoveryStrategy, SourceEncoding, SourceProvider,
    SourceRoots, TypeName,
};
use nova_test_utils::{ClassFileBuilder, FixtureDir};
use pretty_assertions::assert_eq;

const PUBLIC_ABSTRACT: u16 = 0x0001 | ACC_ABSTRACT;

const SHAPE_JAVA: &str = r#"
package com.example;

public abstract class Shape {
  public abstract double width();
  public abstract double height();

  public interface Named {
    String label();
    String description();
  }
}
"#;

fn shape() -> TypeName {
    TypeName::top_level("com.example", "Shape")
}

fn shape_class() -> Vec<u8> {
    // Deliberately alphabetical, like a host that sorted its members.
    ClassFileBuilder::new("com/example/Shape")
        .access_flags(0x0421)
        .method(PUBLIC_ABSTRACT, "height", "()D")
        .method(PUBLIC_ABSTRACT, "width", "()D")
        .build()
}

#[test]
fn source_roots_search_in_order() {
    let first = FixtureDir::new();
    let second = FixtureDir::with_files(&[("com/example/Shape.java", SHAPE_JAVA)]);
    let sources = SourceRoots::new(
        [first.path().to_path_buf(), second.path().to_path_buf()],
        SourceEncoding::Utf8,
    );

    let nested = shape().nested("Named");
    let artifact = sources.open_source(&nested).unwrap().expect("found in second root");
    assert_eq!(artifact.read_to_string().unwrap(), SHAPE_JAVA);
    assert!(sources
        .open_source(&TypeName::top_level("com.example", "Missing"))
        .unwrap()
        .is_none());
}

#[test]
fn class_roots_open_exact_nested_artifact() {
    let dir = FixtureDir::new();
    dir.write(
        "com/example/Shape$Named.class",
        ClassFileBuilder::new("com/example/Shape$Named").build(),
    );
    let classes = ClassRoots::new([dir.path().to_path_buf()]);

    assert!(classes.open_class(&shape().nested("Named")).unwrap().is_some());
    assert!(classes.open_class(&shape()).unwrap().is_none());
}

#[test]
fn recovers_from_disk_preferring_source() {
    let dir = FixtureDir::with_files(&[
        ("src/com/example/Shape.java", SHAPE_JAVA.as_bytes().to_vec()),
        ("classes/com/example/Shape.class", shape_class()),
    ]);
    let recovery = OrderRecovery::new(
        SourceRoots::new([dir.path().join("src")], SourceEncoding::Utf8),
        ClassRoots::new([dir.path().join("classes")]),
    );

    let order = recovery.recover_order(&shape()).unwrap();
    assert_eq!(order.origin(), OrderOrigin::Source);
    assert_eq!(order.names(), ["width", "height"]);

    let named = recovery.recover_order(&shape().nested("Named")).unwrap();
    assert_eq!(named.names(), ["label", "description"]);

    let binary = recovery
        .clone()
        .with_strategy(RecoveryStrategy::BinaryOnly)
        .recover_order(&shape())
        .unwrap();
    assert_eq!(binary.origin(), OrderOrigin::Binary);
    assert_eq!(binary.names(), ["height", "width"]);
}

#[test]
fn latin1_sources_decode() {
    let dir = FixtureDir::new();
    // `é` in ISO-8859-1 inside a comment.
    let mut text = b"package p; /* caf".to_vec();
    text.push(0xE9);
    text.extend_from_slice(b" */ interface I { int b(); int a(); }");
    dir.write("p/I.java", &text);

    let ty = TypeName::top_level("p", "I");
    let utf8 = OrderRecovery::new(
        SourceRoots::new([dir.path().to_path_buf()], SourceEncoding::Utf8),
        ClassRoots::default(),
    );
    assert!(utf8.try_recover_order(&ty).is_err());

    let latin1 = OrderRecovery::new(
        SourceRoots::new([dir.path().to_path_buf()], SourceEncoding::Latin1),
        ClassRoots::default(),
    );
    assert_eq!(latin1.recover_order(&ty).unwrap().names(), ["b", "a"]);
}

#[test]
fn config_file_wires_filesystem_recovery() {
    let dir = FixtureDir::with_files(&[
        (
            "nova-property-order.toml",
            r#"
            strategy = "auto"
            source_roots = ["src/main/java"]
            class_roots = ["target/classes"]

            [logging]
            level = "nova.property_order=debug"
            "#
            .as_bytes()
            .to_vec(),
        ),
        ("target/classes/com/example/Shape.class", shape_class()),
    ]);

    let config =
        PropertyOrderConfig::load_from_path(dir.path().join("nova-property-order.toml")).unwrap();
    assert_eq!(config.source_roots, [dir.path().join("src/main/java")]);
    assert_eq!(config.class_roots, [dir.path().join("target/classes")]);

    // No source checked in; the classfile supplies the order.
    let recovery = OrderRecovery::from_config(&config).unwrap();
    let members = vec![
        Member::new(shape(), "width", "double width()"),
        Member::new(shape(), "height", "double height()"),
    ];
    let out = reorder(members, &recovery);
    let names: Vec<_> = out.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["height", "width"]);
    assert_eq!(
        RecoverOrder::recover_order(&recovery, &shape()).map(|o| o.origin()),
        Some(OrderOrigin::Binary)
    );
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = FixtureDir::new();
    let err = PropertyOrderConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "{err}");
}
