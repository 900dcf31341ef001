//! Differential tests against real `javac` output: the order recovered from
//! source must match the classfile method table. Skipped when `javac` is not
//! on `PATH`.

use nova_property_order::{
    ClassRoots, OrderOrigin, OrderRecovery, RecoveryStrategy, SourceEncoding, SourceRoots,
    TypeName,
};
use nova_test_utils::javac::{compile_java, javac_available};
use pretty_assertions::assert_eq;

const PERSON_JAVA: &str = r#"
package com.example;

import java.util.List;

/** A person; braces in docs { are ignored. */
public abstract class Person {
  private static final String SEP = "}";

  public abstract String name();

  // public abstract String commentedOut();
  public abstract int age() throws IllegalStateException;

  public abstract List<String> nicknames();

  public abstract String[] tags();

  public String display() {
    return name() + SEP + age();
  }

  protected Person() {}

  public abstract static class Builder {
    public abstract Builder setName(String name);
    public abstract Builder setAge(int age);
    public abstract Person build();
  }

  public interface Address {
    String street();
    char initial();
    String city();
  }
}
"#;

fn recover(
    strategy: RecoveryStrategy,
    sources: &SourceRoots,
    classes: &ClassRoots,
    ty: &TypeName,
) -> Vec<String> {
    let recovery = OrderRecovery::new(sources, classes).with_strategy(strategy);
    let order = recovery
        .recover_order(ty)
        .unwrap_or_else(|| panic!("no {strategy:?} order for {ty}"));
    match strategy {
        RecoveryStrategy::SourceOnly => assert_eq!(order.origin(), OrderOrigin::Source),
        _ => assert_eq!(order.origin(), OrderOrigin::Binary),
    }
    order.names().to_vec()
}

#[test]
fn source_and_binary_orders_agree() {
    if !javac_available() {
        eprintln!("skipping: `javac` not found on PATH");
        return;
    }

    let out = compile_java(&[("com/example/Person.java", PERSON_JAVA)]).unwrap();
    assert!(out.success(), "javac failed:\n{}", out.stderr);

    let sources = SourceRoots::new([out.source_root()], SourceEncoding::Utf8);
    let classes = ClassRoots::new([out.class_root()]);

    let person = TypeName::top_level("com.example", "Person");
    let address = person.nested("Address");
    let builder = person.nested("Builder");

    for ty in [&person, &address] {
        let from_source = recover(RecoveryStrategy::SourceOnly, &sources, &classes, ty);
        let from_binary = recover(RecoveryStrategy::BinaryOnly, &sources, &classes, ty);
        assert_eq!(from_source, from_binary, "order mismatch for {ty}");
    }

    assert_eq!(
        recover(RecoveryStrategy::BinaryOnly, &sources, &classes, &person),
        ["name", "age", "nicknames", "tags"]
    );
    assert_eq!(
        recover(RecoveryStrategy::BinaryOnly, &sources, &classes, &address),
        ["street", "initial", "city"]
    );

    // The classfile only lists no-arg methods; the source lists every
    // abstract method.
    assert_eq!(
        recover(RecoveryStrategy::SourceOnly, &sources, &classes, &builder),
        ["setName", "setAge", "build"]
    );
    assert_eq!(
        recover(RecoveryStrategy::BinaryOnly, &sources, &classes, &builder),
        ["build"]
    );
}
