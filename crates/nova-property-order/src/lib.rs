//! Declaration-order recovery for abstract accessor methods.
//!
//! Reflection-style member listings come back in an unspecified order. Code
//! generators that mirror an abstract type's properties need them in the order
//! the author wrote them. This crate recovers that order from the type's source
//! file (preferred) or its compiled classfile, and reorders a member list to
//! match, leaving it untouched whenever the recovered order is missing or does
//! not account for every member.
//!
//! ```
//! use nova_property_order::{reorder, Member, MemorySources, NoBinary, OrderRecovery, TypeName};
//!
//! let person = TypeName::top_level("com.example", "Person");
//! let sources = MemorySources::new().with(
//!     &person,
//!     "package com.example; abstract class Person { abstract String name(); abstract int age(); }",
//! );
//! let recovery = OrderRecovery::new(sources, NoBinary);
//!
//! let members = vec![
//!     Member::new(person.clone(), "age", "int age()"),
//!     Member::new(person.clone(), "name", "String name()"),
//! ];
//! let names: Vec<_> = reorder(members, &recovery).into_iter().map(|m| m.name).collect();
//! assert_eq!(names, ["name", "age"]);
//! ```

#![forbid(unsafe_code)]

mod config;
mod member;
mod provider;
mod recovery;
mod reorder;
mod type_name;

pub use config::{init_tracing, ConfigError, LoggingConfig, PropertyOrderConfig};
pub use member::{Member, OrderedMember};
pub use provider::{
    BinaryProvider, ClassRoots, MemoryClasses, MemorySources, NoBinary, NoSource, SourceArtifact,
    SourceEncoding, SourceProvider, SourceRoots, UnsupportedEncoding,
};
pub use recovery::{
    OrderOrigin, OrderRecovery, OrderedNames, RecoverOrder, RecoveryError, RecoveryStrategy,
};
pub use reorder::{reorder, reorder_in_place, ReorderReport};
pub use type_name::TypeName;
