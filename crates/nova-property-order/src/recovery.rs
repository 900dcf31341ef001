use std::io::{self, Read};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::{BinaryProvider, SourceProvider};
use crate::type_name::TypeName;

/// Which artifact a recovered order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderOrigin {
    Source,
    Binary,
}

/// The declaration order of one type's abstract methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedNames {
    owner: TypeName,
    names: Vec<String>,
    origin: OrderOrigin,
}

impl OrderedNames {
    pub fn new(owner: TypeName, names: Vec<String>, origin: OrderOrigin) -> Self {
        Self {
            owner,
            names,
            origin,
        }
    }

    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn origin(&self) -> OrderOrigin {
        self.origin
    }

    /// Index of the first declaration named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

/// How [`OrderRecovery`] picks an artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    /// Source if the provider has it, otherwise the classfile.
    #[default]
    Auto,
    SourceOnly,
    BinaryOnly,
    /// Never recover; every run keeps its supplied order.
    Off,
}

#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("failed to read {artifact} for {ty}: {source}")]
    Io {
        ty: String,
        artifact: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to scan source of {ty}: {source}")]
    Scan {
        ty: String,
        #[source]
        source: nova_source_order::ScanError,
    },
    #[error("{ty} is not declared in its source file")]
    NotInSource { ty: String },
    #[error("malformed classfile for {ty}: {source}")]
    ClassFile {
        ty: String,
        #[source]
        source: nova_classfile::Error,
    },
    #[error("classfile for {ty} declares `{found}`")]
    WrongClass { ty: String, found: String },
}

/// Anything that can answer "what is the declaration order of `ty`?".
///
/// Implemented by [`OrderRecovery`] and by closures, which is handy for
/// callers that memoize or precompute orders.
pub trait RecoverOrder {
    fn recover_order(&self, ty: &TypeName) -> Option<OrderedNames>;
}

impl<F> RecoverOrder for F
where
    F: Fn(&TypeName) -> Option<OrderedNames>,
{
    fn recover_order(&self, ty: &TypeName) -> Option<OrderedNames> {
        self(ty)
    }
}

/// Recovers declaration order from exactly one artifact per call.
///
/// Any failure (unreadable artifact, malformed input, type not found) yields
/// `None`; partial results are never returned.
#[derive(Debug, Clone)]
pub struct OrderRecovery<S, B> {
    sources: S,
    binaries: B,
    strategy: RecoveryStrategy,
}

impl<S: SourceProvider, B: BinaryProvider> OrderRecovery<S, B> {
    pub fn new(sources: S, binaries: B) -> Self {
        Self {
            sources,
            binaries,
            strategy: RecoveryStrategy::Auto,
        }
    }

    pub fn with_strategy(mut self, strategy: RecoveryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> RecoveryStrategy {
        self.strategy
    }

    pub fn recover_order(&self, ty: &TypeName) -> Option<OrderedNames> {
        match self.try_recover_order(ty) {
            Ok(order) => order,
            Err(err) => {
                tracing::debug!(
                    target = "nova.property_order",
                    ty = %ty,
                    error = %err,
                    "failed to recover declaration order"
                );
                None
            }
        }
    }

    /// Like [`OrderRecovery::recover_order`], but reports why recovery failed.
    /// `Ok(None)` means no artifact was available.
    pub fn try_recover_order(&self, ty: &TypeName) -> Result<Option<OrderedNames>, RecoveryError> {
        match self.strategy {
            RecoveryStrategy::Off => Ok(None),
            RecoveryStrategy::SourceOnly => self.from_source(ty),
            RecoveryStrategy::BinaryOnly => self.from_binary(ty),
            RecoveryStrategy::Auto => match self.from_source(ty)? {
                Some(order) => Ok(Some(order)),
                None => self.from_binary(ty),
            },
        }
    }

    /// `Ok(None)` only when there is no source artifact at all; once one is
    /// found, every problem with it is an error.
    fn from_source(&self, ty: &TypeName) -> Result<Option<OrderedNames>, RecoveryError> {
        let io_err = |source| RecoveryError::Io {
            ty: ty.to_string(),
            artifact: "source",
            source,
        };
        let Some(artifact) = self.sources.open_source(ty).map_err(io_err)? else {
            return Ok(None);
        };
        let text = artifact.read_to_string().map_err(io_err)?;

        let order = nova_source_order::scan_source(&text, ty.package()).map_err(|source| {
            RecoveryError::Scan {
                ty: ty.to_string(),
                source,
            }
        })?;
        let names = order
            .get(&ty.qualified_name())
            .ok_or_else(|| RecoveryError::NotInSource { ty: ty.to_string() })?;

        tracing::trace!(
            target = "nova.property_order",
            ty = %ty,
            methods = names.len(),
            "recovered declaration order from source"
        );
        Ok(Some(OrderedNames::new(
            ty.clone(),
            names.to_vec(),
            OrderOrigin::Source,
        )))
    }

    fn from_binary(&self, ty: &TypeName) -> Result<Option<OrderedNames>, RecoveryError> {
        let io_err = |source| RecoveryError::Io {
            ty: ty.to_string(),
            artifact: "classfile",
            source,
        };
        let Some(mut reader) = self.binaries.open_class(ty).map_err(io_err)? else {
            return Ok(None);
        };
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(io_err)?;

        let class = nova_classfile::ClassFile::parse(&bytes).map_err(|source| {
            RecoveryError::ClassFile {
                ty: ty.to_string(),
                source,
            }
        })?;
        if class.this_class != ty.internal_name() {
            return Err(RecoveryError::WrongClass {
                ty: ty.to_string(),
                found: class.this_class,
            });
        }
        let names: Vec<String> = class
            .abstract_no_arg_methods()
            .into_iter()
            .map(str::to_owned)
            .collect();

        tracing::trace!(
            target = "nova.property_order",
            ty = %ty,
            methods = names.len(),
            "recovered declaration order from classfile"
        );
        Ok(Some(OrderedNames::new(ty.clone(), names, OrderOrigin::Binary)))
    }
}

impl<S: SourceProvider, B: BinaryProvider> RecoverOrder for OrderRecovery<S, B> {
    fn recover_order(&self, ty: &TypeName) -> Option<OrderedNames> {
        OrderRecovery::recover_order(self, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MemoryClasses, MemorySources, NoBinary, NoSource};
    use nova_classfile::{ACC_ABSTRACT, ACC_PUBLIC};
    use nova_test_utils::ClassFileBuilder;
    use pretty_assertions::assert_eq;

    const ABSTRACT: u16 = ACC_PUBLIC | ACC_ABSTRACT;

    fn person() -> TypeName {
        TypeName::top_level("com.example", "Person")
    }

    fn person_class(methods: &[(&str, &str)]) -> Vec<u8> {
        methods
            .iter()
            .fold(ClassFileBuilder::new("com/example/Person"), |b, (name, desc)| {
                b.method(ABSTRACT, name, desc)
            })
            .build()
    }

    #[test]
    fn source_is_preferred_over_binary() {
        let sources = MemorySources::new().with(
            &person(),
            "package com.example; abstract class Person { abstract String b(); abstract String a(); }",
        );
        let classes = MemoryClasses::new().with(&person(), person_class(&[("a", "()I"), ("b", "()I")]));
        let recovery = OrderRecovery::new(sources, classes);

        let order = recovery.recover_order(&person()).unwrap();
        assert_eq!(order.origin(), OrderOrigin::Source);
        assert_eq!(order.names(), ["b", "a"]);
        assert_eq!(order.owner(), &person());
    }

    #[test]
    fn falls_back_to_binary_without_source() {
        let classes = MemoryClasses::new().with(&person(), person_class(&[("z", "()I"), ("y", "()I")]));
        let recovery = OrderRecovery::new(NoSource, classes);

        let order = recovery.recover_order(&person()).unwrap();
        assert_eq!(order.origin(), OrderOrigin::Binary);
        assert_eq!(order.names(), ["z", "y"]);
    }

    #[test]
    fn broken_source_does_not_fall_back_to_binary() {
        let sources = MemorySources::new().with(&person(), "abstract class Person { String s = \"");
        let classes = MemoryClasses::new().with(&person(), person_class(&[("a", "()I")]));
        let recovery = OrderRecovery::new(sources, classes);

        assert!(matches!(
            recovery.try_recover_order(&person()),
            Err(RecoveryError::Scan { .. })
        ));
        assert_eq!(recovery.recover_order(&person()), None);
    }

    #[test]
    fn type_missing_from_its_source_is_a_failure() {
        let sources = MemorySources::new().with(&person(), "package com.example; class Other {}");
        let recovery = OrderRecovery::new(sources, NoBinary);
        assert!(matches!(
            recovery.try_recover_order(&person()),
            Err(RecoveryError::NotInSource { .. })
        ));
    }

    #[test]
    fn nested_type_uses_its_own_classfile() {
        let builder = person().nested("Builder");
        let bytes = ClassFileBuilder::new("com/example/Person$Builder")
            .method(ABSTRACT, "build", "()Lcom/example/Person;")
            .build();
        let classes = MemoryClasses::new().with(&builder, bytes);
        let recovery = OrderRecovery::new(NoSource, classes);

        assert_eq!(recovery.recover_order(&builder).unwrap().names(), ["build"]);
        assert_eq!(recovery.recover_order(&person()), None);
    }

    #[test]
    fn classfile_for_another_type_is_rejected() {
        let bytes = ClassFileBuilder::new("com/example/Impostor")
            .method(ABSTRACT, "a", "()I")
            .build();
        let classes = MemoryClasses::new().with(&person(), bytes);
        let recovery = OrderRecovery::new(NoSource, classes);

        assert!(matches!(
            recovery.try_recover_order(&person()),
            Err(RecoveryError::WrongClass { found, .. }) if found == "com/example/Impostor"
        ));
    }

    #[test]
    fn malformed_classfile_is_a_failure() {
        let classes = MemoryClasses::new().with(&person(), vec![0xCA, 0xFE, 0xBA, 0xBE, 0]);
        let recovery = OrderRecovery::new(NoSource, classes);
        assert!(matches!(
            recovery.try_recover_order(&person()),
            Err(RecoveryError::ClassFile { .. })
        ));
        assert_eq!(recovery.recover_order(&person()), None);
    }

    #[test]
    fn nothing_available() {
        let recovery = OrderRecovery::new(NoSource, NoBinary);
        assert!(matches!(recovery.try_recover_order(&person()), Ok(None)));
    }

    #[test]
    fn strategies_restrict_the_artifact() {
        let sources = MemorySources::new().with(
            &person(),
            "package com.example; abstract class Person { abstract int s(); }",
        );
        let classes = MemoryClasses::new().with(&person(), person_class(&[("b", "()I")]));
        let recovery = OrderRecovery::new(&sources, &classes);

        let names = |strategy| {
            recovery
                .clone()
                .with_strategy(strategy)
                .recover_order(&person())
                .map(|o| o.names().to_vec())
        };
        assert_eq!(names(RecoveryStrategy::Auto), Some(vec!["s".to_string()]));
        assert_eq!(names(RecoveryStrategy::SourceOnly), Some(vec!["s".to_string()]));
        assert_eq!(names(RecoveryStrategy::BinaryOnly), Some(vec!["b".to_string()]));
        assert_eq!(names(RecoveryStrategy::Off), None);
    }

    #[test]
    fn closures_recover_order() {
        let fixed = |ty: &TypeName| {
            Some(OrderedNames::new(
                ty.clone(),
                vec!["x".to_string()],
                OrderOrigin::Source,
            ))
        };
        assert!(RecoverOrder::recover_order(&fixed, &person())
            .unwrap()
            .contains("x"));
    }
}
