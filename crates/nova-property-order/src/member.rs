use crate::type_name::TypeName;

/// Anything that can be reordered: an owning type plus a name that is
/// matched against recovered declaration order.
pub trait OrderedMember {
    fn owner(&self) -> &TypeName;
    fn name(&self) -> &str;
}

impl<T: OrderedMember + ?Sized> OrderedMember for &T {
    fn owner(&self) -> &TypeName {
        (**self).owner()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// An accessor declared by a type, as reported by the annotation-processing
/// driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    pub owner: TypeName,
    pub name: String,
    /// Opaque to this crate; carried through reordering untouched.
    pub full_signature: String,
}

impl Member {
    pub fn new(owner: TypeName, name: impl Into<String>, full_signature: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            full_signature: full_signature.into(),
        }
    }
}

impl OrderedMember for Member {
    fn owner(&self) -> &TypeName {
        &self.owner
    }

    fn name(&self) -> &str {
        &self.name
    }
}
