//! Minimal JVM classfile reader.
//!
//! Reads just enough of the format (header, constant pool, member tables) to
//! recover the declaration order of a class's methods without loading it.

#![forbid(unsafe_code)]

mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod reader;

pub use crate::classfile::{
    list_abstract_no_arg_methods, ClassFile, ClassMember, ACC_ABSTRACT, ACC_INTERFACE,
    ACC_PUBLIC, ACC_STATIC,
};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
