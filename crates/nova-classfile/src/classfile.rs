use crate::constant_pool::ConstantPool;
use crate::descriptor::parse_method_descriptor;
use crate::error::{Error, Result};
use crate::reader::Reader;

const CLASSFILE_MAGIC: u32 = 0xCAFEBABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

/// The structural view of a classfile needed to recover member order.
///
/// Attributes (code, signatures, annotations, ...) are never interpreted;
/// they are skipped by their declared length, so unknown attribute kinds
/// cannot break parsing.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    /// Methods in method-table order.
    pub methods: Vec<ClassMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
}

impl ClassMember {
    pub fn is_abstract(&self) -> bool {
        self.access_flags & ACC_ABSTRACT != 0
    }

    /// Whether the descriptor is a well-formed `()R` method descriptor.
    pub fn is_no_arg(&self) -> bool {
        parse_method_descriptor(&self.descriptor).is_ok_and(|desc| desc.is_no_arg())
    }
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != CLASSFILE_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?;
        let super_class = match reader.read_u2()? {
            0 => None,
            idx => Some(cp.get_class_name(idx)?),
        };

        let interfaces_count = reader.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(reader.read_u2()?)?);
        }

        let fields = parse_members(&mut reader, &cp)?;
        let methods = parse_members(&mut reader, &cp)?;
        skip_attributes(&mut reader)?;

        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
        })
    }

    /// Names of abstract methods taking no parameters, in method-table
    /// (declaration) order.
    pub fn abstract_no_arg_methods(&self) -> Vec<&str> {
        self.methods
            .iter()
            .filter(|m| m.is_abstract() && m.is_no_arg())
            .map(|m| m.name.as_str())
            .collect()
    }
}

/// Lists the abstract, zero-parameter methods declared directly in the class
/// encoded by `bytes`, in declaration order.
pub fn list_abstract_no_arg_methods(bytes: &[u8]) -> Result<Vec<String>> {
    let class = ClassFile::parse(bytes)?;
    Ok(class
        .abstract_no_arg_methods()
        .into_iter()
        .map(str::to_owned)
        .collect())
}

fn parse_members(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Vec<ClassMember>> {
    let count = reader.read_u2()? as usize;
    let mut members = Vec::with_capacity(count);
    for _ in 0..count {
        let access_flags = reader.read_u2()?;
        let name = cp.get_utf8(reader.read_u2()?)?.to_string();
        let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();
        skip_attributes(reader)?;
        members.push(ClassMember {
            access_flags,
            name,
            descriptor,
        });
    }
    Ok(members)
}

fn skip_attributes(reader: &mut Reader<'_>) -> Result<()> {
    let count = reader.read_u2()?;
    for _ in 0..count {
        let _name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        reader.skip(length)?;
    }
    Ok(())
}
