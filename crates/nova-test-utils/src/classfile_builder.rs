use std::collections::HashMap;

const CONSTANT_UTF8: u8 = 1;
const CONSTANT_LONG: u8 = 5;
const CONSTANT_CLASS: u8 = 7;

const MAJOR_JAVA_8: u16 = 52;
const ACC_PUBLIC_SUPER: u16 = 0x0021;

/// Builds minimal, well-formed classfiles for tests.
///
/// The constant pool always starts with `#1 Utf8 <this>` and `#2 Class #1`;
/// every other name is interned on first use. Members and attributes keep
/// the order in which they were added.
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    pool: Vec<Vec<u8>>,
    /// Next free constant pool index (Long/Double consume two).
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    access_flags: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberSpec>,
    methods: Vec<MemberSpec>,
    attributes: Vec<(u16, Vec<u8>)>,
}

#[derive(Debug, Clone)]
struct MemberSpec {
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: Vec<(u16, Vec<u8>)>,
}

impl ClassFileBuilder {
    /// `internal_name` uses `/` separators and `$` for nested classes.
    pub fn new(internal_name: &str) -> Self {
        let mut builder = Self {
            pool: Vec::new(),
            next_index: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
            access_flags: ACC_PUBLIC_SUPER,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        builder.class_index(internal_name);
        builder
    }

    pub fn access_flags(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_class = self.class_index(internal_name);
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        let idx = self.class_index(internal_name);
        self.interfaces.push(idx);
        self
    }

    /// Adds a `CONSTANT_Long` entry (which occupies two pool slots).
    pub fn long_constant(mut self, value: i64) -> Self {
        let mut entry = vec![CONSTANT_LONG];
        entry.extend_from_slice(&value.to_be_bytes());
        self.pool.push(entry);
        self.next_index += 2;
        self
    }

    pub fn field(self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        self.member(false, access_flags, name, descriptor, None)
    }

    pub fn field_with_attribute(
        self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attribute: &str,
        info: &[u8],
    ) -> Self {
        self.member(false, access_flags, name, descriptor, Some((attribute, info)))
    }

    pub fn method(self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        self.member(true, access_flags, name, descriptor, None)
    }

    pub fn method_with_attribute(
        self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attribute: &str,
        info: &[u8],
    ) -> Self {
        self.member(true, access_flags, name, descriptor, Some((attribute, info)))
    }

    /// Adds a method whose name/descriptor indices are used verbatim, for
    /// exercising malformed pools.
    pub fn raw_method(mut self, access_flags: u16, name_index: u16, descriptor_index: u16) -> Self {
        self.methods.push(MemberSpec {
            access_flags,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        });
        self
    }

    pub fn class_attribute(mut self, name: &str, info: &[u8]) -> Self {
        let idx = self.utf8_index(name);
        self.attributes.push((idx, info.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_u32(&mut out, 0xCAFEBABE);
        push_u16(&mut out, 0);
        push_u16(&mut out, MAJOR_JAVA_8);

        push_u16(&mut out, self.next_index);
        for entry in &self.pool {
            out.extend_from_slice(entry);
        }

        push_u16(&mut out, self.access_flags);
        push_u16(&mut out, 2);
        push_u16(&mut out, self.super_class);
        push_u16(&mut out, self.interfaces.len() as u16);
        for idx in &self.interfaces {
            push_u16(&mut out, *idx);
        }

        for members in [&self.fields, &self.methods] {
            push_u16(&mut out, members.len() as u16);
            for member in members {
                push_u16(&mut out, member.access_flags);
                push_u16(&mut out, member.name_index);
                push_u16(&mut out, member.descriptor_index);
                push_attributes(&mut out, &member.attributes);
            }
        }

        push_attributes(&mut out, &self.attributes);
        out
    }

    fn member(
        mut self,
        is_method: bool,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attribute: Option<(&str, &[u8])>,
    ) -> Self {
        let name_index = self.utf8_index(name);
        let descriptor_index = self.utf8_index(descriptor);
        let attributes = attribute
            .map(|(attr, info)| vec![(self.utf8_index(attr), info.to_vec())])
            .unwrap_or_default();
        let member = MemberSpec {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        };
        if is_method {
            self.methods.push(member);
        } else {
            self.fields.push(member);
        }
        self
    }

    fn utf8_index(&mut self, value: &str) -> u16 {
        if let Some(idx) = self.utf8.get(value) {
            return *idx;
        }
        let mut entry = vec![CONSTANT_UTF8];
        push_u16(&mut entry, value.len() as u16);
        entry.extend_from_slice(value.as_bytes());
        let idx = self.push_entry(entry);
        self.utf8.insert(value.to_string(), idx);
        idx
    }

    fn class_index(&mut self, internal_name: &str) -> u16 {
        if let Some(idx) = self.classes.get(internal_name) {
            return *idx;
        }
        let name_index = self.utf8_index(internal_name);
        let mut entry = vec![CONSTANT_CLASS];
        push_u16(&mut entry, name_index);
        let idx = self.push_entry(entry);
        self.classes.insert(internal_name.to_string(), idx);
        idx
    }

    fn push_entry(&mut self, entry: Vec<u8>) -> u16 {
        let idx = self.next_index;
        self.pool.push(entry);
        self.next_index += 1;
        idx
    }
}

fn push_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    push_u16(out, attributes.len() as u16);
    for (name_index, info) in attributes {
        push_u16(out, *name_index);
        push_u32(out, info.len() as u32);
        out.extend_from_slice(info);
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
