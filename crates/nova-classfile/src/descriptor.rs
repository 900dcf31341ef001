use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    Object(String),
    Array(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    /// `true` for the `()R` form used by accessor-style methods.
    pub fn is_no_arg(&self) -> bool {
        self.params.is_empty()
    }
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let mut cursor = Cursor::new(desc);
    let ty = cursor.field_type()?;
    cursor.finish()?;
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let mut cursor = Cursor::new(desc);
    cursor.expect(b'(')?;

    let mut params = Vec::new();
    while !cursor.eat(b')') {
        params.push(cursor.field_type()?);
    }

    let return_type = if cursor.eat(b'V') {
        ReturnType::Void
    } else {
        ReturnType::Type(cursor.field_type()?)
    };
    cursor.finish()?;

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

struct Cursor<'a> {
    desc: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(desc: &'a str) -> Self {
        Self { desc, pos: 0 }
    }

    fn invalid(&self) -> Error {
        Error::InvalidDescriptor(self.desc.to_string())
    }

    fn peek(&self) -> Option<u8> {
        self.desc.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8) -> Result<()> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.invalid())
        }
    }

    fn finish(&self) -> Result<()> {
        if self.pos == self.desc.len() {
            Ok(())
        } else {
            Err(self.invalid())
        }
    }

    fn field_type(&mut self) -> Result<FieldType> {
        let b = self.peek().ok_or_else(|| self.invalid())?;
        self.pos += 1;
        let base = match b {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            b'[' => return Ok(FieldType::Array(Box::new(self.field_type()?))),
            b'L' => {
                let desc = self.desc;
                let rest = &desc[self.pos..];
                let end = rest.find(';').ok_or_else(|| self.invalid())?;
                if end == 0 {
                    return Err(self.invalid());
                }
                self.pos += end + 1;
                return Ok(FieldType::Object(rest[..end].to_string()));
            }
            _ => return Err(self.invalid()),
        };
        Ok(FieldType::Base(base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arg_accessor_descriptors() {
        let desc = parse_method_descriptor("()Ljava/lang/String;").unwrap();
        assert!(desc.is_no_arg());
        assert_eq!(
            desc.return_type,
            ReturnType::Type(FieldType::Object("java/lang/String".to_string()))
        );

        let desc = parse_method_descriptor("()[[I").unwrap();
        assert!(desc.is_no_arg());
        assert_eq!(
            desc.return_type,
            ReturnType::Type(FieldType::Array(Box::new(FieldType::Array(Box::new(
                FieldType::Base(BaseType::Int)
            )))))
        );
    }

    #[test]
    fn parameters_are_counted() {
        let desc = parse_method_descriptor("(JLjava/util/List;[Z)V").unwrap();
        assert_eq!(
            desc.params,
            vec![
                FieldType::Base(BaseType::Long),
                FieldType::Object("java/util/List".to_string()),
                FieldType::Array(Box::new(FieldType::Base(BaseType::Boolean))),
            ]
        );
        assert_eq!(desc.return_type, ReturnType::Void);
        assert!(!desc.is_no_arg());
    }

    #[test]
    fn malformed_descriptors_are_rejected() {
        for desc in ["", "()", "(", "I", "()VV", "(L;)V", "(Ljava/lang/String)V", "()Q"] {
            assert!(
                parse_method_descriptor(desc).is_err(),
                "expected {desc:?} to be rejected"
            );
        }
        assert!(parse_field_descriptor("V").is_err());
        assert_eq!(
            parse_field_descriptor("Z").unwrap(),
            FieldType::Base(BaseType::Boolean)
        );
    }
}
