use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a classfile could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Needed `needed` more bytes at byte `offset`.
    UnexpectedEof { offset: usize, needed: usize },
    InvalidMagic(u32),
    /// Bytes left over after the class attributes.
    TrailingBytes { offset: usize },
    InvalidConstantPoolIndex(u16),
    /// A tag whose entry width is unknown, so the rest of the pool can't be located.
    UnknownConstantPoolTag { index: u16, tag: u8 },
    /// A Long/Double in the last pool slot, leaving no room for its second slot.
    WideConstantOverflow { index: u16 },
    ConstantPoolTypeMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    InvalidModifiedUtf8,
    InvalidDescriptor(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof { offset, needed } => {
                write!(f, "unexpected end of classfile at byte {offset} (needed {needed} more)")
            }
            Error::InvalidMagic(magic) => write!(f, "invalid classfile magic: 0x{magic:08x}"),
            Error::TrailingBytes { offset } => {
                write!(f, "trailing bytes after classfile at byte {offset}")
            }
            Error::InvalidConstantPoolIndex(index) => {
                write!(f, "invalid constant pool index: {index}")
            }
            Error::UnknownConstantPoolTag { index, tag } => {
                write!(f, "unknown constant pool tag {tag} at index {index}")
            }
            Error::WideConstantOverflow { index } => {
                write!(f, "8-byte constant at index {index} overruns the constant pool")
            }
            Error::ConstantPoolTypeMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "constant pool entry {index} is {found}, expected {expected}"
            ),
            Error::InvalidModifiedUtf8 => write!(f, "invalid modified UTF-8 constant"),
            Error::InvalidDescriptor(desc) => write!(f, "invalid descriptor: {desc}"),
        }
    }
}

impl std::error::Error for Error {}
