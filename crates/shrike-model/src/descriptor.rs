//! JVM type descriptors.

use std::fmt;

use shrike_core::Name;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn descriptor_char(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Char => 'C',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
        }
    }

    pub fn from_descriptor_char(c: char) -> Option<Self> {
        Some(match c {
            'Z' => PrimitiveType::Boolean,
            'B' => PrimitiveType::Byte,
            'S' => PrimitiveType::Short,
            'C' => PrimitiveType::Char,
            'I' => PrimitiveType::Int,
            'J' => PrimitiveType::Long,
            'F' => PrimitiveType::Float,
            'D' => PrimitiveType::Double,
            _ => return None,
        })
    }

    /// Longs and doubles occupy two local-variable slots.
    pub fn is_wide(self) -> bool {
        matches!(self, PrimitiveType::Long | PrimitiveType::Double)
    }
}

/// A slash-separated binary class name, e.g. `java/util/List`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName(Name);

impl ClassName {
    pub fn new(name: impl Into<Name>) -> Self {
        let name = name.into();
        debug_assert!(!name.as_str().is_empty());
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The package prefix, empty for the default package.
    pub fn package(&self) -> &str {
        match self.as_str().rfind('/') {
            Some(idx) => &self.as_str()[..idx],
            None => "",
        }
    }

    pub fn simple_name(&self) -> &str {
        match self.as_str().rfind('/') {
            Some(idx) => &self.as_str()[idx + 1..],
            None => self.as_str(),
        }
    }

    pub fn descriptor(&self) -> String {
        format!("L{};", self.as_str())
    }
}

impl fmt::Debug for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved type descriptor.
///
/// A closed union: every concrete construct is an arm, no virtual dispatch.
/// `Void` is only valid in return position.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeDescriptor {
    Void,
    Primitive(PrimitiveType),
    Class(ClassName),
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn class(name: impl Into<Name>) -> Self {
        TypeDescriptor::Class(ClassName::new(name))
    }

    pub fn array(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array(Box::new(element))
    }

    pub fn as_class_name(&self) -> Option<&ClassName> {
        match self {
            TypeDescriptor::Class(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, TypeDescriptor::Class(_))
    }

    pub fn is_wide(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(p) if p.is_wide())
    }

    /// Local-variable slots a value of this type occupies as a parameter.
    pub fn slot_width(&self) -> u16 {
        if self.is_wide() {
            2
        } else {
            1
        }
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            TypeDescriptor::Void => out.push('V'),
            TypeDescriptor::Primitive(p) => out.push(p.descriptor_char()),
            TypeDescriptor::Class(name) => {
                out.push('L');
                out.push_str(name.as_str());
                out.push(';');
            }
            TypeDescriptor::Array(element) => {
                out.push('[');
                element.write_descriptor(out);
            }
        }
    }

    /// Parses a single descriptor; the whole input must be consumed.
    pub fn parse(input: &str) -> Result<Self> {
        let (ty, rest) = Self::parse_prefix(input)?;
        if !rest.is_empty() {
            return Err(Error::InvalidDescriptor(input.to_string()));
        }
        Ok(ty)
    }

    /// Parses a descriptor from the front of `input`, returning the remainder.
    pub fn parse_prefix(input: &str) -> Result<(Self, &str)> {
        let mut chars = input.chars();
        let first = chars
            .next()
            .ok_or_else(|| Error::InvalidDescriptor(input.to_string()))?;
        match first {
            'V' => Ok((TypeDescriptor::Void, chars.as_str())),
            'L' => {
                let rest = chars.as_str();
                let end = rest
                    .find(';')
                    .ok_or_else(|| Error::InvalidDescriptor(input.to_string()))?;
                let name = &rest[..end];
                if name.is_empty() {
                    return Err(Error::InvalidDescriptor(input.to_string()));
                }
                Ok((TypeDescriptor::class(name), &rest[end + 1..]))
            }
            '[' => {
                let (element, rest) = Self::parse_prefix(chars.as_str())?;
                if element == TypeDescriptor::Void {
                    return Err(Error::InvalidDescriptor(input.to_string()));
                }
                Ok((TypeDescriptor::array(element), rest))
            }
            c => match PrimitiveType::from_descriptor_char(c) {
                Some(p) => Ok((TypeDescriptor::Primitive(p), chars.as_str())),
                None => Err(Error::InvalidDescriptor(input.to_string())),
            },
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}
