use std::fmt::{Display, Formatter, Result as FmtResult};

/// Primitive value types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
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

impl BaseType {
    /// Parse a primitive type code (`I` for `int`, `J` for `long`, etc.)
    pub fn from_code(code: u8) -> Option<BaseType> {
        let typ = match code {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        };
        Some(typ)
    }

    pub fn code(&self) -> u8 {
        match self {
            BaseType::Byte => b'B',
            BaseType::Char => b'C',
            BaseType::Double => b'D',
            BaseType::Float => b'F',
            BaseType::Int => b'I',
            BaseType::Long => b'J',
            BaseType::Short => b'S',
            BaseType::Boolean => b'Z',
        }
    }

    /// Number of bytes a value of this type takes in class data
    pub fn size(&self) -> usize {
        match self {
            BaseType::Byte | BaseType::Boolean => 1,
            BaseType::Char | BaseType::Short => 2,
            BaseType::Float | BaseType::Int => 4,
            BaseType::Double | BaseType::Long => 8,
        }
    }

    /// Name of the type in Java source
    pub fn java_name(&self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

/// Type of a field, as far as the serialized form is concerned
///
/// Object and array fields are both read as a nested record; only primitive types change how
/// many bytes get read.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FieldType {
    Base(BaseType),
    Object,
    Array,
}

impl FieldType {
    /// Parse a field type code, as found at the start of a field descriptor
    pub fn from_code(code: u8) -> Option<FieldType> {
        match code {
            b'L' => Some(FieldType::Object),
            b'[' => Some(FieldType::Array),
            other => BaseType::from_code(other).map(FieldType::Base),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            FieldType::Base(base) => base.code(),
            FieldType::Object => b'L',
            FieldType::Array => b'[',
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Base(_))
    }

    /// Field type of a type signature (eg. `Ljava/lang/String;` or `[I`), from its first character
    ///
    /// This is as much as the JVM looks at: the rest of the signature names a class, and classes
    /// are not resolved here.
    pub fn of_signature(signature: &str) -> Option<FieldType> {
        let first = *signature.as_bytes().first()?;
        FieldType::from_code(first)
    }

    /// Element type of an array, given the name of the array class (eg. `[I` or
    /// `[Ljava.lang.String;`)
    pub fn of_array_elements(array_class_name: &str) -> Option<FieldType> {
        match array_class_name.as_bytes() {
            [b'[', code, ..] => FieldType::from_code(*code),
            _ => None,
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FieldType::Base(base) => f.write_str(base.java_name()),
            FieldType::Object => f.write_str("object"),
            FieldType::Array => f.write_str("array"),
        }
    }
}
