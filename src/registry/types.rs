use crate::error::RegistryError;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The scalar CWL types a tool input or output can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    File,
    Directory,
    String,
    Int,
    Long,
    Float,
    Double,
    Boolean,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::File => "File",
            BaseType::Directory => "Directory",
            BaseType::String => "string",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Float => "float",
            BaseType::Double => "double",
            BaseType::Boolean => "boolean",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        let base = match name {
            "File" => BaseType::File,
            "Directory" => BaseType::Directory,
            "string" => BaseType::String,
            "int" => BaseType::Int,
            "long" => BaseType::Long,
            "float" => BaseType::Float,
            "double" => BaseType::Double,
            "boolean" => BaseType::Boolean,
            _ => return None,
        };
        Some(base)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            BaseType::Int | BaseType::Long | BaseType::Float | BaseType::Double
        )
    }
}

/// A declared CWL type, as written in the registry (`File`, `File?`, `File[]`, `File[]?`).
///
/// Serializes to the native CWL representation: arrays become
/// `{type: array, items: ...}` and nullable types become `["null", ...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct CwlType {
    pub base: BaseType,
    pub array: bool,
    pub nullable: bool,
}

impl CwlType {
    pub const FILE: CwlType = CwlType::new(BaseType::File);
    pub const STRING: CwlType = CwlType::new(BaseType::String);

    pub const fn new(base: BaseType) -> Self {
        Self {
            base,
            array: false,
            nullable: false,
        }
    }

    pub const fn array_of(base: BaseType) -> Self {
        Self {
            base,
            array: true,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// The same type with the nullable marker dropped.
    pub const fn non_null(self) -> Self {
        Self {
            nullable: false,
            ..self
        }
    }
}

impl FromStr for CwlType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RegistryError::InvalidType(s.to_string());
        let trimmed = s.trim();
        let (rest, nullable) = match trimmed.strip_suffix('?') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };
        let (name, array) = match rest.strip_suffix("[]") {
            Some(name) => (name, true),
            None => (rest, false),
        };
        let base = BaseType::parse(name).ok_or_else(invalid)?;
        Ok(Self {
            base,
            array,
            nullable,
        })
    }
}

impl TryFrom<String> for CwlType {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for CwlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base.as_str())?;
        if self.array {
            write!(f, "[]")?;
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ArraySchema {
    #[serde(rename = "type")]
    kind: &'static str,
    items: &'static str,
}

impl Serialize for CwlType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.nullable {
            let mut seq = serializer.serialize_seq(Some(2))?;
            seq.serialize_element("null")?;
            seq.serialize_element(&self.non_null())?;
            return seq.end();
        }
        if self.array {
            ArraySchema {
                kind: "array",
                items: self.base.as_str(),
            }
            .serialize(serializer)
        } else {
            serializer.serialize_str(self.base.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_markers() {
        assert_eq!("File".parse::<CwlType>().unwrap(), CwlType::FILE);
        assert_eq!("File?".parse::<CwlType>().unwrap(), CwlType::FILE.nullable());
        assert_eq!(
            "File[]".parse::<CwlType>().unwrap(),
            CwlType::array_of(BaseType::File)
        );
        assert_eq!(
            "File[]?".parse::<CwlType>().unwrap(),
            CwlType::array_of(BaseType::File).nullable()
        );
        assert!("record".parse::<CwlType>().is_err());
        assert!("File?[]".parse::<CwlType>().is_err());
    }

    #[test]
    fn display_round_trips_registry_notation() {
        for text in ["double", "File?", "string[]", "File[]?"] {
            assert_eq!(text.parse::<CwlType>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn serializes_to_native_cwl_shapes() {
        let plain = serde_json::to_value(CwlType::FILE).unwrap();
        assert_eq!(plain, serde_json::json!("File"));

        let nullable = serde_json::to_value(CwlType::FILE.nullable()).unwrap();
        assert_eq!(nullable, serde_json::json!(["null", "File"]));

        let array = serde_json::to_value(CwlType::array_of(BaseType::File)).unwrap();
        assert_eq!(array, serde_json::json!({"type": "array", "items": "File"}));

        let both = serde_json::to_value(CwlType::array_of(BaseType::File).nullable()).unwrap();
        assert_eq!(
            both,
            serde_json::json!(["null", {"type": "array", "items": "File"}])
        );
    }
}
