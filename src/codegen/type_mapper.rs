//! Primitive type tags of the schema DSL.

/// DSL primitive type after parsing its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Number,
    Date,
    Boolean,
    /// Unknown or empty tag; emitted as the target's dynamic type
    Dynamic,
}

impl PrimitiveType {
    /// Parse a tag case-insensitively. Unknown tags never fail.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "string" => PrimitiveType::String,
            "number" => PrimitiveType::Number,
            "date" => PrimitiveType::Date,
            "boolean" => PrimitiveType::Boolean,
            _ => PrimitiveType::Dynamic,
        }
    }
}

/// TypeScript representation of a primitive
pub fn typescript_type(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::String => "string",
        PrimitiveType::Number => "number",
        PrimitiveType::Date => "Date",
        PrimitiveType::Boolean => "boolean",
        PrimitiveType::Dynamic => "any",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(PrimitiveType::from_tag("string"), PrimitiveType::String);
        assert_eq!(PrimitiveType::from_tag("Number"), PrimitiveType::Number);
        assert_eq!(PrimitiveType::from_tag("DATE"), PrimitiveType::Date);
        assert_eq!(PrimitiveType::from_tag("boolean"), PrimitiveType::Boolean);
    }

    #[test]
    fn test_unknown_tags_are_dynamic() {
        assert_eq!(PrimitiveType::from_tag(""), PrimitiveType::Dynamic);
        assert_eq!(PrimitiveType::from_tag("uuid"), PrimitiveType::Dynamic);
        assert_eq!(typescript_type(PrimitiveType::Dynamic), "any");
        assert_eq!(typescript_type(PrimitiveType::Date), "Date");
    }
}
