//! Column type normalization
//!
//! Rules compare declared types as normalized strings. Normalization is
//! lossy only where the loss cannot change a rule's outcome: display width
//! on `tinyint(1)` is kept because it is the conventional boolean spelling.

use serde::{Deserialize, Serialize};
use sqlparser::ast::DataType;

/// Boolean-ish column types, in normalized form
pub const BOOLEAN_TYPES: &[&str] = &["bool", "boolean", "tinyint(1)", "bit"];

/// Normalize a parsed data type to the form rules match against
pub fn normalize_type(data_type: &DataType) -> String {
    normalize_type_str(&data_type.to_string())
}

/// Normalize a type as written in source text, e.g. `TINYINT(1) UNSIGNED`
pub fn normalize_type_str(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let joined = lowered
        .split_whitespace()
        .filter(|w| !matches!(*w, "unsigned" | "signed" | "zerofill"))
        .collect::<Vec<_>>()
        .join(" ");

    // Drop whitespace inside and right before parentheses: `decimal (10, 2)` -> `decimal(10,2)`
    let mut normalized = String::with_capacity(joined.len());
    let mut depth = 0usize;
    for c in joined.chars() {
        match c {
            '(' => {
                normalized.truncate(normalized.trim_end().len());
                depth += 1;
            }
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth > 0 => continue,
            _ => {}
        }
        normalized.push(c);
    }

    match normalized.as_str() {
        "bit(1)" => "bit".to_string(),
        _ => normalized,
    }
}

/// Whether a normalized type is accepted as a boolean representation
pub fn is_boolean_type(normalized: &str) -> bool {
    BOOLEAN_TYPES.contains(&normalized)
}

/// Coarse classification of a normalized column type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeFamily {
    Boolean,
    Integer,
    Float,
    Decimal,
    Char { length: Option<u64> },
    Varchar { length: Option<u64> },
    Text,
    Binary,
    Temporal,
    Json,
    Other(String),
}

impl TypeFamily {
    /// Classify a normalized type string
    pub fn of(normalized: &str) -> Self {
        if is_boolean_type(normalized) {
            return TypeFamily::Boolean;
        }

        let (base, args) = split_args(normalized);
        match base {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "int2"
            | "int4" | "int8" | "serial" | "bigserial" | "smallserial" => TypeFamily::Integer,
            "float" | "double" | "double precision" | "real" | "float4" | "float8" => {
                TypeFamily::Float
            }
            "decimal" | "numeric" | "dec" => TypeFamily::Decimal,
            "char" | "character" | "nchar" => TypeFamily::Char {
                length: first_arg(args),
            },
            "varchar" | "character varying" | "nvarchar" => TypeFamily::Varchar {
                length: first_arg(args),
            },
            "text" | "tinytext" | "mediumtext" | "longtext" => TypeFamily::Text,
            "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob"
            | "bytea" | "bit" => TypeFamily::Binary,
            "date" | "time" | "datetime" | "timestamp" | "year" | "interval" => {
                TypeFamily::Temporal
            }
            "json" | "jsonb" => TypeFamily::Json,
            _ if base.starts_with("timestamp") || base.starts_with("time ") => {
                TypeFamily::Temporal
            }
            _ => TypeFamily::Other(normalized.to_string()),
        }
    }
}

/// Split `varchar(255)` into (`varchar`, `Some("255")`)
fn split_args(normalized: &str) -> (&str, Option<&str>) {
    match normalized.split_once('(') {
        Some((base, rest)) => (base.trim(), rest.split_once(')').map(|(args, _)| args)),
        None => (normalized, None),
    }
}

fn first_arg(args: Option<&str>) -> Option<u64> {
    args?.split(',').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keeps_tinyint_width() {
        assert_eq!(normalize_type_str("TINYINT(1)"), "tinyint(1)");
        assert_eq!(normalize_type_str("tinyint"), "tinyint");
        assert_eq!(normalize_type_str("TINYINT(1) UNSIGNED"), "tinyint(1)");
    }

    #[test]
    fn test_normalize_folds_single_bit() {
        assert_eq!(normalize_type_str("BIT"), "bit");
        assert_eq!(normalize_type_str("BIT(1)"), "bit");
        assert_eq!(normalize_type_str("bit(8)"), "bit(8)");
    }

    #[test]
    fn test_normalize_multiword() {
        assert_eq!(normalize_type_str("DOUBLE  PRECISION"), "double precision");
        assert_eq!(normalize_type_str("DECIMAL(10, 2)"), "decimal(10,2)");
    }

    #[test]
    fn test_boolean_types() {
        for ty in ["bool", "boolean", "tinyint(1)", "bit"] {
            assert!(is_boolean_type(ty), "{ty}");
        }
        assert!(!is_boolean_type("tinyint"));
        assert!(!is_boolean_type("int"));
    }

    #[test]
    fn test_type_family() {
        assert_eq!(TypeFamily::of("tinyint(1)"), TypeFamily::Boolean);
        assert_eq!(TypeFamily::of("bigint(20)"), TypeFamily::Integer);
        assert_eq!(TypeFamily::of("double"), TypeFamily::Float);
        assert_eq!(
            TypeFamily::of("varchar(255)"),
            TypeFamily::Varchar { length: Some(255) }
        );
        assert_eq!(TypeFamily::of("decimal(10,2)"), TypeFamily::Decimal);
        assert_eq!(TypeFamily::of("datetime(3)"), TypeFamily::Temporal);
        assert_eq!(
            TypeFamily::of("geometry"),
            TypeFamily::Other("geometry".to_string())
        );
    }
}
