use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::parse::parameter::{Bound, ParamSpec, ParamType};
use crate::parse::scalar::Scalar;

use super::value::ParamValue;

/// Why a single value was rejected. Wrapped into a parameter error by the
/// converter with the parameter name attached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("invalid {kind}: '{text}'")]
    Invalid { kind: ParamType, text: String },

    #[error("not one of [{}]: '{value}'", quoted(.allowed))]
    NotInEnum { allowed: Vec<Scalar>, value: String },

    #[error("does not match regexp '{pattern}': '{value}'")]
    PatternMismatch { pattern: String, value: String },

    #[error("invalid regexp '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("too short: {length} < {min}")]
    TooShort { length: usize, min: usize },

    #[error("too long: {length} > {max}")]
    TooLong { length: usize, max: usize },

    #[error("too small: {value} < {min}")]
    TooSmall { value: ParamValue, min: Bound },

    #[error("too large: {value} > {max}")]
    TooLarge { value: ParamValue, max: Bound },
}

fn quoted(values: &[Scalar]) -> String {
    values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

type Coerce = fn(&str) -> Result<ParamValue, ValueError>;
type Validate = fn(&ParamSpec, &ParamValue) -> Result<(), ValueError>;

/// Coercion and constraint checking for one parameter type.
pub struct TypeHandler {
    pub coerce: Coerce,
    pub validate: Validate,
}

static STRING: TypeHandler = TypeHandler {
    coerce: coerce_string,
    validate: validate_string,
};
static INTEGER: TypeHandler = TypeHandler {
    coerce: coerce_integer,
    validate: validate_range,
};
static NUMBER: TypeHandler = TypeHandler {
    coerce: coerce_number,
    validate: validate_range,
};
static BOOLEAN: TypeHandler = TypeHandler {
    coerce: coerce_boolean,
    validate: no_constraints,
};
static DATE: TypeHandler = TypeHandler {
    coerce: coerce_date,
    validate: no_constraints,
};

/// The handler bound to a declared parameter type.
pub fn handler(param_type: ParamType) -> &'static TypeHandler {
    match param_type {
        ParamType::String => &STRING,
        ParamType::Integer => &INTEGER,
        ParamType::Number => &NUMBER,
        ParamType::Boolean => &BOOLEAN,
        ParamType::Date => &DATE,
    }
}

/// Turn raw text into a value of the parameter's declared type.
pub fn coerce(spec: &ParamSpec, text: &str) -> Result<ParamValue, ValueError> {
    (handler(spec.param_type).coerce)(text)
}

/// Check an already-coerced value against the parameter's constraints.
pub fn validate(spec: &ParamSpec, value: &ParamValue) -> Result<(), ValueError> {
    (handler(spec.param_type).validate)(spec, value)
}

/// A declared default in the form raw input takes. YAML reads `default: 1.0`
/// as a float, which an integer parameter still accepts as `1`.
pub fn default_text<'a>(spec: &ParamSpec, default: &'a Scalar) -> Cow<'a, str> {
    let text = default.as_str();
    if spec.param_type != ParamType::Integer || text.trim().parse::<i64>().is_ok() {
        return Cow::Borrowed(text);
    }
    match text.trim().parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 => {
            Cow::Owned((n as i64).to_string())
        }
        _ => Cow::Borrowed(text),
    }
}

fn invalid(kind: ParamType, text: &str) -> ValueError {
    ValueError::Invalid {
        kind,
        text: text.to_string(),
    }
}

fn coerce_string(text: &str) -> Result<ParamValue, ValueError> {
    Ok(ParamValue::String(text.to_string()))
}

fn coerce_integer(text: &str) -> Result<ParamValue, ValueError> {
    text.trim()
        .parse::<i64>()
        .map(ParamValue::Integer)
        .map_err(|_| invalid(ParamType::Integer, text))
}

fn coerce_number(text: &str) -> Result<ParamValue, ValueError> {
    text.trim()
        .parse::<f64>()
        .map(ParamValue::Number)
        .map_err(|_| invalid(ParamType::Number, text))
}

fn coerce_boolean(text: &str) -> Result<ParamValue, ValueError> {
    match text {
        "true" => Ok(ParamValue::Boolean(true)),
        "false" => Ok(ParamValue::Boolean(false)),
        _ => Err(invalid(ParamType::Boolean, text)),
    }
}

fn coerce_date(text: &str) -> Result<ParamValue, ValueError> {
    DateTime::parse_from_rfc2822(text.trim())
        .map(|date| ParamValue::Date(date.with_timezone(&Utc)))
        .map_err(|_| invalid(ParamType::Date, text))
}

fn validate_string(spec: &ParamSpec, value: &ParamValue) -> Result<(), ValueError> {
    let Some(value) = value.as_str() else {
        return Ok(());
    };

    if let Some(allowed) = &spec.enum_values {
        if !spec.enum_contains(value) {
            return Err(ValueError::NotInEnum {
                allowed: allowed.clone(),
                value: value.to_string(),
            });
        }
    }

    if let (Some(pattern), Some(compiled)) = (&spec.pattern, spec.compiled_pattern()) {
        let regex = compiled.map_err(|e| ValueError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        if !regex.is_match(value) {
            return Err(ValueError::PatternMismatch {
                pattern: pattern.clone(),
                value: value.to_string(),
            });
        }
    }

    let length = value.chars().count();
    if let Some(min) = spec.min_length {
        if length < min {
            return Err(ValueError::TooShort { length, min });
        }
    }
    if let Some(max) = spec.max_length {
        if length > max {
            return Err(ValueError::TooLong { length, max });
        }
    }

    Ok(())
}

fn validate_range(spec: &ParamSpec, value: &ParamValue) -> Result<(), ValueError> {
    if let Some(min) = spec.minimum {
        if compare(value, min) == Some(Ordering::Less) {
            return Err(ValueError::TooSmall {
                value: value.clone(),
                min,
            });
        }
    }
    if let Some(max) = spec.maximum {
        if compare(value, max) == Some(Ordering::Greater) {
            return Err(ValueError::TooLarge {
                value: value.clone(),
                max,
            });
        }
    }

    Ok(())
}

/// Order a numeric value against a bound. Integers against integer bounds
/// compare exactly; anything involving a float compares as `f64`.
fn compare(value: &ParamValue, bound: Bound) -> Option<Ordering> {
    match (value, bound) {
        (ParamValue::Integer(v), Bound::Integer(b)) => Some(v.cmp(&b)),
        (ParamValue::Integer(_) | ParamValue::Number(_), bound) => {
            value.as_f64()?.partial_cmp(&bound.as_f64())
        }
        _ => None,
    }
}

fn no_constraints(_spec: &ParamSpec, _value: &ParamValue) -> Result<(), ValueError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(yaml: &str) -> ParamSpec {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_coerce_by_type() {
        assert_eq!(
            coerce(&spec("type: integer"), " 42 "),
            Ok(ParamValue::Integer(42))
        );
        assert_eq!(
            coerce(&spec("type: number"), "2.5"),
            Ok(ParamValue::Number(2.5))
        );
        assert_eq!(
            coerce(&spec("type: string"), "hello"),
            Ok(ParamValue::String("hello".into()))
        );
        assert_eq!(
            coerce(&spec("type: boolean"), "false"),
            Ok(ParamValue::Boolean(false))
        );
    }

    #[test]
    fn test_boolean_literals_are_case_sensitive() {
        let boolean = spec("type: boolean");
        assert!(coerce(&boolean, "True").is_err());
        assert!(coerce(&boolean, "1").is_err());
        assert!(coerce(&boolean, "yes").is_err());
    }

    #[test]
    fn test_coerce_date() {
        let value = coerce(&spec("type: date"), "Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(value.as_date().unwrap().timestamp(), 784111777);

        let value = coerce(&spec("type: date"), "Sun, 06 Nov 1994 10:49:37 +0200").unwrap();
        assert_eq!(value.as_date().unwrap().timestamp(), 784111777);

        assert!(coerce(&spec("type: date"), "yesterday").is_err());
    }

    #[test]
    fn test_invalid_number_message() {
        let err = coerce(&spec("type: integer"), "abc").unwrap_err();
        assert_eq!(err.to_string(), "invalid integer: 'abc'");
    }

    #[test]
    fn test_validate_enum_message() {
        let s = spec("enum: [a, b]");
        let err = validate(&s, &ParamValue::String("c".into())).unwrap_err();
        assert_eq!(err.to_string(), "not one of ['a', 'b']: 'c'");
    }

    #[test]
    fn test_validate_pattern_searches() {
        let s = spec("pattern: '[0-9]{3}'");
        assert!(validate(&s, &ParamValue::String("ab123cd".into())).is_ok());
        let err = validate(&s, &ParamValue::String("ab12".into())).unwrap_err();
        assert_eq!(err.to_string(), "does not match regexp '[0-9]{3}': 'ab12'");
    }

    #[test]
    fn test_validate_invalid_pattern() {
        let s = spec("pattern: '('");
        let err = validate(&s, &ParamValue::String("x".into())).unwrap_err();
        assert!(matches!(err, ValueError::InvalidPattern { .. }));
    }

    #[test]
    fn test_validate_length_counts_characters() {
        let s = spec("minLength: 2\nmaxLength: 3");
        assert!(validate(&s, &ParamValue::String("éé".into())).is_ok());
        assert_eq!(
            validate(&s, &ParamValue::String("é".into())),
            Err(ValueError::TooShort { length: 1, min: 2 })
        );
        assert_eq!(
            validate(&s, &ParamValue::String("abcd".into())),
            Err(ValueError::TooLong { length: 4, max: 3 })
        );
    }

    #[test]
    fn test_validate_range_messages() {
        let s = spec("type: number\nminimum: 0.5\nmaximum: 10");
        let err = validate(&s, &ParamValue::Number(0.25)).unwrap_err();
        assert_eq!(err.to_string(), "too small: 0.25 < 0.5");
        let err = validate(&s, &ParamValue::Number(11.0)).unwrap_err();
        assert_eq!(err.to_string(), "too large: 11 > 10");
    }

    #[test]
    fn test_boolean_and_date_have_no_constraints() {
        let s = spec("type: boolean\nminimum: 5");
        assert!(validate(&s, &ParamValue::Boolean(true)).is_ok());
    }

    #[test]
    fn test_default_text_for_integers() {
        let integer = spec("type: integer");
        assert_eq!(default_text(&integer, &Scalar::from("1.0")), "1");
        assert_eq!(default_text(&integer, &Scalar::from("-3.0")), "-3");
        assert_eq!(default_text(&integer, &Scalar::from("7")), "7");
        assert_eq!(default_text(&integer, &Scalar::from("1.5")), "1.5");
        assert_eq!(default_text(&spec("type: number"), &Scalar::from("1.0")), "1.0");
        assert_eq!(default_text(&spec("type: string"), &Scalar::from("1.0")), "1.0");
    }

    #[test]
    fn test_integer_bounds_compare_exactly() {
        let s = spec("type: integer\nmaximum: 9007199254740992");
        assert!(validate(&s, &ParamValue::Integer(9007199254740992)).is_ok());
        let err = validate(&s, &ParamValue::Integer(9007199254740993)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "too large: 9007199254740993 > 9007199254740992"
        );

        let s = spec("type: integer\nminimum: -9007199254740992");
        assert!(validate(&s, &ParamValue::Integer(-9007199254740993)).is_err());
    }

    #[test]
    fn test_float_bound_on_integer() {
        let s = spec("type: integer\nmaximum: 2.5");
        assert!(validate(&s, &ParamValue::Integer(2)).is_ok());
        assert!(validate(&s, &ParamValue::Integer(3)).is_err());
    }
}
