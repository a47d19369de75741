//! Request validation helpers shared by the HTTP handlers.
//!
//! Every failure becomes an `invalid_request` [`Error`] whose `details`
//! name the offending field and a stable code, e.g.
//! `{"field": "tags[1].label", "code": "blank"}`.

use serde_json::json;

use crate::domain::{
    AttributeKind, AttributeValidationError, Error, ImageUploadError, RecipeValidationError,
    UserValidationError,
};

/// Builder for field-scoped validation errors.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code,
        }))
    }

    fn with_value(self, code: &str, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code,
        }))
    }

    fn with_index(self, code: &str, index: usize, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value,
            "code": code,
        }))
    }
}

pub(crate) fn missing_field_error(field: &str) -> Error {
    ValidationError::new(field, format!("missing required field: {field}")).with_code("required")
}

pub(crate) fn user_validation_error(error: UserValidationError) -> Error {
    ValidationError::new(error.field(), error.to_string()).with_code(error.code())
}

pub(crate) fn recipe_validation_error(error: RecipeValidationError) -> Error {
    ValidationError::new(error.field(), error.to_string()).with_code(error.code())
}

/// Error for the name of the `index`-th entry of a nested collection, or of
/// a standalone attribute payload when `index` is `None`.
pub(crate) fn attribute_validation_error(
    kind: AttributeKind,
    index: Option<usize>,
    error: AttributeValidationError,
) -> Error {
    let field = match index {
        Some(index) => format!("{}[{index}].{}", kind.collection_field(), kind.name_field()),
        None => kind.name_field().to_owned(),
    };
    let message = format!("{}: {error}", kind.name_field());
    ValidationError::new(field, message).with_code(error.code())
}

pub(crate) fn image_validation_error(error: ImageUploadError) -> Error {
    ValidationError::new("image", error.to_string()).with_code(error.code())
}

pub(crate) fn invalid_id_error(field: &str, value: &str) -> Error {
    ValidationError::new(field, format!("{field} must be an integer id"))
        .with_value("invalid_id", value)
}

/// Parse a comma-separated id list such as `"1,2,3"`.
///
/// Blank input means no filter. Empty segments are skipped so `"1,"` is
/// accepted.
pub(crate) fn parse_id_list(raw: Option<&str>, field: &str) -> Result<Vec<i64>, Error> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .enumerate()
        .map(|(index, segment)| {
            segment.parse::<i64>().map_err(|_| {
                ValidationError::new(field, format!("{field} must contain integer ids"))
                    .with_index("invalid_id", index, segment)
            })
        })
        .collect()
}

/// Parse a `0`/`1`/`true`/`false` query flag; absent means `false`.
pub(crate) fn parse_flag(raw: Option<&str>, field: &str) -> Result<bool, Error> {
    match raw.map(str::trim) {
        None => Ok(false),
        Some("1") | Some("true") => Ok(true),
        Some("0") | Some("false") => Ok(false),
        Some(other) => Err(ValidationError::new(field, format!("{field} must be 0 or 1"))
            .with_value("invalid_flag", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    fn details(error: &Error) -> &Value {
        error.details().expect("details present")
    }

    #[rstest]
    #[case(None, vec![])]
    #[case(Some(""), vec![])]
    #[case(Some("3"), vec![3])]
    #[case(Some("1, 2,"), vec![1, 2])]
    fn id_lists_parse(#[case] raw: Option<&str>, #[case] expected: Vec<i64>) {
        assert_eq!(parse_id_list(raw, "tags").expect("valid list"), expected);
    }

    #[rstest]
    fn id_lists_report_the_bad_segment() {
        let err = parse_id_list(Some("1,abc"), "tags").expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(details(&err)["index"], 1);
        assert_eq!(details(&err)["value"], "abc");
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some("1"), true)]
    #[case(Some("true"), true)]
    #[case(Some("0"), false)]
    fn flags_parse(#[case] raw: Option<&str>, #[case] expected: bool) {
        assert_eq!(parse_flag(raw, "assigned_only").expect("valid flag"), expected);
    }

    #[rstest]
    fn unknown_flags_are_rejected() {
        let err = parse_flag(Some("yes"), "assigned_only").expect_err("invalid");
        assert_eq!(details(&err)["code"], "invalid_flag");
    }

    #[rstest]
    fn nested_attribute_errors_name_the_entry() {
        let err = attribute_validation_error(
            AttributeKind::Tag,
            Some(2),
            AttributeValidationError::Blank,
        );
        assert_eq!(details(&err)["field"], "tags[2].label");
        assert_eq!(details(&err)["code"], "blank");
    }
}
