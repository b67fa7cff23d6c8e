//! Turns raw form values into a [`CalculationRequest`].
//!
//! This is the only place that knows the form's conventions: the rate arrives
//! as `interest`, surrounding whitespace is ignored and an empty entry means
//! zero. The formulas never see strings.

use super::error::ValidationError;
use super::types::{CalculationRequest, Field};

/// Parses `(field name, raw value)` pairs. Fields that are not supplied stay
/// `None`, so the selector can tell "missing" apart from "empty".
pub fn parse_request<'a, I>(fields: I) -> Result<CalculationRequest, ValidationError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut request = CalculationRequest::default();
    for (key, raw) in fields {
        let field =
            Field::from_key(key).ok_or_else(|| ValidationError::UnknownField(key.to_string()))?;
        let slot_taken = match field {
            Field::Base => request.base.replace(parse_amount(field, raw)?).is_some(),
            Field::Monthly => request.monthly.replace(parse_amount(field, raw)?).is_some(),
            Field::Years => request.years.replace(parse_years(raw)?).is_some(),
            Field::Rate => request.p_a.replace(parse_amount(field, raw)?).is_some(),
            Field::Final => request
                .final_amount
                .replace(parse_amount(field, raw)?)
                .is_some(),
        };
        if slot_taken {
            return Err(ValidationError::DuplicateField(field));
        }
    }
    Ok(request)
}

pub fn parse_amount(field: Field, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })?;
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

pub fn parse_years(raw: &str) -> Result<u32, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidYears {
            field: Field::Years,
            value: raw.to_string(),
        })
}
