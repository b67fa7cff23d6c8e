//! Closed-form savings formulas.
//!
//! Every period is one year. [`solve_for_final`] adds a contribution of
//! `12 * monthly` at the start of each period, before that period's interest
//! is applied, and [`solve_for_base`] undoes exactly that. The closed form in
//! [`solve_for_monthly`] weights contributions by `q^0..q^(n-1)`, so it
//! recovers `monthly * q` rather than `monthly` from a [`solve_for_final`]
//! result.

use super::error::DomainError;
use super::types::Field;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Per-period growth multiplier for a percentage rate, `1 + p_a / 100`.
pub fn quotient(p_a: f64) -> f64 {
    1.0 + p_a / 100.0
}

/// One period of growth applied to `amount`.
pub fn interest(amount: f64, p_a: f64) -> f64 {
    amount * quotient(p_a)
}

/// Balance after `years` periods starting from `base`.
pub fn solve_for_final(base: f64, p_a: f64, years: u32, monthly: f64) -> f64 {
    let yearly = MONTHS_PER_YEAR * monthly;
    let mut amount = base;
    for _ in 0..years {
        amount = interest(amount + yearly, p_a);
    }
    amount
}

/// Base amount that grows into `final_amount`; runs [`solve_for_final`]
/// backwards one period at a time.
pub fn solve_for_base(
    final_amount: f64,
    p_a: f64,
    years: u32,
    monthly: f64,
) -> Result<f64, DomainError> {
    let q = quotient(p_a);
    if years > 0 && q == 0.0 {
        return Err(DomainError::TotalLossRate);
    }

    let yearly = MONTHS_PER_YEAR * monthly;
    let mut amount = final_amount;
    for _ in 0..years {
        amount = amount / q - yearly;
    }
    finite(amount, Field::Base)
}

/// Constant monthly contribution that grows `base` into `final_amount`:
/// `(final - base * q^n) / (12 * (q^0 + q^1 + ... + q^(n-1)))`.
pub fn solve_for_monthly(
    final_amount: f64,
    base: f64,
    p_a: f64,
    years: u32,
) -> Result<f64, DomainError> {
    if years == 0 {
        return Err(DomainError::ZeroPeriods);
    }

    let q = quotient(p_a);
    let mut growth = 1.0;
    let mut contribution_growth = 0.0;
    for _ in 0..years {
        contribution_growth += growth;
        growth *= q;
    }

    let numerator = final_amount - base * growth;
    let denominator = MONTHS_PER_YEAR * contribution_growth;
    if denominator == 0.0 {
        return Err(DomainError::ZeroContributionGrowth { p_a, years });
    }
    finite(numerator / denominator, Field::Monthly)
}

fn finite(value: f64, field: Field) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFiniteResult { field })
    }
}
