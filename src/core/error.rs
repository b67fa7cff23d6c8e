use thiserror::Error;

use super::types::Field;

/// Mathematically undefined calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("base amount is undefined for a -100% rate")]
    TotalLossRate,

    #[error("monthly contribution is undefined with zero years")]
    ZeroPeriods,

    #[error("monthly contribution is undefined: contributions at {p_a}% over {years} years sum to zero")]
    ZeroContributionGrowth { p_a: f64, years: u32 },

    #[error("{field} is not a finite number for these inputs")]
    NonFiniteResult { field: Field },
}

/// Raw input that never reaches a formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing input: {0}")]
    MissingInput(Field),

    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: Field, value: String },

    #[error("{field} must be a whole number of years >= 0, got {value:?}")]
    InvalidYears { field: Field, value: String },

    #[error("{field} must be finite, got {value:?}")]
    NotFinite { field: Field, value: String },

    #[error("unknown input field {0:?}")]
    UnknownField(String),

    #[error("{0} was supplied more than once")]
    DuplicateField(Field),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "unknown use case {0}; expected 0 (final amount), 1 (monthly contribution) or 2 (base amount)"
    )]
    UnknownUseCase(i64),
}

impl CalcError {
    /// Stable category name for callers that render errors.
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::Domain(_) => "domain",
            CalcError::Validation(_) => "validation",
            CalcError::UnknownUseCase(_) => "selector",
        }
    }
}
