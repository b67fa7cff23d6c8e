use std::fmt;

use serde::Serialize;

/// Input fields of a calculation, keyed the way the formulas name them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Base,
    Monthly,
    Years,
    #[serde(rename = "p_a")]
    Rate,
    Final,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Base => "base",
            Field::Monthly => "monthly",
            Field::Years => "years",
            Field::Rate => "p_a",
            Field::Final => "final",
        }
    }

    /// Form label shown next to the entry.
    pub fn label(self) -> &'static str {
        match self {
            Field::Base => "Base amount",
            Field::Monthly => "Monthly contributions",
            Field::Years => "Number of years",
            Field::Rate => "Interest",
            Field::Final => "Final amount",
        }
    }

    /// Resolves a raw field name. The form calls the rate `interest`.
    pub fn from_key(key: &str) -> Option<Field> {
        match key {
            "base" => Some(Field::Base),
            "monthly" => Some(Field::Monthly),
            "years" => Some(Field::Years),
            "p_a" | "interest" => Some(Field::Rate),
            "final" => Some(Field::Final),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.key())
    }
}

/// Which unknown a calculation solves for. The discriminants are the
/// selector identifiers used by the form and the HTTP API.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UseCase {
    FinalAmount = 0,
    MonthlyContribution = 1,
    BaseAmount = 2,
}

impl UseCase {
    pub const ALL: [UseCase; 3] = [
        UseCase::FinalAmount,
        UseCase::MonthlyContribution,
        UseCase::BaseAmount,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    /// The field this use case produces; the form makes it readonly.
    pub fn solved_field(self) -> Field {
        match self {
            UseCase::FinalAmount => Field::Final,
            UseCase::MonthlyContribution => Field::Monthly,
            UseCase::BaseAmount => Field::Base,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UseCase::FinalAmount => "Final amount",
            UseCase::MonthlyContribution => "Monthly contribution",
            UseCase::BaseAmount => "Base amount",
        }
    }

    /// Fields that must be present in the request. `monthly` is not listed
    /// for the final and base solvers because it defaults to zero there.
    pub fn required_fields(self) -> &'static [Field] {
        match self {
            UseCase::FinalAmount => &[Field::Base, Field::Rate, Field::Years],
            UseCase::MonthlyContribution => {
                &[Field::Final, Field::Base, Field::Rate, Field::Years]
            }
            UseCase::BaseAmount => &[Field::Final, Field::Rate, Field::Years],
        }
    }
}

/// One transient calculation request. Absent fields are `None`; the
/// selector decides which of them are required.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalculationRequest {
    pub base: Option<f64>,
    pub monthly: Option<f64>,
    pub years: Option<u32>,
    pub p_a: Option<f64>,
    pub final_amount: Option<f64>,
}

impl CalculationRequest {
    /// Returns a copy with the solved field filled in, which is what the
    /// form shows after a successful calculation.
    pub fn with_solution(mut self, solution: &Solution) -> Self {
        match solution.use_case.solved_field() {
            Field::Base => self.base = Some(solution.value),
            Field::Monthly => self.monthly = Some(solution.value),
            Field::Final => self.final_amount = Some(solution.value),
            Field::Years | Field::Rate => {}
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub use_case: UseCase,
    pub solved_field: Field,
    pub value: f64,
}
