use super::error::{CalcError, DomainError, ValidationError};
use super::formulas::{solve_for_base, solve_for_final, solve_for_monthly};
use super::types::{CalculationRequest, Field, Solution, UseCase};

impl TryFrom<i64> for UseCase {
    type Error = CalcError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UseCase::FinalAmount),
            1 => Ok(UseCase::MonthlyContribution),
            2 => Ok(UseCase::BaseAmount),
            other => Err(CalcError::UnknownUseCase(other)),
        }
    }
}

impl UseCase {
    /// Runs the formula for this use case. Required inputs are checked before
    /// any arithmetic; `monthly` falls back to zero only where the formula
    /// treats it as optional.
    pub fn solve(self, request: &CalculationRequest) -> Result<Solution, CalcError> {
        let value = match self {
            UseCase::FinalAmount => {
                let base = require(request.base, Field::Base)?;
                let p_a = require(request.p_a, Field::Rate)?;
                let years = require(request.years, Field::Years)?;
                solve_for_final(base, p_a, years, request.monthly.unwrap_or(0.0))
            }
            UseCase::MonthlyContribution => {
                let final_amount = require(request.final_amount, Field::Final)?;
                let base = require(request.base, Field::Base)?;
                let p_a = require(request.p_a, Field::Rate)?;
                let years = require(request.years, Field::Years)?;
                solve_for_monthly(final_amount, base, p_a, years)?
            }
            UseCase::BaseAmount => {
                let final_amount = require(request.final_amount, Field::Final)?;
                let p_a = require(request.p_a, Field::Rate)?;
                let years = require(request.years, Field::Years)?;
                solve_for_base(final_amount, p_a, years, request.monthly.unwrap_or(0.0))?
            }
        };

        let solved_field = self.solved_field();
        if !value.is_finite() {
            return Err(DomainError::NonFiniteResult {
                field: solved_field,
            }
            .into());
        }
        Ok(Solution {
            use_case: self,
            solved_field,
            value,
        })
    }
}

fn require<T>(value: Option<T>, field: Field) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingInput(field))
}

/// Dispatches a raw selector identifier: 0 solves the final amount, 1 the
/// monthly contribution, 2 the base amount.
pub fn calculate(use_case: i64, request: &CalculationRequest) -> Result<Solution, CalcError> {
    UseCase::try_from(use_case)?.solve(request)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub use_case: UseCase,
    pub value: Result<f64, CalcError>,
}

/// Inputs recovered by feeding a solution back through the other two
/// solvers.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionCheck {
    pub recovered: Vec<Recovered>,
}

/// Fills the solved field into `request` and re-solves every other use case,
/// which should reproduce the inputs the caller supplied.
pub fn correction_check(request: &CalculationRequest, solution: &Solution) -> CorrectionCheck {
    let completed = request.with_solution(solution);
    let recovered = UseCase::ALL
        .into_iter()
        .filter(|use_case| *use_case != solution.use_case)
        .map(|use_case| Recovered {
            use_case,
            value: use_case.solve(&completed).map(|solution| solution.value),
        })
        .collect();
    CorrectionCheck { recovered }
}
