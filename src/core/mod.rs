mod error;
mod formulas;
mod input;
mod selector;
mod types;

pub use error::{CalcError, DomainError, ValidationError};
pub use formulas::{interest, quotient, solve_for_base, solve_for_final, solve_for_monthly};
pub use input::{parse_amount, parse_request, parse_years};
pub use selector::{CorrectionCheck, Recovered, calculate, correction_check};
pub use types::{CalculationRequest, Field, Solution, UseCase};
