mod error;
mod numeric;
mod sip;
mod solver;
mod swp;
mod types;

pub use error::ProjectionError;
pub use numeric::{RATE_EPSILON, annuity_due_future_value};
pub use sip::{monthly_trajectory, project_sip};
pub use solver::{find_break_even, find_break_even_within};
pub use swp::project_swp;
pub use types::{
    BreakEvenPoint, BreakEvenTime, DEFAULT_MAX_MONTHS, DEFAULT_SWP_GROWTH_RATE_PER_MONTH,
    FutureValueMethod, InvestmentBreakdown, MONTHS_PER_YEAR, MonthlyRecord, OverdrawPolicy,
    ProjectionLimits, ProjectionParameters, ProjectionResult, WithdrawalParameters,
    WithdrawalRecord, WithdrawalResult,
};
