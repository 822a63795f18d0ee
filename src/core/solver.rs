use tracing::debug;

use super::error::ProjectionError;
use super::numeric::{require_finite, require_positive};
use super::types::{BreakEvenTime, DEFAULT_MAX_MONTHS, MONTHS_PER_YEAR};

/// Searches month by month for the first point where the accumulated value
/// of a SIP exceeds the amount contributed.
///
/// The value side is the future value of the whole years completed so far
/// (`month / 12`), while the contributed side counts every month. Partial
/// years therefore never count toward break-even.
pub fn find_break_even(
    monthly_contribution: f64,
    annual_return_rate: f64,
) -> Result<BreakEvenTime, ProjectionError> {
    find_break_even_within(monthly_contribution, annual_return_rate, DEFAULT_MAX_MONTHS)
}

pub fn find_break_even_within(
    monthly_contribution: f64,
    annual_return_rate: f64,
    horizon_months: u32,
) -> Result<BreakEvenTime, ProjectionError> {
    validate_search(monthly_contribution, annual_return_rate)?;

    let growth = 1.0 + annual_return_rate / MONTHS_PER_YEAR as f64;
    let mut value = 0.0;
    let mut whole_year_value = 0.0;
    for month in 0..=horizon_months {
        if month > 0 {
            value = (value + monthly_contribution) * growth;
        }
        if month % MONTHS_PER_YEAR == 0 {
            whole_year_value = value;
        }
        if whole_year_value > monthly_contribution * month as f64 {
            debug!(monthly_contribution, annual_return_rate, month, "break-even found");
            return Ok(BreakEvenTime::from_months(month));
        }
    }

    Err(ProjectionError::BreakEvenNotReached { horizon_months })
}

fn validate_search(
    monthly_contribution: f64,
    annual_return_rate: f64,
) -> Result<(), ProjectionError> {
    require_positive("monthly_contribution", monthly_contribution)?;
    require_finite("annual_return_rate", annual_return_rate)?;
    if annual_return_rate <= 0.0 {
        return Err(ProjectionError::invalid(
            "annual_return_rate",
            "break-even is never reached without a positive return rate",
        ));
    }
    Ok(())
}
