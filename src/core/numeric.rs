use super::error::ProjectionError;
use super::types::FutureValueMethod;

/// Monthly rates closer to zero than this use the linear path; the annuity
/// formula divides by the rate.
pub const RATE_EPSILON: f64 = 1e-12;

pub fn is_effectively_zero(rate: f64) -> bool {
    rate.abs() < RATE_EPSILON
}

/// Future value of `months` contributions paid at the start of each month.
pub fn annuity_due_future_value(
    contribution: f64,
    monthly_rate: f64,
    months: u32,
) -> (f64, FutureValueMethod) {
    if is_effectively_zero(monthly_rate) {
        return (contribution * months as f64, FutureValueMethod::Linear);
    }
    let growth = 1.0 + monthly_rate;
    let compounded = match i32::try_from(months) {
        Ok(exponent) => growth.powi(exponent),
        Err(_) => growth.powf(f64::from(months)),
    };
    (
        contribution * ((compounded - 1.0) / monthly_rate) * growth,
        FutureValueMethod::AnnuityDue,
    )
}

pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<(), ProjectionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::invalid(name, "must be a finite number"))
    }
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), ProjectionError> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ProjectionError::invalid(
            name,
            format!("must be > 0, got {value}"),
        ))
    }
}

pub(crate) fn require_non_negative(
    name: &'static str,
    value: f64,
) -> Result<(), ProjectionError> {
    require_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ProjectionError::invalid(
            name,
            format!("must be >= 0, got {value}"),
        ))
    }
}

/// Growth factors at or below -100% per month wipe out (or invert) a balance.
pub(crate) fn require_monthly_rate(
    name: &'static str,
    monthly_rate: f64,
) -> Result<(), ProjectionError> {
    require_finite(name, monthly_rate)?;
    if monthly_rate > -1.0 {
        Ok(())
    } else {
        Err(ProjectionError::invalid(
            name,
            format!("monthly rate must be > -100%, got {:.4}%", monthly_rate * 100.0),
        ))
    }
}

pub(crate) fn require_horizon(months: u32, max_months: u32) -> Result<(), ProjectionError> {
    if months <= max_months {
        Ok(())
    } else {
        Err(ProjectionError::invalid(
            "duration_years",
            format!("{months} months exceeds the {max_months}-month limit"),
        ))
    }
}
