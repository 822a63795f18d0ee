use tracing::debug;

use super::error::ProjectionError;
use super::numeric::{
    annuity_due_future_value, require_horizon, require_monthly_rate, require_positive,
};
use super::types::{FutureValueMethod, MonthlyRecord, ProjectionParameters, ProjectionResult};

pub fn project_sip(params: &ProjectionParameters) -> Result<ProjectionResult, ProjectionError> {
    validate_sip(params)?;

    let contribution = params.monthly_contribution;
    let monthly_rate = params.monthly_rate();
    let total_months = params.total_months();

    let (future_value, method) = annuity_due_future_value(contribution, monthly_rate, total_months);
    let total_invested = contribution * total_months as f64;
    let monthly_trajectory = if params.include_trajectory {
        monthly_trajectory(contribution, monthly_rate, total_months)
    } else {
        Vec::new()
    };

    if method == FutureValueMethod::Linear && total_months > 0 {
        debug!(total_months, "zero monthly rate, using linear accumulation");
    }
    debug!(
        contribution,
        annual_return_rate = params.annual_return_rate,
        total_months,
        future_value,
        total_invested,
        "projected SIP"
    );

    Ok(ProjectionResult {
        future_value,
        total_invested,
        estimated_returns: future_value - total_invested,
        method,
        monthly_trajectory,
    })
}

/// Each contribution lands at the start of its month and compounds with the
/// running balance: `value = (value + contribution) * (1 + r)`.
pub fn monthly_trajectory(contribution: f64, monthly_rate: f64, months: u32) -> Vec<MonthlyRecord> {
    let growth = 1.0 + monthly_rate;
    let mut value = 0.0;
    let mut trajectory = Vec::with_capacity(months as usize);
    for month in 1..=months {
        value = (value + contribution) * growth;
        let cumulative_invested = contribution * month as f64;
        trajectory.push(MonthlyRecord {
            month,
            cumulative_invested,
            current_value: value,
            returns: value - cumulative_invested,
        });
    }
    trajectory
}

fn validate_sip(params: &ProjectionParameters) -> Result<(), ProjectionError> {
    require_positive("monthly_contribution", params.monthly_contribution)?;
    require_monthly_rate("annual_return_rate", params.monthly_rate())?;
    require_horizon(params.total_months(), params.limits.max_months)
}
