use tracing::{debug, warn};

use super::error::ProjectionError;
use super::numeric::{
    require_finite, require_horizon, require_monthly_rate, require_non_negative, require_positive,
};
use super::types::{OverdrawPolicy, WithdrawalParameters, WithdrawalResult};

/// Simulates a withdrawal plan month by month.
///
/// Each month the pre-tax withdrawal leaves the balance first, then the
/// remainder grows by `growth_rate_per_month`. Tax is a flat share of the
/// amount withdrawn. Under [`OverdrawPolicy::Continue`] the balance is never
/// floored: once it turns negative the fund is exhausted and the remaining
/// months model withdrawals that could not really be paid.
pub fn project_swp(params: &WithdrawalParameters) -> Result<WithdrawalResult, ProjectionError> {
    validate_swp(params)?;

    let months = params.total_months();
    let capacity = months as usize;
    let mut monthly_balances = Vec::with_capacity(capacity);
    let mut pre_tax_withdrawal_history = Vec::with_capacity(capacity);
    let mut after_tax_withdrawal_history = Vec::with_capacity(capacity);
    let mut tax_history = Vec::with_capacity(capacity);
    let mut growth_history = Vec::with_capacity(capacity);

    let mut balance = params.initial_balance;
    let mut overdraw_reported = false;
    for month in 1..=months {
        let withdrawal = match params.overdraw_policy {
            OverdrawPolicy::Continue => params.monthly_withdrawal,
            OverdrawPolicy::Cap => params.monthly_withdrawal.min(balance.max(0.0)),
        };
        let tax = withdrawal * params.tax_rate_percent / 100.0;
        let after_tax = withdrawal - tax;

        balance -= withdrawal;
        let growth = balance * params.growth_rate_per_month;
        balance += growth;

        if balance < 0.0 && !overdraw_reported {
            warn!(month, balance, "withdrawals exceed the fund; balance continues below zero");
            overdraw_reported = true;
        }

        monthly_balances.push(balance);
        pre_tax_withdrawal_history.push(withdrawal);
        after_tax_withdrawal_history.push(after_tax);
        tax_history.push(tax);
        growth_history.push(growth);
    }

    let total_withdrawals_pre_tax: f64 = pre_tax_withdrawal_history.iter().sum();
    let total_withdrawals_after_tax: f64 = after_tax_withdrawal_history.iter().sum();
    let total_tax_paid: f64 = tax_history.iter().sum();

    debug!(
        initial_balance = params.initial_balance,
        monthly_withdrawal = params.monthly_withdrawal,
        tax_rate_percent = params.tax_rate_percent,
        months,
        remaining_balance = balance,
        "projected SWP"
    );

    Ok(WithdrawalResult {
        initial_balance: params.initial_balance,
        total_withdrawals_pre_tax,
        total_withdrawals_after_tax,
        total_tax_paid,
        remaining_balance: balance,
        monthly_balances,
        pre_tax_withdrawal_history,
        after_tax_withdrawal_history,
        tax_history,
        growth_history,
    })
}

fn validate_swp(params: &WithdrawalParameters) -> Result<(), ProjectionError> {
    require_non_negative("initial_balance", params.initial_balance)?;
    require_positive("monthly_withdrawal", params.monthly_withdrawal)?;
    require_finite("tax_rate_percent", params.tax_rate_percent)?;
    if !(0.0..=100.0).contains(&params.tax_rate_percent) {
        return Err(ProjectionError::invalid(
            "tax_rate_percent",
            format!("must be between 0 and 100, got {}", params.tax_rate_percent),
        ));
    }
    if params.duration_years == 0 {
        return Err(ProjectionError::invalid("duration_years", "must be > 0"));
    }
    require_monthly_rate("growth_rate_per_month", params.growth_rate_per_month)?;
    require_horizon(params.total_months(), params.limits.max_months)
}
