//! Chains the two projectors: the SIP future value becomes the opening
//! balance of the withdrawal plan.

use serde::Serialize;

use crate::core::{
    ProjectionError, ProjectionParameters, ProjectionResult, WithdrawalParameters,
    WithdrawalResult, project_sip, project_swp,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub accumulation: ProjectionResult,
    pub withdrawal: WithdrawalResult,
}

/// `withdrawal.initial_balance` is ignored and replaced by the accumulated
/// future value.
pub fn plan(
    accumulation: &ProjectionParameters,
    withdrawal: &WithdrawalParameters,
) -> Result<PlanResult, ProjectionError> {
    let accumulated = project_sip(accumulation)?;
    let seeded = WithdrawalParameters {
        initial_balance: accumulated.future_value,
        ..withdrawal.clone()
    };
    let withdrawn = project_swp(&seeded)?;
    Ok(PlanResult {
        accumulation: accumulated,
        withdrawal: withdrawn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawal_starts_from_accumulated_value() {
        let sip = ProjectionParameters::new(1_000.0, 0.12, 10);
        let swp = WithdrawalParameters::new(0.0, 2_000.0, 20.0, 5);
        let result = plan(&sip, &swp).expect("valid plan");

        assert_eq!(
            result.withdrawal.initial_balance,
            result.accumulation.future_value
        );
        assert_eq!(result.withdrawal.depleted_month(), None);
    }

    #[test]
    fn zero_duration_accumulation_seeds_empty_fund() {
        let sip = ProjectionParameters::new(1_000.0, 0.12, 0);
        let swp = WithdrawalParameters::new(50_000.0, 2_000.0, 20.0, 1);
        let result = plan(&sip, &swp).expect("valid plan");

        assert_eq!(result.withdrawal.initial_balance, 0.0);
        assert_eq!(result.withdrawal.depleted_month(), Some(1));
    }

    #[test]
    fn invalid_withdrawal_fails_whole_plan() {
        let sip = ProjectionParameters::new(1_000.0, 0.12, 10);
        let swp = WithdrawalParameters::new(0.0, 2_000.0, 120.0, 5);
        assert!(plan(&sip, &swp).is_err());
    }
}
