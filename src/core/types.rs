use serde::Serialize;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Upper bound on simulated months unless the host configures otherwise.
pub const DEFAULT_MAX_MONTHS: u32 = 1_200;

pub const DEFAULT_SWP_GROWTH_RATE_PER_MONTH: f64 = 0.01;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ProjectionLimits {
    pub max_months: u32,
}

impl Default for ProjectionLimits {
    fn default() -> Self {
        Self {
            max_months: DEFAULT_MAX_MONTHS,
        }
    }
}

/// Which closed form produced a SIP future value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FutureValueMethod {
    AnnuityDue,
    /// Zero monthly rate: contributions accumulate without growth.
    Linear,
}

/// What happens once withdrawals exceed the available balance.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverdrawPolicy {
    /// Keep withdrawing the full amount; the balance goes negative.
    #[default]
    Continue,
    /// Withdraw at most what is left and floor the balance at zero.
    ///
    /// The month's withdrawal is still taken before that month's growth, so a
    /// capped plan differs from a `Continue` plan only once the fund runs dry.
    Cap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionParameters {
    pub monthly_contribution: f64,
    /// Fractional annual rate, e.g. 0.12 for 12%.
    pub annual_return_rate: f64,
    pub duration_years: u32,
    pub include_trajectory: bool,
    pub limits: ProjectionLimits,
}

impl ProjectionParameters {
    pub fn new(monthly_contribution: f64, annual_return_rate: f64, duration_years: u32) -> Self {
        Self {
            monthly_contribution,
            annual_return_rate,
            duration_years,
            include_trajectory: true,
            limits: ProjectionLimits::default(),
        }
    }

    pub fn without_trajectory(mut self) -> Self {
        self.include_trajectory = false;
        self
    }

    pub fn total_months(&self) -> u32 {
        self.duration_years.saturating_mul(MONTHS_PER_YEAR)
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_return_rate / MONTHS_PER_YEAR as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalParameters {
    pub initial_balance: f64,
    pub monthly_withdrawal: f64,
    /// Flat tax applied to every withdrawal, in percent (0..=100).
    pub tax_rate_percent: f64,
    pub duration_years: u32,
    /// Fractional growth applied to the balance after each withdrawal.
    pub growth_rate_per_month: f64,
    pub overdraw_policy: OverdrawPolicy,
    pub limits: ProjectionLimits,
}

impl WithdrawalParameters {
    pub fn new(
        initial_balance: f64,
        monthly_withdrawal: f64,
        tax_rate_percent: f64,
        duration_years: u32,
    ) -> Self {
        Self {
            initial_balance,
            monthly_withdrawal,
            tax_rate_percent,
            duration_years,
            growth_rate_per_month: DEFAULT_SWP_GROWTH_RATE_PER_MONTH,
            overdraw_policy: OverdrawPolicy::Continue,
            limits: ProjectionLimits::default(),
        }
    }

    pub fn with_growth_rate(mut self, growth_rate_per_month: f64) -> Self {
        self.growth_rate_per_month = growth_rate_per_month;
        self
    }

    pub fn with_overdraw_policy(mut self, policy: OverdrawPolicy) -> Self {
        self.overdraw_policy = policy;
        self
    }

    pub fn total_months(&self) -> u32 {
        self.duration_years.saturating_mul(MONTHS_PER_YEAR)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: u32,
    pub cumulative_invested: f64,
    pub current_value: f64,
    pub returns: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub future_value: f64,
    pub total_invested: f64,
    pub estimated_returns: f64,
    pub method: FutureValueMethod,
    pub monthly_trajectory: Vec<MonthlyRecord>,
}

impl ProjectionResult {
    pub fn monthly_trajectory(&self) -> &[MonthlyRecord] {
        &self.monthly_trajectory
    }

    /// Derived from the trajectory; `NotReached` when it was not requested.
    pub fn break_even(&self) -> BreakEvenPoint {
        BreakEvenPoint::from_trajectory(&self.monthly_trajectory)
    }

    pub fn breakdown(&self) -> InvestmentBreakdown {
        InvestmentBreakdown {
            total_invested: self.total_invested,
            estimated_returns: self.estimated_returns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentBreakdown {
    pub total_invested: f64,
    pub estimated_returns: f64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum BreakEvenPoint {
    Reached { month: u32 },
    NotReached,
}

impl BreakEvenPoint {
    pub fn from_trajectory(trajectory: &[MonthlyRecord]) -> Self {
        trajectory
            .iter()
            .find(|record| record.current_value > record.cumulative_invested)
            .map(|record| BreakEvenPoint::Reached {
                month: record.month,
            })
            .unwrap_or(BreakEvenPoint::NotReached)
    }

    pub fn month(self) -> Option<u32> {
        match self {
            BreakEvenPoint::Reached { month } => Some(month),
            BreakEvenPoint::NotReached => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenTime {
    pub years: u32,
    pub months: u32,
}

impl BreakEvenTime {
    pub fn from_months(total_months: u32) -> Self {
        Self {
            years: total_months / MONTHS_PER_YEAR,
            months: total_months % MONTHS_PER_YEAR,
        }
    }

    pub fn total_months(self) -> u32 {
        self.years * MONTHS_PER_YEAR + self.months
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecord {
    pub month: u32,
    pub opening_balance: f64,
    pub withdrawal_pre_tax: f64,
    pub tax: f64,
    pub withdrawal_after_tax: f64,
    pub growth: f64,
    pub remaining_balance: f64,
}

/// A negative `remaining_balance` means the fund ran out and withdrawals
/// continued synthetically under `OverdrawPolicy::Continue`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResult {
    pub initial_balance: f64,
    pub total_withdrawals_pre_tax: f64,
    pub total_withdrawals_after_tax: f64,
    pub total_tax_paid: f64,
    pub remaining_balance: f64,
    pub monthly_balances: Vec<f64>,
    pub pre_tax_withdrawal_history: Vec<f64>,
    pub after_tax_withdrawal_history: Vec<f64>,
    pub tax_history: Vec<f64>,
    pub growth_history: Vec<f64>,
}

impl WithdrawalResult {
    pub fn monthly_balances(&self) -> &[f64] {
        &self.monthly_balances
    }

    pub fn after_tax_withdrawal_history(&self) -> &[f64] {
        &self.after_tax_withdrawal_history
    }

    pub fn months(&self) -> usize {
        self.monthly_balances.len()
    }

    /// First month that closes with nothing left.
    pub fn depleted_month(&self) -> Option<u32> {
        self.monthly_balances
            .iter()
            .position(|balance| *balance <= 0.0)
            .map(|idx| idx as u32 + 1)
    }

    pub fn records(&self) -> Vec<WithdrawalRecord> {
        let mut opening_balance = self.initial_balance;
        let mut records = Vec::with_capacity(self.months());
        for idx in 0..self.months() {
            let remaining_balance = self.monthly_balances[idx];
            records.push(WithdrawalRecord {
                month: idx as u32 + 1,
                opening_balance,
                withdrawal_pre_tax: self.pre_tax_withdrawal_history[idx],
                tax: self.tax_history[idx],
                withdrawal_after_tax: self.after_tax_withdrawal_history[idx],
                growth: self.growth_history[idx],
                remaining_balance,
            });
            opening_balance = remaining_balance;
        }
        records
    }
}
