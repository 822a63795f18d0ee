//! Tabular and chart-ready views of projection results, plus CSV export.
//!
//! Values stay at full precision; rounding for display is left to whoever
//! renders the rows.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::core::{ProjectionParameters, ProjectionResult, WithdrawalParameters, WithdrawalResult};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthReportRow {
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Future Value")]
    pub future_value: f64,
    #[serde(rename = "Total Invested")]
    pub total_invested: f64,
    #[serde(rename = "Monthly Investment")]
    pub monthly_investment: f64,
    #[serde(rename = "Expected Annual Return (%)")]
    pub expected_annual_return_pct: f64,
    #[serde(rename = "Investment Duration (Years)")]
    pub duration_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WithdrawalDetailRow {
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Withdrawal (before tax)")]
    pub withdrawal_before_tax: f64,
    #[serde(rename = "Withdrawal (after tax)")]
    pub withdrawal_after_tax: f64,
    #[serde(rename = "Tax Paid")]
    pub tax_paid: f64,
    #[serde(rename = "Remaining Balance")]
    pub remaining_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WithdrawalSummaryRow {
    #[serde(rename = "Total Withdrawals (before tax)")]
    pub total_withdrawals_before_tax: f64,
    #[serde(rename = "Total Withdrawals (after tax)")]
    pub total_withdrawals_after_tax: f64,
    #[serde(rename = "Total Tax Paid")]
    pub total_tax_paid: f64,
    #[serde(rename = "Remaining Balance")]
    pub remaining_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub name: &'static str,
    pub points: Vec<(u32, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub series: Vec<ChartSeries>,
}

pub fn growth_report_rows(
    params: &ProjectionParameters,
    result: &ProjectionResult,
) -> Vec<GrowthReportRow> {
    result
        .monthly_trajectory()
        .iter()
        .map(|record| GrowthReportRow {
            month: record.month,
            future_value: record.current_value,
            total_invested: record.cumulative_invested,
            monthly_investment: params.monthly_contribution,
            expected_annual_return_pct: params.annual_return_rate * 100.0,
            duration_years: params.duration_years,
        })
        .collect()
}

pub fn withdrawal_detail_rows(result: &WithdrawalResult) -> Vec<WithdrawalDetailRow> {
    result
        .records()
        .into_iter()
        .map(|record| WithdrawalDetailRow {
            month: record.month,
            withdrawal_before_tax: record.withdrawal_pre_tax,
            withdrawal_after_tax: record.withdrawal_after_tax,
            tax_paid: record.tax,
            remaining_balance: record.remaining_balance,
        })
        .collect()
}

pub fn withdrawal_summary(result: &WithdrawalResult) -> WithdrawalSummaryRow {
    WithdrawalSummaryRow {
        total_withdrawals_before_tax: result.total_withdrawals_pre_tax,
        total_withdrawals_after_tax: result.total_withdrawals_after_tax,
        total_tax_paid: result.total_tax_paid,
        remaining_balance: result.remaining_balance,
    }
}

pub fn sip_charts(result: &ProjectionResult) -> Vec<Chart> {
    let trajectory = result.monthly_trajectory();
    let value: Vec<(u32, f64)> = trajectory.iter().map(|r| (r.month, r.current_value)).collect();
    let invested: Vec<(u32, f64)> = trajectory
        .iter()
        .map(|r| (r.month, r.cumulative_invested))
        .collect();
    let returns: Vec<(u32, f64)> = trajectory.iter().map(|r| (r.month, r.returns)).collect();

    vec![
        Chart {
            title: "Investment Growth Over Time",
            x_label: "Months",
            y_label: "Value",
            series: vec![ChartSeries {
                name: "Investment Growth",
                points: value.clone(),
            }],
        },
        Chart {
            title: "Total Contributions vs Total Value",
            x_label: "Months",
            y_label: "Amount",
            series: vec![
                ChartSeries {
                    name: "Total Contributions",
                    points: invested,
                },
                ChartSeries {
                    name: "Total Value",
                    points: value.clone(),
                },
            ],
        },
        Chart {
            title: "Returns vs Total Value",
            x_label: "Months",
            y_label: "Amount",
            series: vec![
                ChartSeries {
                    name: "Returns",
                    points: returns,
                },
                ChartSeries {
                    name: "Total Value",
                    points: value,
                },
            ],
        },
    ]
}

pub fn swp_charts(result: &WithdrawalResult) -> Vec<Chart> {
    let month_points = |values: &[f64]| -> Vec<(u32, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(idx, v)| (idx as u32 + 1, *v))
            .collect()
    };
    let balances = month_points(result.monthly_balances());
    let initial = vec![result.initial_balance; result.months()];

    vec![
        Chart {
            title: "Remaining Balance Over Time",
            x_label: "Months",
            y_label: "Balance",
            series: vec![ChartSeries {
                name: "Remaining Balance",
                points: balances.clone(),
            }],
        },
        Chart {
            title: "Withdrawals Over Time",
            x_label: "Months",
            y_label: "Withdrawals",
            series: vec![ChartSeries {
                name: "Withdrawal (after tax)",
                points: month_points(result.after_tax_withdrawal_history()),
            }],
        },
        Chart {
            title: "Initial Investment vs Remaining Balance",
            x_label: "Months",
            y_label: "Amount",
            series: vec![
                ChartSeries {
                    name: "Initial Investment",
                    points: month_points(&initial),
                },
                ChartSeries {
                    name: "Remaining Balance",
                    points: balances,
                },
            ],
        },
    ]
}

pub fn write_csv<W: Write, R: Serialize>(writer: W, rows: &[R]) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string<R: Serialize>(rows: &[R]) -> Result<String, ReportError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, rows)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn write_csv_file<R: Serialize>(path: &Path, rows: &[R]) -> Result<(), ReportError> {
    let file = File::create(path)?;
    write_csv(file, rows)
}

pub fn growth_report_file_name(params: &ProjectionParameters) -> String {
    format!(
        "investment_growth_report_{}_{}_{}.csv",
        params.monthly_contribution,
        params.annual_return_rate * 100.0,
        params.duration_years
    )
}

pub fn withdrawal_report_file_name(params: &WithdrawalParameters) -> String {
    format!(
        "swp_report_{}_{}_{}_{}.csv",
        params.initial_balance,
        params.monthly_withdrawal,
        params.tax_rate_percent,
        params.duration_years
    )
}

pub fn withdrawal_summary_file_name(params: &WithdrawalParameters) -> String {
    format!(
        "swp_summary_{}_{}_{}_{}.csv",
        params.initial_balance,
        params.monthly_withdrawal,
        params.tax_rate_percent,
        params.duration_years
    )
}
