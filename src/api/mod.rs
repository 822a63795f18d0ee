use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{
    BreakEvenPoint, BreakEvenTime, InvestmentBreakdown, OverdrawPolicy, ProjectionParameters,
    ProjectionResult, WithdrawalParameters, WithdrawalRecord, WithdrawalResult, find_break_even,
    project_sip, project_swp,
};
use crate::plan::{PlanResult, plan};
use crate::report::{
    Chart, growth_report_file_name, growth_report_rows, sip_charts, swp_charts, to_csv_string,
    withdrawal_detail_rows, withdrawal_report_file_name, withdrawal_summary,
    withdrawal_summary_file_name, write_csv_file,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliOverdrawPolicy {
    Continue,
    Cap,
}

impl From<CliOverdrawPolicy> for OverdrawPolicy {
    fn from(value: CliOverdrawPolicy) -> Self {
        match value {
            CliOverdrawPolicy::Continue => OverdrawPolicy::Continue,
            CliOverdrawPolicy::Cap => OverdrawPolicy::Cap,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiOverdrawPolicy {
    #[serde(alias = "negative")]
    Continue,
    #[serde(alias = "floor", alias = "stop-at-zero", alias = "stopAtZero")]
    Cap,
}

impl From<ApiOverdrawPolicy> for CliOverdrawPolicy {
    fn from(value: ApiOverdrawPolicy) -> Self {
        match value {
            ApiOverdrawPolicy::Continue => CliOverdrawPolicy::Continue,
            ApiOverdrawPolicy::Cap => CliOverdrawPolicy::Cap,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Which SWP table `--format csv` exports.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum SwpReport {
    /// One row per month
    #[default]
    Details,
    /// Totals and the remaining balance
    Summary,
}

#[derive(Parser, Debug)]
#[command(
    name = "sipswp",
    about = "SIP growth and SWP depletion projections (deterministic monthly compounding)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Project a systematic investment plan
    Sip {
        #[command(flatten)]
        args: SipArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Project a systematic withdrawal plan
    Swp {
        #[command(flatten)]
        args: SwpArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long, value_enum, default_value_t = SwpReport::Details)]
        report: SwpReport,
    },
    /// Time until a SIP is worth more than what was paid in
    BreakEven {
        #[arg(long, default_value_t = 1000.0)]
        monthly_contribution: f64,
        #[arg(long, default_value_t = 12.0, help = "Expected annual return in percent")]
        annual_return_rate: f64,
    },
    /// Accumulate with a SIP, then withdraw from its future value
    Plan {
        #[command(flatten)]
        sip: SipArgs,
        #[command(flatten)]
        swp: SwpArgs,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SipArgs {
    #[arg(long, default_value_t = 1000.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 12.0, help = "Expected annual return in percent, e.g. 12")]
    pub annual_return_rate: f64,
    #[arg(long, default_value_t = 10)]
    pub investment_years: u32,
    #[arg(long, help = "Skip the month-by-month trajectory")]
    pub no_trajectory: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SwpArgs {
    #[arg(long, default_value_t = 100_000.0)]
    pub initial_balance: f64,
    #[arg(long, default_value_t = 5000.0)]
    pub monthly_withdrawal: f64,
    #[arg(long, default_value_t = 20.0, help = "Tax on each withdrawal in percent")]
    pub tax_rate: f64,
    #[arg(long, default_value_t = 20)]
    pub withdraw_years: u32,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Growth of the remaining balance per month in percent"
    )]
    pub growth_rate_per_month: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliOverdrawPolicy::Continue,
        help = "continue: balance may go negative; cap: stop at zero"
    )]
    pub overdraw_policy: CliOverdrawPolicy,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    #[arg(long, help = "Write the report to this path instead of stdout")]
    pub output: Option<PathBuf>,
    #[arg(long, help = "Write the report to its default file name")]
    pub save: bool,
}

impl OutputArgs {
    fn destination(&self, default_csv_name: String) -> Option<PathBuf> {
        if let Some(path) = &self.output {
            return Some(path.clone());
        }
        if !self.save {
            return None;
        }
        Some(PathBuf::from(match self.format {
            OutputFormat::Csv => default_csv_name,
            OutputFormat::Json => default_csv_name.replace(".csv", ".json"),
        }))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipPayload {
    monthly_contribution: Option<f64>,
    annual_return_rate: Option<f64>,
    investment_years: Option<u32>,
    include_trajectory: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SwpPayload {
    initial_balance: Option<f64>,
    monthly_withdrawal: Option<f64>,
    tax_rate: Option<f64>,
    withdraw_years: Option<u32>,
    growth_rate_per_month: Option<f64>,
    overdraw_policy: Option<ApiOverdrawPolicy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BreakEvenPayload {
    monthly_contribution: Option<f64>,
    annual_return_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    monthly_contribution: Option<f64>,
    annual_return_rate: Option<f64>,
    investment_years: Option<u32>,
    monthly_withdrawal: Option<f64>,
    tax_rate: Option<f64>,
    withdraw_years: Option<u32>,
    growth_rate_per_month: Option<f64>,
    overdraw_policy: Option<ApiOverdrawPolicy>,
}

impl PlanPayload {
    fn split(self) -> (SipPayload, SwpPayload) {
        (
            SipPayload {
                monthly_contribution: self.monthly_contribution,
                annual_return_rate: self.annual_return_rate,
                investment_years: self.investment_years,
                include_trajectory: None,
            },
            SwpPayload {
                initial_balance: None,
                monthly_withdrawal: self.monthly_withdrawal,
                tax_rate: self.tax_rate,
                withdraw_years: self.withdraw_years,
                growth_rate_per_month: self.growth_rate_per_month,
                overdraw_policy: self.overdraw_policy,
            },
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SipResponse {
    projection: ProjectionResult,
    break_even: BreakEvenPoint,
    break_even_time: Option<BreakEvenTime>,
    breakdown: InvestmentBreakdown,
    charts: Vec<Chart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwpResponse {
    projection: WithdrawalResult,
    depleted_month: Option<u32>,
    records: Vec<WithdrawalRecord>,
    charts: Vec<Chart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BreakEvenResponse {
    years: u32,
    months: u32,
    total_months: u32,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_sip_params(args: &SipArgs) -> Result<ProjectionParameters, String> {
    if !args.monthly_contribution.is_finite() || args.monthly_contribution <= 0.0 {
        return Err("--monthly-contribution must be > 0".to_string());
    }

    if !args.annual_return_rate.is_finite() || args.annual_return_rate <= -1200.0 {
        return Err("--annual-return-rate must be > -1200".to_string());
    }

    let params = ProjectionParameters::new(
        args.monthly_contribution,
        args.annual_return_rate / 100.0,
        args.investment_years,
    );
    Ok(if args.no_trajectory {
        params.without_trajectory()
    } else {
        params
    })
}

fn build_swp_params(args: &SwpArgs) -> Result<WithdrawalParameters, String> {
    if !args.initial_balance.is_finite() || args.initial_balance < 0.0 {
        return Err("--initial-balance must be >= 0".to_string());
    }

    if !args.monthly_withdrawal.is_finite() || args.monthly_withdrawal <= 0.0 {
        return Err("--monthly-withdrawal must be > 0".to_string());
    }

    if !(0.0..=100.0).contains(&args.tax_rate) {
        return Err("--tax-rate must be between 0 and 100".to_string());
    }

    if args.withdraw_years == 0 {
        return Err("--withdraw-years must be > 0".to_string());
    }

    if !args.growth_rate_per_month.is_finite() || args.growth_rate_per_month <= -100.0 {
        return Err("--growth-rate-per-month must be > -100".to_string());
    }

    Ok(WithdrawalParameters::new(
        args.initial_balance,
        args.monthly_withdrawal,
        args.tax_rate,
        args.withdraw_years,
    )
    .with_growth_rate(args.growth_rate_per_month / 100.0)
    .with_overdraw_policy(args.overdraw_policy.into()))
}

fn default_sip_args() -> SipArgs {
    SipArgs {
        monthly_contribution: 1_000.0,
        annual_return_rate: 12.0,
        investment_years: 10,
        no_trajectory: false,
    }
}

fn default_swp_args() -> SwpArgs {
    SwpArgs {
        initial_balance: 100_000.0,
        monthly_withdrawal: 5_000.0,
        tax_rate: 20.0,
        withdraw_years: 20,
        growth_rate_per_month: 1.0,
        overdraw_policy: CliOverdrawPolicy::Continue,
    }
}

fn sip_args_from_payload(payload: SipPayload) -> SipArgs {
    let mut args = default_sip_args();
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_return_rate {
        args.annual_return_rate = v;
    }
    if let Some(v) = payload.investment_years {
        args.investment_years = v;
    }
    if let Some(v) = payload.include_trajectory {
        args.no_trajectory = !v;
    }
    args
}

fn swp_args_from_payload(payload: SwpPayload) -> SwpArgs {
    let mut args = default_swp_args();
    if let Some(v) = payload.initial_balance {
        args.initial_balance = v;
    }
    if let Some(v) = payload.monthly_withdrawal {
        args.monthly_withdrawal = v;
    }
    if let Some(v) = payload.tax_rate {
        args.tax_rate = v;
    }
    if let Some(v) = payload.withdraw_years {
        args.withdraw_years = v;
    }
    if let Some(v) = payload.growth_rate_per_month {
        args.growth_rate_per_month = v;
    }
    if let Some(v) = payload.overdraw_policy {
        args.overdraw_policy = v.into();
    }
    args
}

fn run_sip(args: &SipArgs) -> Result<(ProjectionParameters, SipResponse), String> {
    let params = build_sip_params(args)?;
    let projection = project_sip(&params).map_err(|e| e.to_string())?;
    // Non-positive rates never break even; the projection itself is still valid.
    let break_even_time =
        find_break_even(params.monthly_contribution, params.annual_return_rate).ok();
    let response = SipResponse {
        break_even: projection.break_even(),
        break_even_time,
        breakdown: projection.breakdown(),
        charts: sip_charts(&projection),
        projection,
    };
    Ok((params, response))
}

fn run_swp(args: &SwpArgs) -> Result<(WithdrawalParameters, SwpResponse), String> {
    let params = build_swp_params(args)?;
    let projection = project_swp(&params).map_err(|e| e.to_string())?;
    let response = SwpResponse {
        depleted_month: projection.depleted_month(),
        records: projection.records(),
        charts: swp_charts(&projection),
        projection,
    };
    Ok((params, response))
}

fn run_break_even(
    monthly_contribution: f64,
    annual_return_rate: f64,
) -> Result<BreakEvenResponse, String> {
    let time = find_break_even(monthly_contribution, annual_return_rate / 100.0)
        .map_err(|e| e.to_string())?;
    Ok(BreakEvenResponse {
        years: time.years,
        months: time.months,
        total_months: time.total_months(),
    })
}

fn run_plan(sip: &SipArgs, swp: &SwpArgs) -> Result<PlanResult, String> {
    let sip_params = build_sip_params(sip)?;
    let swp_params = build_swp_params(swp)?;
    plan(&sip_params, &swp_params).map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to serialize output: {e}"))
}

/// Runs every subcommand except `serve` and returns what should be printed.
pub fn run_command(command: Command) -> Result<String, String> {
    match command {
        Command::Sip { args, output } => {
            let (params, response) = run_sip(&args)?;
            let destination = output.destination(growth_report_file_name(&params));
            match output.format {
                OutputFormat::Json => emit(to_json(&response)?, destination),
                OutputFormat::Csv => {
                    let rows = growth_report_rows(&params, &response.projection);
                    emit_csv(&rows, destination)
                }
            }
        }
        Command::Swp {
            args,
            output,
            report,
        } => {
            let (params, response) = run_swp(&args)?;
            let file_name = match report {
                SwpReport::Details => withdrawal_report_file_name(&params),
                SwpReport::Summary => withdrawal_summary_file_name(&params),
            };
            let destination = output.destination(file_name);
            match (output.format, report) {
                (OutputFormat::Json, _) => emit(to_json(&response)?, destination),
                (OutputFormat::Csv, SwpReport::Details) => {
                    let rows = withdrawal_detail_rows(&response.projection);
                    emit_csv(&rows, destination)
                }
                (OutputFormat::Csv, SwpReport::Summary) => {
                    emit_csv(&[withdrawal_summary(&response.projection)], destination)
                }
            }
        }
        Command::BreakEven {
            monthly_contribution,
            annual_return_rate,
        } => to_json(&run_break_even(monthly_contribution, annual_return_rate)?),
        Command::Plan { sip, swp } => to_json(&run_plan(&sip, &swp)?),
        Command::Serve { .. } => Err("serve is handled by the async entry point".to_string()),
    }
}

fn emit(rendered: String, destination: Option<PathBuf>) -> Result<String, String> {
    match destination {
        Some(path) => {
            std::fs::write(&path, rendered)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            Ok(format!("Wrote report to {}", path.display()))
        }
        None => Ok(rendered),
    }
}

fn emit_csv<R: Serialize>(rows: &[R], destination: Option<PathBuf>) -> Result<String, String> {
    match destination {
        Some(path) => {
            write_csv_file(&path, rows)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            Ok(format!("Wrote report to {}", path.display()))
        }
        None => to_csv_string(rows).map_err(|e| e.to_string()),
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "SIP/SWP HTTP API listening");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route("/api/sip", get(sip_get_handler).post(sip_post_handler))
        .route("/api/sip/report.csv", get(sip_report_handler))
        .route("/api/swp", get(swp_get_handler).post(swp_post_handler))
        .route("/api/swp/report.csv", get(swp_report_handler))
        .route("/api/swp/summary.csv", get(swp_summary_handler))
        .route(
            "/api/break-even",
            get(break_even_get_handler).post(break_even_post_handler),
        )
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .fallback(not_found_handler)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn sip_get_handler(Query(payload): Query<SipPayload>) -> Response {
    sip_handler_impl(payload).await
}

async fn sip_post_handler(Json(payload): Json<SipPayload>) -> Response {
    sip_handler_impl(payload).await
}

async fn sip_handler_impl(payload: SipPayload) -> Response {
    debug!(?payload, "sip request");
    match run_sip(&sip_args_from_payload(payload)) {
        Ok((_, response)) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn sip_report_handler(Query(payload): Query<SipPayload>) -> Response {
    let mut args = sip_args_from_payload(payload);
    args.no_trajectory = false;
    let (params, response) = match run_sip(&args) {
        Ok(ok) => ok,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let rows = growth_report_rows(&params, &response.projection);
    csv_response(&rows, &growth_report_file_name(&params))
}

async fn swp_get_handler(Query(payload): Query<SwpPayload>) -> Response {
    swp_handler_impl(payload).await
}

async fn swp_post_handler(Json(payload): Json<SwpPayload>) -> Response {
    swp_handler_impl(payload).await
}

async fn swp_handler_impl(payload: SwpPayload) -> Response {
    debug!(?payload, "swp request");
    match run_swp(&swp_args_from_payload(payload)) {
        Ok((_, response)) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn swp_report_handler(Query(payload): Query<SwpPayload>) -> Response {
    let (params, response) = match run_swp(&swp_args_from_payload(payload)) {
        Ok(ok) => ok,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let rows = withdrawal_detail_rows(&response.projection);
    csv_response(&rows, &withdrawal_report_file_name(&params))
}

async fn swp_summary_handler(Query(payload): Query<SwpPayload>) -> Response {
    let (params, response) = match run_swp(&swp_args_from_payload(payload)) {
        Ok(ok) => ok,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let summary = withdrawal_summary(&response.projection);
    csv_response(&[summary], &withdrawal_summary_file_name(&params))
}

async fn break_even_get_handler(Query(payload): Query<BreakEvenPayload>) -> Response {
    break_even_handler_impl(payload).await
}

async fn break_even_post_handler(Json(payload): Json<BreakEvenPayload>) -> Response {
    break_even_handler_impl(payload).await
}

async fn break_even_handler_impl(payload: BreakEvenPayload) -> Response {
    let defaults = default_sip_args();
    let contribution = payload
        .monthly_contribution
        .unwrap_or(defaults.monthly_contribution);
    let rate = payload
        .annual_return_rate
        .unwrap_or(defaults.annual_return_rate);
    match run_break_even(contribution, rate) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn plan_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    plan_handler_impl(payload).await
}

async fn plan_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    plan_handler_impl(payload).await
}

async fn plan_handler_impl(payload: PlanPayload) -> Response {
    let (sip, swp) = payload.split();
    match run_plan(&sip_args_from_payload(sip), &swp_args_from_payload(swp)) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn no_store(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    no_store((status, Json(body)).into_response())
}

fn csv_response<R: Serialize>(rows: &[R], file_name: &str) -> Response {
    let body = match to_csv_string(rows) {
        Ok(body) => body,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };
    let disposition = format!("attachment; filename=\"{file_name}\"");
    no_store(
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            body,
        )
            .into_response(),
    )
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn json_output() -> OutputArgs {
        OutputArgs {
            format: OutputFormat::Json,
            output: None,
            save: false,
        }
    }

    #[test]
    fn build_sip_params_converts_percent_rate() {
        let params = build_sip_params(&default_sip_args()).expect("valid args");
        assert_approx(params.monthly_contribution, 1_000.0);
        assert_approx(params.annual_return_rate, 0.12);
        assert_eq!(params.duration_years, 10);
        assert!(params.include_trajectory);
    }

    #[test]
    fn build_sip_params_rejects_non_positive_contribution() {
        let mut args = default_sip_args();
        args.monthly_contribution = 0.0;
        let err = build_sip_params(&args).expect_err("must reject zero contribution");
        assert!(err.contains("--monthly-contribution"));
    }

    #[test]
    fn build_swp_params_converts_growth_and_policy() {
        let mut args = default_swp_args();
        args.growth_rate_per_month = 0.5;
        args.overdraw_policy = CliOverdrawPolicy::Cap;
        let params = build_swp_params(&args).expect("valid args");
        assert_approx(params.growth_rate_per_month, 0.005);
        assert_approx(params.tax_rate_percent, 20.0);
        assert_eq!(params.overdraw_policy, OverdrawPolicy::Cap);
    }

    #[test]
    fn build_swp_params_rejects_out_of_range_tax() {
        let mut args = default_swp_args();
        args.tax_rate = 150.0;
        let err = build_swp_params(&args).expect_err("must reject tax > 100");
        assert!(err.contains("--tax-rate"));
    }

    #[test]
    fn build_swp_params_rejects_zero_years() {
        let mut args = default_swp_args();
        args.withdraw_years = 0;
        let err = build_swp_params(&args).expect_err("must reject zero years");
        assert!(err.contains("--withdraw-years"));
    }

    #[test]
    fn sip_payload_overlays_defaults() {
        let payload: SipPayload = serde_json::from_str(
            r#"{ "monthlyContribution": 2500, "investmentYears": 15, "includeTrajectory": false }"#,
        )
        .expect("json should parse");
        let args = sip_args_from_payload(payload);
        assert_approx(args.monthly_contribution, 2_500.0);
        assert_approx(args.annual_return_rate, 12.0);
        assert_eq!(args.investment_years, 15);
        assert!(args.no_trajectory);
    }

    #[test]
    fn swp_payload_parses_policy_aliases() {
        let payload: SwpPayload = serde_json::from_str(
            r#"{ "initialBalance": 50000, "taxRate": 10, "overdrawPolicy": "floor" }"#,
        )
        .expect("json should parse");
        let args = swp_args_from_payload(payload);
        assert_approx(args.initial_balance, 50_000.0);
        assert_approx(args.tax_rate, 10.0);
        assert_approx(args.monthly_withdrawal, 5_000.0);
        assert_eq!(args.overdraw_policy, CliOverdrawPolicy::Cap);
    }

    #[test]
    fn plan_payload_ignores_initial_balance() {
        let payload: PlanPayload = serde_json::from_str(
            r#"{ "monthlyContribution": 500, "initialBalance": 1, "withdrawYears": 3 }"#,
        )
        .expect("unknown keys are ignored");
        let (sip, swp) = payload.split();
        assert_eq!(sip.monthly_contribution, Some(500.0));
        assert_eq!(swp.initial_balance, None);
        assert_eq!(swp.withdraw_years, Some(3));
    }

    #[test]
    fn sip_response_serializes_camel_case_keys() {
        let (_, response) = run_sip(&default_sip_args()).expect("valid");
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"futureValue\""));
        assert!(json.contains("\"totalInvested\""));
        assert!(json.contains("\"monthlyTrajectory\""));
        assert!(json.contains("\"breakEven\":{\"status\":\"reached\",\"month\":1}"));
        assert!(json.contains("\"breakEvenTime\":{\"years\":1,\"months\":0}"));
        assert!(json.contains("\"estimatedReturns\""));
        assert!(json.contains("\"title\":\"Investment Growth Over Time\""));
        assert_eq!(response.charts.len(), 3);
        assert_eq!(response.charts[0].series[0].points.len(), 120);
    }

    #[test]
    fn sip_with_zero_rate_has_no_break_even_time() {
        let mut args = default_sip_args();
        args.annual_return_rate = 0.0;
        let (_, response) = run_sip(&args).expect("zero rate is a valid projection");
        assert!(response.break_even_time.is_none());
        assert_eq!(response.break_even, BreakEvenPoint::NotReached);
    }

    #[test]
    fn swp_response_reports_depletion() {
        let mut args = default_swp_args();
        args.initial_balance = 1_000.0;
        args.withdraw_years = 1;
        let (_, response) = run_swp(&args).expect("valid");
        assert_eq!(response.depleted_month, Some(1));
        assert_eq!(response.records.len(), 12);
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"afterTaxWithdrawalHistory\""));
        assert!(json.contains("\"depletedMonth\":1"));
        assert!(json.contains("\"title\":\"Remaining Balance Over Time\""));
        assert_eq!(response.charts[1].series[0].points[0], (1, 4_000.0));
    }

    #[test]
    fn run_command_renders_swp_summary_csv() {
        let output = OutputArgs {
            format: OutputFormat::Csv,
            output: None,
            save: false,
        };
        let mut args = default_swp_args();
        args.initial_balance = 10_000.0;
        args.monthly_withdrawal = 1_000.0;
        args.withdraw_years = 1;
        let csv = run_command(Command::Swp {
            args,
            output,
            report: SwpReport::Summary,
        })
        .expect("csv output");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Total Withdrawals (before tax),Total Withdrawals (after tax),Total Tax Paid,Remaining Balance"
        );
        assert!(lines[1].starts_with("12000.0,9600.0,2400.0,"));
    }

    #[test]
    fn summary_report_saves_under_summary_file_name() {
        let dir = std::env::temp_dir().join(format!("sipswp-summary-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let mut args = default_swp_args();
        args.withdraw_years = 1;
        let (params, _) = run_swp(&args).expect("valid");
        let path = dir.join(withdrawal_summary_file_name(&params));
        let output = OutputArgs {
            format: OutputFormat::Csv,
            output: Some(path.clone()),
            save: false,
        };
        run_command(Command::Swp {
            args,
            output,
            report: SwpReport::Summary,
        })
        .expect("file written");
        let written = std::fs::read_to_string(&path).expect("summary exists");
        assert_eq!(written.lines().count(), 2);
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[tokio::test]
    async fn swp_summary_route_returns_csv_attachment() {
        let response = swp_summary_handler(Query(SwpPayload {
            withdraw_years: Some(1),
            ..SwpPayload::default()
        }))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"swp_summary_100000_5000_20_1.csv\""
        );
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn swp_summary_route_rejects_invalid_input() {
        let response = swp_summary_handler(Query(SwpPayload {
            tax_rate: Some(150.0),
            ..SwpPayload::default()
        }))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn run_command_renders_sip_csv() {
        let output = OutputArgs {
            format: OutputFormat::Csv,
            output: None,
            save: false,
        };
        let mut args = default_sip_args();
        args.investment_years = 1;
        let csv = run_command(Command::Sip { args, output }).expect("csv output");
        assert!(csv.starts_with("Month,Future Value,Total Invested"));
        assert_eq!(csv.lines().count(), 13);
    }

    #[test]
    fn run_command_renders_break_even_json() {
        let json = run_command(Command::BreakEven {
            monthly_contribution: 1_000.0,
            annual_return_rate: 12.0,
        })
        .expect("json output");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["years"], 1);
        assert_eq!(value["months"], 0);
        assert_eq!(value["totalMonths"], 12);
    }

    #[test]
    fn run_command_reports_unreachable_break_even() {
        let err = run_command(Command::BreakEven {
            monthly_contribution: 1_000.0,
            annual_return_rate: 0.0,
        })
        .expect_err("zero rate never breaks even");
        assert!(err.contains("annual_return_rate"));
    }

    #[test]
    fn run_command_plan_seeds_withdrawal() {
        let json = run_command(Command::Plan {
            sip: default_sip_args(),
            swp: default_swp_args(),
        })
        .expect("json output");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(
            value["withdrawal"]["initialBalance"],
            value["accumulation"]["futureValue"]
        );
    }

    #[test]
    fn run_command_writes_report_file() {
        let path = std::env::temp_dir().join(format!("sipswp-report-{}.csv", std::process::id()));
        let output = OutputArgs {
            format: OutputFormat::Csv,
            output: Some(path.clone()),
            save: false,
        };
        let message = run_command(Command::Swp {
            args: default_swp_args(),
            output,
            report: SwpReport::Details,
        })
        .expect("file written");
        assert!(message.starts_with("Wrote report to"));
        let written = std::fs::read_to_string(&path).expect("report exists");
        assert!(written.starts_with("Month,Withdrawal (before tax)"));
        assert_eq!(written.lines().count(), 241);
        std::fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn default_destination_uses_report_file_name() {
        let output = OutputArgs {
            format: OutputFormat::Json,
            output: None,
            save: true,
        };
        let destination = output.destination("swp_report_1_2_3_4.csv".to_string());
        assert_eq!(destination, Some(PathBuf::from("swp_report_1_2_3_4.json")));
        assert_eq!(json_output().destination("x.csv".to_string()), None);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "sipswp",
            "swp",
            "--initial-balance",
            "2500",
            "--overdraw-policy",
            "cap",
            "--format",
            "csv",
            "--report",
            "summary",
        ])
        .expect("valid cli");
        match cli.command {
            Command::Swp {
                args,
                output,
                report,
            } => {
                assert_approx(args.initial_balance, 2_500.0);
                assert_eq!(args.overdraw_policy, CliOverdrawPolicy::Cap);
                assert_eq!(output.format, OutputFormat::Csv);
                assert_eq!(report, SwpReport::Summary);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["sipswp", "serve", "9000"]).expect("valid cli");
        assert!(matches!(cli.command, Command::Serve { port: 9000 }));
    }
}
