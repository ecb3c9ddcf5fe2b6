use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    BalancePoint, BreakEvenDiscount, DEFAULT_MAX_INSTALLMENTS, GainPoint, InstallmentComparison,
    TAX_BRACKETS, TaxBracket, balance_schedule, break_even_discount, compare,
    gain_curve, installments_to_beat_discount, monthly_rate_from_annual,
};

/// Upper bound on installment counts accepted from the outside, keeping every
/// request's loop short.
const MAX_INSTALLMENTS_LIMIT: u32 = 600;

const DEFAULT_TOTAL: f64 = 1200.0;
const DEFAULT_ANNUAL_RATE_PERCENT: f64 = 14.9;
const DEFAULT_COMPARE_INSTALLMENTS: u32 = 3;
const DEFAULT_DISCOUNT_INSTALLMENTS: u32 = 12;
const DEFAULT_DISCOUNT_PERCENT: f64 = 10.0;

#[derive(Parser, Debug)]
#[command(
    name = "parcela",
    about = "Installments vs upfront payment calculator (invested principal + tiered income tax)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Net gain from paying in installments while the principal stays invested
    Compare(CompareArgs),
    /// Upfront discount that matches paying in installments
    Discount(DiscountArgs),
    /// Installments needed to beat an upfront discount
    Installments(InstallmentsArgs),
    /// Print the income tax bracket table
    Brackets,
    /// Serve the JSON HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct RateArgs {
    #[arg(
        long,
        default_value_t = DEFAULT_ANNUAL_RATE_PERCENT,
        allow_negative_numbers = true,
        help = "Annual portfolio return in percent"
    )]
    annual_rate: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Monthly return as a fraction; overrides --annual-rate"
    )]
    monthly_rate: Option<f64>,
}

/// `compare` and `discount` take the same flags but default to different
/// installment counts (3 and 12, as the original form did); clap binds
/// `default_value_t` per struct, hence two structs.
#[derive(Args, Debug, Clone, Copy)]
pub struct CompareArgs {
    #[arg(long, default_value_t = DEFAULT_TOTAL, allow_negative_numbers = true)]
    total: f64,
    #[arg(long, default_value_t = DEFAULT_COMPARE_INSTALLMENTS)]
    installments: u32,
    #[command(flatten)]
    rate: RateArgs,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct DiscountArgs {
    #[arg(long, default_value_t = DEFAULT_TOTAL, allow_negative_numbers = true)]
    total: f64,
    #[arg(long, default_value_t = DEFAULT_DISCOUNT_INSTALLMENTS)]
    installments: u32,
    #[command(flatten)]
    rate: RateArgs,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct InstallmentsArgs {
    #[arg(long, default_value_t = DEFAULT_TOTAL, allow_negative_numbers = true)]
    total: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_DISCOUNT_PERCENT,
        allow_negative_numbers = true,
        help = "Upfront discount in percent"
    )]
    discount: f64,
    #[arg(long, default_value_t = DEFAULT_MAX_INSTALLMENTS)]
    max_installments: u32,
    #[command(flatten)]
    rate: RateArgs,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ServeArgs {
    #[arg(long, env = "PARCELA_PORT", default_value_t = 8080)]
    port: u16,
}

/// Body of `/api/compare` and `/api/discount`; missing fields take the
/// endpoint's own defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PurchasePayload {
    total: Option<f64>,
    installments: Option<u32>,
    annual_rate: Option<f64>,
    monthly_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InstallmentsPayload {
    total: Option<f64>,
    discount: Option<f64>,
    max_installments: Option<u32>,
    annual_rate: Option<f64>,
    monthly_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    #[serde(flatten)]
    comparison: InstallmentComparison,
    balance_schedule: Vec<BalancePoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscountResponse {
    total: f64,
    installments: u32,
    monthly_rate: f64,
    #[serde(flatten)]
    break_even: BreakEvenDiscount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InstallmentsResponse {
    total: f64,
    discount_percent: f64,
    upfront_price: f64,
    discount_value: f64,
    monthly_rate: f64,
    max_installments: u32,
    viable: bool,
    installments: Option<u32>,
    net_gain: Option<f64>,
    gain_curve: Vec<GainPoint>,
}

#[derive(Debug, Serialize)]
struct TaxBracketsResponse {
    brackets: &'static [TaxBracket],
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Runs one CLI command: computing commands print JSON to stdout, `serve`
/// blocks on the HTTP server.
pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Compare(args) => print_json(&build_compare_response(args)?),
        Command::Discount(args) => print_json(&build_discount_response(args)?),
        Command::Installments(args) => print_json(&build_installments_response(args)?),
        Command::Brackets => print_json(&TaxBracketsResponse {
            brackets: TAX_BRACKETS,
        }),
        Command::Serve(args) => run_http_server(args.port)
            .await
            .map_err(|e| format!("Server error: {e}")),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| format!("Failed to render JSON: {e}"))?;
    println!("{rendered}");
    Ok(())
}

fn resolve_monthly_rate(rate: RateArgs) -> Result<f64, String> {
    if let Some(monthly) = rate.monthly_rate {
        if !monthly.is_finite() || monthly <= -1.0 {
            return Err("--monthly-rate must be a finite fraction > -1".to_string());
        }
        return Ok(monthly);
    }
    if !rate.annual_rate.is_finite() || rate.annual_rate <= -100.0 {
        return Err("--annual-rate must be a finite percentage > -100".to_string());
    }
    monthly_rate_from_annual(rate.annual_rate / 100.0).map_err(|e| e.to_string())
}

fn validate_total(total: f64) -> Result<(), String> {
    if !total.is_finite() || total <= 0.0 {
        return Err("--total must be a finite amount > 0".to_string());
    }
    Ok(())
}

fn validate_installment_count(flag: &str, value: u32) -> Result<(), String> {
    if value == 0 {
        return Err(format!("{flag} must be > 0"));
    }
    if value > MAX_INSTALLMENTS_LIMIT {
        return Err(format!("{flag} must be <= {MAX_INSTALLMENTS_LIMIT}"));
    }
    Ok(())
}

fn build_compare_response(args: CompareArgs) -> Result<CompareResponse, String> {
    validate_total(args.total)?;
    validate_installment_count("--installments", args.installments)?;
    let monthly_rate = resolve_monthly_rate(args.rate)?;

    let comparison =
        compare(args.total, args.installments, monthly_rate).map_err(|e| e.to_string())?;
    let balance_schedule =
        balance_schedule(args.total, args.installments, monthly_rate).map_err(|e| e.to_string())?;
    Ok(CompareResponse {
        comparison,
        balance_schedule,
    })
}

fn build_discount_response(args: DiscountArgs) -> Result<DiscountResponse, String> {
    validate_total(args.total)?;
    validate_installment_count("--installments", args.installments)?;
    let monthly_rate = resolve_monthly_rate(args.rate)?;

    let break_even = break_even_discount(args.total, args.installments, monthly_rate)
        .map_err(|e| e.to_string())?;
    Ok(DiscountResponse {
        total: args.total,
        installments: args.installments,
        monthly_rate,
        break_even,
    })
}

fn build_installments_response(args: InstallmentsArgs) -> Result<InstallmentsResponse, String> {
    validate_total(args.total)?;
    validate_installment_count("--max-installments", args.max_installments)?;
    if !(0.0..=100.0).contains(&args.discount) {
        return Err("--discount must be between 0 and 100".to_string());
    }
    let monthly_rate = resolve_monthly_rate(args.rate)?;

    let outcome =
        installments_to_beat_discount(args.total, args.discount, monthly_rate, args.max_installments)
            .map_err(|e| e.to_string())?;
    let gain_curve =
        gain_curve(args.total, monthly_rate, args.max_installments).map_err(|e| e.to_string())?;
    let upfront_price = args.total * (1.0 - args.discount / 100.0);

    Ok(InstallmentsResponse {
        total: args.total,
        discount_percent: args.discount,
        upfront_price,
        discount_value: args.total - upfront_price,
        monthly_rate,
        max_installments: args.max_installments,
        viable: outcome.is_viable(),
        installments: outcome.installments(),
        net_gain: outcome.net_gain(),
        gain_curve,
    })
}

fn default_rate_args_for_api() -> RateArgs {
    RateArgs {
        annual_rate: DEFAULT_ANNUAL_RATE_PERCENT,
        monthly_rate: None,
    }
}

fn rate_args_from_payload(annual_rate: Option<f64>, monthly_rate: Option<f64>) -> RateArgs {
    let mut rate = default_rate_args_for_api();
    if let Some(v) = annual_rate {
        rate.annual_rate = v;
    }
    rate.monthly_rate = monthly_rate;
    rate
}

fn compare_args_from_payload(payload: PurchasePayload) -> CompareArgs {
    CompareArgs {
        total: payload.total.unwrap_or(DEFAULT_TOTAL),
        installments: payload.installments.unwrap_or(DEFAULT_COMPARE_INSTALLMENTS),
        rate: rate_args_from_payload(payload.annual_rate, payload.monthly_rate),
    }
}

fn discount_args_from_payload(payload: PurchasePayload) -> DiscountArgs {
    DiscountArgs {
        total: payload.total.unwrap_or(DEFAULT_TOTAL),
        installments: payload
            .installments
            .unwrap_or(DEFAULT_DISCOUNT_INSTALLMENTS),
        rate: rate_args_from_payload(payload.annual_rate, payload.monthly_rate),
    }
}

fn installments_args_from_payload(payload: InstallmentsPayload) -> InstallmentsArgs {
    InstallmentsArgs {
        total: payload.total.unwrap_or(DEFAULT_TOTAL),
        discount: payload.discount.unwrap_or(DEFAULT_DISCOUNT_PERCENT),
        max_installments: payload.max_installments.unwrap_or(DEFAULT_MAX_INSTALLMENTS),
        rate: rate_args_from_payload(payload.annual_rate, payload.monthly_rate),
    }
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .route(
            "/api/discount",
            get(discount_get_handler).post(discount_post_handler),
        )
        .route(
            "/api/installments",
            get(installments_get_handler).post(installments_post_handler),
        )
        .route("/api/tax-brackets", get(tax_brackets_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "parcela HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/compare");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn tax_brackets_handler() -> Response {
    json_response(
        StatusCode::OK,
        TaxBracketsResponse {
            brackets: TAX_BRACKETS,
        },
    )
}

async fn compare_get_handler(Query(payload): Query<PurchasePayload>) -> Response {
    respond("compare", build_compare_response(compare_args_from_payload(payload)))
}

async fn compare_post_handler(Json(payload): Json<PurchasePayload>) -> Response {
    respond("compare", build_compare_response(compare_args_from_payload(payload)))
}

async fn discount_get_handler(Query(payload): Query<PurchasePayload>) -> Response {
    respond(
        "discount",
        build_discount_response(discount_args_from_payload(payload)),
    )
}

async fn discount_post_handler(Json(payload): Json<PurchasePayload>) -> Response {
    respond(
        "discount",
        build_discount_response(discount_args_from_payload(payload)),
    )
}

async fn installments_get_handler(Query(payload): Query<InstallmentsPayload>) -> Response {
    respond(
        "installments",
        build_installments_response(installments_args_from_payload(payload)),
    )
}

async fn installments_post_handler(Json(payload): Json<InstallmentsPayload>) -> Response {
    respond(
        "installments",
        build_installments_response(installments_args_from_payload(payload)),
    )
}

fn respond<T: Serialize>(endpoint: &str, result: Result<T, String>) -> Response {
    match result {
        Ok(body) => {
            debug!(endpoint, "request handled");
            json_response(StatusCode::OK, body)
        }
        Err(msg) => {
            warn!(endpoint, error = %msg, "rejected request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
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
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use clap::CommandFactory;
    use std::ffi::OsStr;
    use serde_json::Value;
    use tower::ServiceExt;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn compare_args_from_json(json: &str) -> Result<CompareArgs, String> {
        let payload = serde_json::from_str::<PurchasePayload>(json)
            .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
        Ok(compare_args_from_payload(payload))
    }

    fn installments_args_from_json(json: &str) -> Result<InstallmentsArgs, String> {
        let payload = serde_json::from_str::<InstallmentsPayload>(json)
            .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
        Ok(installments_args_from_payload(payload))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("valid request"),
            )
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let value = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, value)
    }

    #[test]
    fn empty_payload_uses_form_defaults() {
        let args = compare_args_from_json("{}").expect("json should parse");
        assert_approx(args.total, 1200.0);
        assert_eq!(args.installments, 3);
        assert_approx(args.rate.annual_rate, 14.9);
        assert_eq!(args.rate.monthly_rate, None);

        let args = installments_args_from_json("{}").expect("json should parse");
        assert_approx(args.discount, 10.0);
        assert_eq!(args.max_installments, 60);

        let args = discount_args_from_payload(PurchasePayload::default());
        assert_eq!(args.installments, 12);
    }

    #[test]
    fn payload_parses_camel_case_keys() {
        let json = r#"{
          "total": 2500,
          "discount": 7.5,
          "maxInstallments": 24,
          "annualRate": 12.0,
          "monthlyRate": 0.01
        }"#;
        let args = installments_args_from_json(json).expect("json should parse");
        assert_approx(args.total, 2500.0);
        assert_approx(args.discount, 7.5);
        assert_eq!(args.max_installments, 24);
        assert_approx(args.rate.annual_rate, 12.0);
        assert_eq!(args.rate.monthly_rate, Some(0.01));
    }

    #[test]
    fn monthly_rate_overrides_annual_rate() {
        let rate = RateArgs {
            annual_rate: 50.0,
            monthly_rate: Some(0.02),
        };
        assert_approx(resolve_monthly_rate(rate).expect("valid rate"), 0.02);

        let rate = RateArgs {
            annual_rate: 10.0,
            monthly_rate: None,
        };
        assert!((resolve_monthly_rate(rate).expect("valid rate") - 0.0079741).abs() < 1e-7);
    }

    #[test]
    fn rejects_invalid_rates() {
        let err = resolve_monthly_rate(RateArgs {
            annual_rate: -100.0,
            monthly_rate: None,
        })
        .expect_err("must reject total loss");
        assert!(err.contains("--annual-rate"));

        let err = resolve_monthly_rate(RateArgs {
            annual_rate: 10.0,
            monthly_rate: Some(f64::NAN),
        })
        .expect_err("must reject NaN");
        assert!(err.contains("--monthly-rate"));
    }

    #[test]
    fn compare_rejects_zero_installments_and_total() {
        let mut args = compare_args_from_payload(PurchasePayload::default());
        args.installments = 0;
        let err = build_compare_response(args).expect_err("must reject zero installments");
        assert!(err.contains("--installments"));

        let mut args = compare_args_from_payload(PurchasePayload::default());
        args.total = 0.0;
        let err = build_compare_response(args).expect_err("must reject zero total");
        assert!(err.contains("--total"));
    }

    #[test]
    fn installments_rejects_out_of_range_discount_and_cap() {
        let mut args = installments_args_from_payload(InstallmentsPayload::default());
        args.discount = 101.0;
        let err = build_installments_response(args).expect_err("must reject discount");
        assert!(err.contains("--discount"));

        let mut args = installments_args_from_payload(InstallmentsPayload::default());
        args.max_installments = MAX_INSTALLMENTS_LIMIT + 1;
        let err = build_installments_response(args).expect_err("must reject cap");
        assert!(err.contains("--max-installments"));
    }

    #[test]
    fn compare_response_includes_balance_schedule() {
        let args = compare_args_from_payload(PurchasePayload {
            total: Some(1000.0),
            installments: Some(2),
            annual_rate: None,
            monthly_rate: Some(1.0),
        });
        let response = build_compare_response(args).expect("valid inputs");
        assert_approx(response.comparison.net_gain, 2162.5);
        assert_eq!(response.balance_schedule.len(), 3);
        assert_approx(response.balance_schedule[1].balance, 1500.0);
        assert_approx(response.balance_schedule[2].balance, 2500.0);

        let json = serde_json::to_value(&response).expect("serializable");
        assert!(json.get("netGain").is_some());
        assert!(json.get("taxBracket").is_some());
        assert!(json.get("installmentsAdvantageous").is_some());
        assert!(json.get("balanceSchedule").is_some());
    }

    #[test]
    fn installments_response_reports_default_scenario() {
        let args = installments_args_from_payload(InstallmentsPayload::default());
        let response = build_installments_response(args).expect("valid inputs");
        assert!(response.viable);
        assert_eq!(response.installments, Some(15));
        assert_approx(response.discount_value, 120.0);
        assert_eq!(response.gain_curve.len(), 60);
    }

    #[test]
    fn installments_response_reports_not_viable() {
        let mut args = installments_args_from_payload(InstallmentsPayload::default());
        args.discount = 50.0;
        args.max_installments = 30;
        let response = build_installments_response(args).expect("valid inputs");
        assert!(!response.viable);
        assert_eq!(response.installments, None);
        assert_eq!(response.net_gain, None);

        let json = serde_json::to_value(&response).expect("serializable");
        assert_eq!(json["installments"], Value::Null);
        assert_eq!(json["viable"], Value::Bool(false));
    }

    #[tokio::test]
    async fn discount_endpoint_reads_query_string() {
        let (status, body) =
            get_json("/api/discount?total=1200&installments=12&annualRate=10").await;
        assert_eq!(status, StatusCode::OK);
        let discount = body["discountPercent"].as_f64().expect("number");
        assert!((discount - 5.495_528_231_135_339).abs() < 1e-6);
        assert_eq!(body["installments"], 12);
    }

    #[tokio::test]
    async fn invalid_query_returns_bad_request() {
        let (status, body) = get_json("/api/compare?installments=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error message")
                .contains("--installments")
        );
    }

    #[tokio::test]
    async fn overflowing_rate_returns_bad_request() {
        let (status, body) = get_json("/api/compare?installments=60&monthlyRate=1e10").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error message")
                .contains("overflowed")
        );

        let (status, _) = get_json("/api/discount?installments=60&monthlyRate=1e10").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn build_compare_response_rejects_overflow() {
        let mut args = compare_args_from_payload(PurchasePayload::default());
        args.installments = 60;
        args.rate.monthly_rate = Some(1e10);
        let err = build_compare_response(args).expect_err("must reject overflow");
        assert!(err.contains("overflowed"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_installments_with_negative_monthly_rate() {
        let cli = Cli::try_parse_from([
            "parcela",
            "installments",
            "--discount",
            "5",
            "--monthly-rate",
            "-0.01",
        ])
        .expect("valid args");
        match cli.command {
            Command::Installments(args) => {
                assert_approx(args.discount, 5.0);
                assert_eq!(args.rate.monthly_rate, Some(-0.01));
                assert_approx(args.rate.annual_rate, 14.9);
                assert_approx(args.total, 1200.0);
                assert_eq!(args.max_installments, 60);
            }
            other => panic!("expected installments command, got {other:?}"),
        }
    }

    #[test]
    fn cli_subcommands_use_their_own_installment_defaults() {
        let cli = Cli::try_parse_from(["parcela", "compare"]).expect("valid args");
        match cli.command {
            Command::Compare(args) => {
                assert_eq!(args.installments, 3);
                assert_approx(args.total, 1200.0);
            }
            other => panic!("expected compare command, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["parcela", "discount", "--total", "900"])
            .expect("valid args");
        match cli.command {
            Command::Discount(args) => {
                assert_eq!(args.installments, 12);
                assert_approx(args.total, 900.0);
            }
            other => panic!("expected discount command, got {other:?}"),
        }
    }

    #[test]
    fn cli_accepts_negative_annual_rate() {
        let cli = Cli::try_parse_from([
            "parcela",
            "compare",
            "--annual-rate",
            "-5",
            "--installments",
            "6",
        ])
        .expect("valid args");
        match cli.command {
            Command::Compare(args) => {
                assert_approx(args.rate.annual_rate, -5.0);
                assert_eq!(args.rate.monthly_rate, None);
                assert_eq!(args.installments, 6);
            }
            other => panic!("expected compare command, got {other:?}"),
        }
    }

    #[test]
    fn cli_serve_port_flag_and_env_fallback() {
        let cli = Cli::try_parse_from(["parcela", "serve", "--port", "9000"]).expect("valid args");
        match cli.command {
            Command::Serve(args) => assert_eq!(args.port, 9000),
            other => panic!("expected serve command, got {other:?}"),
        }

        let command = Cli::command();
        let serve = command
            .find_subcommand("serve")
            .expect("serve subcommand exists");
        let port = serve
            .get_arguments()
            .find(|arg| arg.get_id() == "port")
            .expect("port argument exists");
        assert_eq!(port.get_env(), Some(OsStr::new("PARCELA_PORT")));

        if std::env::var_os("PARCELA_PORT").is_none() {
            let cli = Cli::try_parse_from(["parcela", "serve"]).expect("valid args");
            match cli.command {
                Command::Serve(args) => assert_eq!(args.port, 8080),
                other => panic!("expected serve command, got {other:?}"),
            }
        }
    }

    #[test]
    fn cli_parses_brackets_and_rejects_unknown_subcommands() {
        let cli = Cli::try_parse_from(["parcela", "brackets"]).expect("valid args");
        assert!(matches!(cli.command, Command::Brackets));
        assert!(Cli::try_parse_from(["parcela", "amortize"]).is_err());
        assert!(Cli::try_parse_from(["parcela", "compare", "--installments", "-3"]).is_err());
    }

    #[tokio::test]
    async fn tax_brackets_endpoint_lists_table() {
        let (status, body) = get_json("/api/tax-brackets").await;
        assert_eq!(status, StatusCode::OK);
        let brackets = body["brackets"].as_array().expect("array");
        assert_eq!(brackets.len(), 4);
        assert_eq!(brackets[0]["maxDays"], 180);
        assert_eq!(brackets[3]["maxDays"], Value::Null);
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() {
        let (status, body) = get_json("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }
}
