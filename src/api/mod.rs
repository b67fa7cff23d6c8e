use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    CalcError, CalculationRequest, CorrectionCheck, Field, Solution, UseCase, correction_check,
    parse_request,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const HTML: &str = "text/html; charset=utf-8";
const CSS: &str = "text/css; charset=utf-8";
const JS: &str = "application/javascript; charset=utf-8";
const NO_STORE: (header::HeaderName, &str) = (header::CACHE_CONTROL, "no-store");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliSolveFor {
    Final,
    Monthly,
    Base,
}

impl From<CliSolveFor> for UseCase {
    fn from(value: CliSolveFor) -> Self {
        match value {
            CliSolveFor::Final => UseCase::FinalAmount,
            CliSolveFor::Monthly => UseCase::MonthlyContribution,
            CliSolveFor::Base => UseCase::BaseAmount,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "interest",
    about = "Compound interest savings calculator (solve for final amount, monthly contribution or base amount)",
    after_help = "Run `interest serve [port]` to start the HTTP form instead."
)]
struct Cli {
    #[arg(
        long,
        value_enum,
        default_value_t = CliSolveFor::Final,
        help = "Which amount to solve for"
    )]
    solve_for: CliSolveFor,
    #[arg(
        long,
        conflicts_with = "solve_for",
        allow_hyphen_values = true,
        help = "Numeric selector: 0 final amount, 1 monthly contribution, 2 base amount"
    )]
    use_case: Option<i64>,
    #[arg(long, allow_hyphen_values = true, help = "Base amount at time zero")]
    base: Option<String>,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Monthly contribution, paid in as 12x at the start of each year"
    )]
    monthly: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Number of yearly compounding periods")]
    years: Option<String>,
    #[arg(
        long,
        visible_alias = "p-a",
        allow_hyphen_values = true,
        help = "Annual interest rate in percent, e.g. 5"
    )]
    interest: Option<String>,
    #[arg(
        long = "final",
        allow_hyphen_values = true,
        help = "Final amount at the end of the period"
    )]
    final_amount: Option<String>,
    #[arg(
        long,
        help = "Feed the result back through the other solvers and print what they recover"
    )]
    check: bool,
    #[arg(long, help = "Print the result as JSON")]
    json: bool,
}

impl Cli {
    fn selector(&self) -> i64 {
        self.use_case
            .unwrap_or_else(|| i64::from(UseCase::from(self.solve_for).id()))
    }

    fn raw_fields(&self) -> Vec<(&'static str, String)> {
        [
            ("base", &self.base),
            ("monthly", &self.monthly),
            ("years", &self.years),
            ("interest", &self.interest),
            ("final", &self.final_amount),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }
}

/// Wire form of a single field: JSON numbers and strings are both accepted,
/// query strings always arrive as text.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    fn into_text(self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    use_case: Option<i64>,
    base: Option<FieldValue>,
    monthly: Option<FieldValue>,
    years: Option<FieldValue>,
    interest: Option<FieldValue>,
    #[serde(alias = "p_a")]
    p_a: Option<FieldValue>,
    #[serde(rename = "final")]
    final_amount: Option<FieldValue>,
    check: Option<bool>,
}

impl CalculatePayload {
    fn raw_fields(self) -> Vec<(&'static str, String)> {
        [
            ("base", self.base),
            ("monthly", self.monthly),
            ("years", self.years),
            ("interest", self.interest),
            ("p_a", self.p_a),
            ("final", self.final_amount),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v.into_text())))
        .collect()
    }
}

#[derive(Debug)]
struct ApiRequest {
    use_case: i64,
    request: CalculationRequest,
    check: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    use_case: u8,
    solved_field: Field,
    label: &'static str,
    result: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<Vec<CheckEntry>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckEntry {
    use_case: u8,
    solved_field: Field,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UseCaseInfo {
    id: u8,
    solved_field: Field,
    label: &'static str,
    required_fields: Vec<Field>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

fn parse_fields(fields: &[(&'static str, String)]) -> Result<CalculationRequest, CalcError> {
    Ok(parse_request(
        fields.iter().map(|(key, value)| (*key, value.as_str())),
    )?)
}

fn api_request_from_cli(cli: &Cli) -> Result<ApiRequest, CalcError> {
    Ok(ApiRequest {
        use_case: cli.selector(),
        request: parse_fields(&cli.raw_fields())?,
        check: cli.check,
    })
}

fn api_request_from_payload(payload: CalculatePayload) -> Result<ApiRequest, CalcError> {
    let use_case = payload.use_case.unwrap_or(0);
    let check = payload.check.unwrap_or(false);
    Ok(ApiRequest {
        use_case,
        request: parse_fields(&payload.raw_fields())?,
        check,
    })
}

fn solve(api_request: &ApiRequest) -> Result<CalculateResponse, CalcError> {
    let solution = crate::core::calculate(api_request.use_case, &api_request.request)?;
    let check = api_request
        .check
        .then(|| correction_check(&api_request.request, &solution));
    Ok(build_calculate_response(&solution, check.as_ref()))
}

fn build_calculate_response(
    solution: &Solution,
    check: Option<&CorrectionCheck>,
) -> CalculateResponse {
    CalculateResponse {
        use_case: solution.use_case.id(),
        solved_field: solution.solved_field,
        label: solution.use_case.label(),
        result: solution.value,
        check: check.map(|check| {
            check
                .recovered
                .iter()
                .map(|recovered| CheckEntry {
                    use_case: recovered.use_case.id(),
                    solved_field: recovered.use_case.solved_field(),
                    label: recovered.use_case.label(),
                    result: recovered.value.as_ref().ok().copied(),
                    error: recovered.value.as_ref().err().map(|e| e.to_string()),
                })
                .collect()
        }),
    }
}

fn render_text(response: &CalculateResponse) -> String {
    let mut out = format!("{}: {:.2}", response.label, response.result);
    if let Some(check) = &response.check {
        out.push_str("\nCorrection check:");
        for entry in check {
            match (entry.result, &entry.error) {
                (Some(value), _) => out.push_str(&format!("\n  {}: {value:.2}", entry.label)),
                (None, Some(error)) => out.push_str(&format!("\n  {}: {error}", entry.label)),
                (None, None) => {}
            }
        }
    }
    out
}

fn execute(cli: &Cli) -> Result<String, String> {
    let api_request = api_request_from_cli(cli).map_err(|e| e.to_string())?;
    let response = solve(&api_request).map_err(|e| e.to_string())?;
    debug!(
        use_case = response.use_case,
        result = response.result,
        "calculation solved"
    );
    if cli.json {
        serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode JSON: {e}"))
    } else {
        Ok(render_text(&response))
    }
}

/// One-shot calculation from command line arguments; prints the result to
/// stdout.
pub fn run_cli(args: Vec<String>) -> Result<(), String> {
    let cli = Cli::parse_from(args);
    let output = execute(&cli)?;
    println!("{output}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(|| async { static_asset(HTML, INDEX_HTML) }))
        .route("/index.html", get(|| async { static_asset(HTML, INDEX_HTML) }))
        .route("/styles.css", get(|| async { static_asset(CSS, STYLES_CSS) }))
        .route("/app.js", get(|| async { static_asset(JS, APP_JS) }))
        .route("/api/use-cases", get(use_cases_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "interest calculator listening");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        ErrorResponse {
            error: "Not found".to_string(),
            kind: "route",
        },
    )
}

async fn use_cases_handler() -> Response {
    let use_cases: Vec<UseCaseInfo> = UseCase::ALL
        .into_iter()
        .map(|use_case| UseCaseInfo {
            id: use_case.id(),
            solved_field: use_case.solved_field(),
            label: use_case.label(),
            required_fields: use_case.required_fields().to_vec(),
        })
        .collect();
    json_response(StatusCode::OK, use_cases)
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    let result = api_request_from_payload(payload).and_then(|request| solve(&request));
    match result {
        Ok(response) => {
            info!(
                use_case = response.use_case,
                result = response.result,
                "calculation solved"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "calculation rejected");
            error_response(&err)
        }
    }
}

fn static_asset(content_type: &'static str, body: &'static str) -> Response {
    ([(header::CONTENT_TYPE, content_type), NO_STORE], body).into_response()
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, [NO_STORE], Json(body)).into_response()
}

fn error_response(err: &CalcError) -> Response {
    let status = match err {
        CalcError::Domain(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CalcError::Validation(_) | CalcError::UnknownUseCase(_) => StatusCode::BAD_REQUEST,
    };
    json_response(
        status,
        ErrorResponse {
            error: err.to_string(),
            kind: err.kind(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DomainError, ValidationError};
    use axum::http::Uri;
    use serde_json::Value;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["interest"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments should parse")
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn cli_solves_final_amount_by_default() {
        let cli = cli(&[
            "--base",
            "1000",
            "--interest",
            "5",
            "--years",
            "10",
            "--monthly",
            "50",
        ]);
        assert_eq!(execute(&cli).expect("solvable"), "Final amount: 9552.97");
    }

    #[test]
    fn cli_solve_for_maps_to_selector() {
        assert_eq!(cli(&["--solve-for", "final"]).selector(), 0);
        assert_eq!(cli(&["--solve-for", "monthly"]).selector(), 1);
        assert_eq!(cli(&["--solve-for", "base"]).selector(), 2);
        assert_eq!(cli(&["--use-case", "2"]).selector(), 2);
    }

    #[test]
    fn cli_rejects_both_selector_forms() {
        let result = Cli::try_parse_from(["interest", "--solve-for", "base", "--use-case", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_accepts_negative_rates_and_rate_alias() {
        let cli = cli(&[
            "--solve-for",
            "base",
            "--final",
            "810",
            "--p-a",
            "-10",
            "--years",
            "2",
        ]);
        assert_eq!(execute(&cli).expect("solvable"), "Base amount: 1000.00");
    }

    #[test]
    fn cli_reports_selector_and_missing_input_errors() {
        let err = execute(&cli(&["--use-case", "3"])).expect_err("unknown use case");
        assert!(err.contains("unknown use case 3"), "{err}");

        let err = execute(&cli(&["--interest", "5", "--years", "10"])).expect_err("no base");
        assert_eq!(err, "missing input: Base amount (base)");
    }

    #[test]
    fn cli_empty_values_count_as_zero() {
        let cli = cli(&["--base", "", "--interest", "", "--years", "3", "--monthly", "10"]);
        assert_eq!(execute(&cli).expect("solvable"), "Final amount: 360.00");
    }

    #[test]
    fn cli_check_prints_recovered_inputs() {
        let cli = cli(&[
            "--base",
            "1000",
            "--interest",
            "5",
            "--years",
            "10",
            "--monthly",
            "50",
            "--check",
        ]);
        let output = execute(&cli).expect("solvable");
        assert_eq!(
            output,
            "Final amount: 9552.97\nCorrection check:\n  Monthly contribution: 52.50\n  Base amount: 1000.00"
        );
    }

    #[test]
    fn cli_json_output_contains_expected_fields() {
        let cli = cli(&[
            "--solve-for",
            "monthly",
            "--base",
            "0",
            "--interest",
            "0",
            "--years",
            "10",
            "--final",
            "12000",
            "--json",
        ]);
        let output = execute(&cli).expect("solvable");
        let json: Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(json["useCase"], 1);
        assert_eq!(json["solvedField"], "monthly");
        assert_eq!(json["label"], "Monthly contribution");
        assert_close(json["result"].as_f64().expect("number"), 100.0, 1e-9);
        assert!(json.get("check").is_none());
    }

    #[test]
    fn api_request_from_json_accepts_numbers_and_strings() {
        let request = api_request_from_json(
            r#"{"useCase": 2, "final": 1102.5, "interest": "5", "years": 2, "monthly": ""}"#,
        )
        .expect("valid payload");
        assert_eq!(request.use_case, 2);
        assert!(!request.check);
        assert_eq!(
            request.request,
            CalculationRequest {
                base: None,
                monthly: Some(0.0),
                years: Some(2),
                p_a: Some(5.0),
                final_amount: Some(1102.5),
            }
        );
    }

    #[test]
    fn api_request_from_json_accepts_rate_spellings() {
        for json in [r#"{"pA": 4}"#, r#"{"p_a": 4}"#, r#"{"interest": 4}"#] {
            let request = api_request_from_json(json).expect("valid payload");
            assert_eq!(request.request.p_a, Some(4.0), "{json}");
        }

        let err = api_request_from_json(r#"{"pA": 4, "interest": 4}"#).expect_err("duplicate");
        assert!(err.contains("more than once"), "{err}");
    }

    #[test]
    fn api_request_defaults_to_final_amount() {
        let request = api_request_from_json("{}").expect("empty payload");
        assert_eq!(request.use_case, 0);
        assert_eq!(request.request, CalculationRequest::default());
    }

    #[test]
    fn api_request_from_query_string() {
        let uri: Uri = "/api/calculate?useCase=1&base=1000&interest=5&years=10&final=9552.97&check=true"
            .parse()
            .expect("valid uri");
        let Query(payload) =
            Query::<CalculatePayload>::try_from_uri(&uri).expect("query should deserialize");
        let request = api_request_from_payload(payload).expect("valid payload");
        assert_eq!(request.use_case, 1);
        assert!(request.check);
        assert_eq!(request.request.final_amount, Some(9552.97));
        assert_eq!(request.request.years, Some(10));
    }

    #[test]
    fn api_request_rejects_fractional_years() {
        let err = api_request_from_payload(CalculatePayload {
            years: Some(FieldValue::Text("2.5".to_string())),
            ..CalculatePayload::default()
        })
        .expect_err("years must be whole");
        assert!(matches!(
            err,
            CalcError::Validation(ValidationError::InvalidYears { .. })
        ));
    }

    #[test]
    fn check_entries_carry_errors() {
        let request = ApiRequest {
            use_case: 0,
            request: CalculationRequest {
                base: Some(1000.0),
                p_a: Some(-100.0),
                years: Some(1),
                ..CalculationRequest::default()
            },
            check: true,
        };
        let response = solve(&request).expect("final amount is defined");
        assert_eq!(response.result, 0.0);
        let check = response.check.expect("check requested");
        assert_eq!(check.len(), 2);
        assert_eq!(check[1].solved_field, Field::Base);
        assert_eq!(check[1].result, None);
        assert_eq!(
            check[1].error.as_deref(),
            Some(DomainError::TotalLossRate.to_string().as_str())
        );
    }

    #[tokio::test]
    async fn calculate_handler_returns_solution() {
        let payload = serde_json::from_str::<CalculatePayload>(
            r#"{"useCase": 0, "base": "1000", "interest": "5", "years": "10", "monthly": "50", "final": ""}"#,
        )
        .expect("valid payload");
        let response = calculate_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );

        let json = body_json(response).await;
        assert_eq!(json["useCase"], 0);
        assert_eq!(json["solvedField"], "final");
        assert_eq!(json["label"], "Final amount");
        assert_close(json["result"].as_f64().expect("number"), 9552.97, 0.005);
    }

    #[tokio::test]
    async fn calculate_handler_maps_error_kinds_to_status() {
        let cases = [
            (
                r#"{"useCase": 2, "final": 1000, "interest": -100, "years": 3}"#,
                StatusCode::UNPROCESSABLE_ENTITY,
                "domain",
            ),
            (
                r#"{"useCase": 1, "final": 1000, "base": 0, "interest": 5, "years": 0}"#,
                StatusCode::UNPROCESSABLE_ENTITY,
                "domain",
            ),
            (
                r#"{"useCase": 0, "interest": 5, "years": 3}"#,
                StatusCode::BAD_REQUEST,
                "validation",
            ),
            (
                r#"{"useCase": 0, "base": "abc", "interest": 5, "years": 3}"#,
                StatusCode::BAD_REQUEST,
                "validation",
            ),
            (r#"{"useCase": 3}"#, StatusCode::BAD_REQUEST, "selector"),
        ];

        for (json, status, kind) in cases {
            let payload = serde_json::from_str::<CalculatePayload>(json).expect("valid payload");
            let response = calculate_handler_impl(payload).await;
            assert_eq!(response.status(), status, "{json}");
            let body = body_json(response).await;
            assert_eq!(body["kind"], kind, "{json}");
            assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
        }
    }

    #[tokio::test]
    async fn use_cases_handler_lists_readonly_fields() {
        let json = body_json(use_cases_handler().await).await;
        let use_cases = json.as_array().expect("array");
        assert_eq!(use_cases.len(), 3);
        assert_eq!(use_cases[0]["solvedField"], "final");
        assert_eq!(use_cases[1]["solvedField"], "monthly");
        assert_eq!(use_cases[2]["solvedField"], "base");
        assert_eq!(
            use_cases[1]["requiredFields"],
            serde_json::json!(["final", "base", "p_a", "years"])
        );
    }

    #[test]
    fn static_assets_are_not_cached() {
        let response = static_asset(CSS, STYLES_CSS);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&header::HeaderValue::from_static(CSS))
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );
        assert!(INDEX_HTML.contains("/app.js"));
    }

    #[tokio::test]
    async fn unknown_routes_are_json_404() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }
}
