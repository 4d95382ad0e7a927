use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use fleetcheck::config::AppConfig;
use fleetcheck::error::AppError;
use fleetcheck::telemetry;
use fleetcheck::workflows::inspection::{
    inspection_router, ComplianceScoreResult, ComplianceStandard, ConditionRating, DirectoryError,
    DriverComplianceScore, DriverId, InspectionService, InspectionSession, InspectionStore,
    MaintenancePriority, OrganizationId, PersistenceError, RiskInputs, StandardSeverity,
    StandardsCsvImporter, StandardsError, StandardsStore, Vehicle, VehicleAspect,
    VehicleDirectory, VehicleId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Inspection Service",
    about = "Run the vehicle inspection and compliance scoring service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspection workflow utilities
    Inspection {
        #[command(subcommand)]
        command: InspectionCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Seed the standards store from a CSV export instead of the built-in defaults
    #[arg(long)]
    standards_csv: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum InspectionCommand {
    /// Run a canned walkaround check through the scoring engine
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Evaluation date for scoring (defaults to today)
    #[arg(long, value_parser = parse_date)]
    evaluation_date: Option<NaiveDate>,
    /// Optional standards CSV export to score against
    #[arg(long)]
    standards_csv: Option<PathBuf>,
    /// Print every regulatory note in the output
    #[arg(long)]
    list_notes: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Inspection {
            command: InspectionCommand::Demo(args),
        } => run_inspection_demo(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Fleet lookup backed by a fixed vehicle list. Stands in for the hosted
/// vehicle directory until the platform adapter is wired up.
struct StaticFleet {
    vehicles: Vec<Vehicle>,
}

impl StaticFleet {
    fn demo() -> Self {
        Self {
            vehicles: vec![
                Vehicle {
                    id: VehicleId("veh-101".to_string()),
                    number: "101".to_string(),
                    plate: "TRN-4821".to_string(),
                    make: "Blue Bird".to_string(),
                    model: "Vision".to_string(),
                },
                Vehicle {
                    id: VehicleId("veh-102".to_string()),
                    number: "102".to_string(),
                    plate: "TRN-5577".to_string(),
                    make: "Thomas".to_string(),
                    model: "Saf-T-Liner C2".to_string(),
                },
            ],
        }
    }
}

impl VehicleDirectory for StaticFleet {
    fn active_vehicles(
        &self,
        _organization: &OrganizationId,
    ) -> Result<Vec<Vehicle>, DirectoryError> {
        Ok(self.vehicles.clone())
    }
}

/// Standards store serving a fixed list, either imported from a CSV export
/// or the built-in defaults.
struct StaticStandards {
    standards: Vec<ComplianceStandard>,
}

impl StaticStandards {
    fn from_args(csv: Option<&PathBuf>) -> Result<Self, AppError> {
        let standards = match csv {
            Some(path) => StandardsCsvImporter::from_path(path)?,
            None => default_standards(),
        };
        Ok(Self { standards })
    }
}

impl StandardsStore for StaticStandards {
    fn standards(
        &self,
        _organization: &OrganizationId,
    ) -> Result<Vec<ComplianceStandard>, StandardsError> {
        Ok(self.standards.clone())
    }
}

fn default_standards() -> Vec<ComplianceStandard> {
    vec![
        ComplianceStandard {
            id: "std-0001".to_string(),
            organization: None,
            category: "mechanical".to_string(),
            requirement: "brakes service condition".to_string(),
            severity: StandardSeverity::Critical,
            points_deduction: 25,
            mandatory: true,
            regulation_ref: Some("FMCSA 393.40".to_string()),
        },
        ComplianceStandard {
            id: "std-0002".to_string(),
            organization: None,
            category: "safety".to_string(),
            requirement: "tires tread depth".to_string(),
            severity: StandardSeverity::High,
            points_deduction: 20,
            mandatory: true,
            regulation_ref: Some("FMCSA 393.75".to_string()),
        },
        ComplianceStandard {
            id: "std-0003".to_string(),
            organization: None,
            category: "safety".to_string(),
            requirement: "lights and reflectors".to_string(),
            severity: StandardSeverity::High,
            points_deduction: 15,
            mandatory: true,
            regulation_ref: Some("FMCSA 393.11".to_string()),
        },
    ]
}

/// In-memory persistence keeping submitted sessions with their scores as a
/// single entry, and driver rollups keyed on (driver, date).
#[derive(Default)]
struct MemoryStore {
    submissions: Mutex<Vec<(InspectionSession, ComplianceScoreResult)>>,
    driver_scores: Mutex<Vec<DriverComplianceScore>>,
}

impl InspectionStore for MemoryStore {
    fn save_submission(
        &self,
        session: &InspectionSession,
        score: &ComplianceScoreResult,
    ) -> Result<(), PersistenceError> {
        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
        guard.push((session.clone(), score.clone()));
        Ok(())
    }

    fn upsert_driver_score(&self, score: &DriverComplianceScore) -> Result<(), PersistenceError> {
        let mut guard = self.driver_scores.lock().expect("score mutex poisoned");
        guard.retain(|existing| {
            !(existing.driver == score.driver && existing.score_date == score.score_date)
        });
        guard.push(score.clone());
        Ok(())
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let fleet = Arc::new(StaticFleet::demo());
    let standards = Arc::new(StaticStandards::from_args(args.standards_csv.as_ref())?);
    let store = Arc::new(MemoryStore::default());
    let service = Arc::new(InspectionService::new(fleet, standards, store));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(inspection_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fleet inspection service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_inspection_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        evaluation_date,
        standards_csv,
        list_notes,
    } = args;

    let evaluation_date = evaluation_date.unwrap_or_else(|| Local::now().date_naive());

    let fleet = Arc::new(StaticFleet::demo());
    let standards = Arc::new(StaticStandards::from_args(standards_csv.as_ref())?);
    let store = Arc::new(MemoryStore::default());
    let service = InspectionService::new(fleet, standards, store);

    let driver = DriverId("drv-demo".to_string());
    let organization = OrganizationId("org-demo".to_string());

    let session_id = service.begin_inspection(driver.clone(), organization.clone())?;
    service.select_vehicle(&session_id, VehicleId("veh-101".to_string()))?;
    service.set_mileage(&session_id, 48_210)?;
    service.set_fuel_level(&session_id, 65)?;

    let readings = [
        (VehicleAspect::Engine, ConditionRating::Good, None),
        (
            VehicleAspect::Brakes,
            ConditionRating::Poor,
            Some("grinding on hard stops".to_string()),
        ),
        (VehicleAspect::Tires, ConditionRating::Fair, None),
        (VehicleAspect::Lights, ConditionRating::Good, None),
        (VehicleAspect::Interior, ConditionRating::Good, None),
        (VehicleAspect::Exterior, ConditionRating::Good, None),
        (VehicleAspect::Fluids, ConditionRating::Good, None),
    ];
    for (aspect, rating, note) in readings {
        service.set_observation(&session_id, aspect, rating, note)?;
    }
    service.report_issue(&session_id, "Wiper blade streaking on driver side")?;
    service.set_maintenance(&session_id, true, MaintenancePriority::High)?;

    let score = service.submit_inspection(&session_id, evaluation_date)?;

    render_score(&score, evaluation_date, list_notes);

    let rollup = service.compute_driver_risk(
        driver,
        organization,
        evaluation_date,
        RiskInputs {
            vehicle_check_score: score.score,
            safety_score: 88,
            documentation_score: 95,
            incident_count: 0,
        },
    )?;

    println!("\nDriver risk rollup");
    println!(
        "- overall {} ({} risk)",
        rollup.overall_score,
        rollup.risk_level_label()
    );
    println!("- {}", rollup.notes);

    Ok(())
}

fn render_score(score: &ComplianceScoreResult, evaluation_date: NaiveDate, list_notes: bool) {
    println!("Vehicle inspection demo");
    println!("Evaluated {}", evaluation_date);
    println!(
        "\nCompliance score: {} ({})",
        score.score,
        score.status.label()
    );
    println!("Next inspection due: {}", score.next_due);

    if score.regulatory_notes.is_empty() {
        println!("Regulatory notes: none");
    } else if list_notes {
        println!("\nRegulatory notes");
        for note in &score.regulatory_notes {
            println!("- {note}");
        }
    } else {
        println!("Regulatory notes: {}", score.regulatory_notes.len());
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
