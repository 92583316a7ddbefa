//! Patient chart command-line client.
//!
//! Prints the conditions and vitals overviews for a patient, computes BMI, and records a
//! vitals and biometrics encounter against an OpenMRS server.
//!
//! # Environment Variables
//! - `OPENMRS_BASE_URL`: server root, e.g. `https://demo.openmrs.org/openmrs` (required for
//!   every command that talks to the server)
//! - `OPENMRS_USERNAME` / `OPENMRS_PASSWORD`: basic authentication credentials
//! - `CHART_CONFIG`: path to a YAML chart configuration file (optional)

mod render;

use anyhow::Context;
use chart_core::{
    fetch_concept_metadata, fetch_session, BiometricsField, BiometricsForm, ChartConfig,
    ChartFetcher, ChartVital, ConceptMetadataIndex, ConditionsOverview, EncounterVitalsSaver,
    Overview, OverviewKind, PendingSave, SubmitOutcome, VitalsOverview, VitalsSaver,
    VitalsViewMode, WorkspaceLauncher,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use openmrs_client::{Credentials, OpenmrsClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "chart")]
#[command(about = "Patient chart overviews and vitals capture for OpenMRS")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a patient's conditions
    Conditions {
        /// FHIR Patient resource (JSON); its first identifier is searched on
        #[arg(long, conflicts_with = "identifier", required_unless_present = "identifier")]
        patient_file: Option<PathBuf>,
        /// Patient identifier to search on
        #[arg(long)]
        identifier: Option<String>,
        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Open the conditions form instead of listing
        #[arg(long)]
        add: bool,
    },
    /// Show a patient's vital signs
    Vitals {
        /// Patient UUID
        patient_uuid: Uuid,
        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Open the vitals form instead of listing
        #[arg(long)]
        add: bool,
        /// Chart one vital over time instead of the table
        #[arg(long, value_enum)]
        chart: Option<ChartArg>,
    },
    /// Compute body mass index from weight and height in the configured units
    Bmi {
        #[arg(long)]
        weight: String,
        #[arg(long)]
        height: String,
    },
    /// Record a vitals and biometrics encounter
    RecordVitals {
        /// Patient UUID
        patient_uuid: Uuid,
        #[command(flatten)]
        fields: VitalsArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartArg {
    Bp,
    Spo2,
    Temp,
    RespiratoryRate,
    Pulse,
}

impl From<ChartArg> for ChartVital {
    fn from(arg: ChartArg) -> Self {
        match arg {
            ChartArg::Bp => ChartVital::BloodPressure,
            ChartArg::Spo2 => ChartVital::OxygenSaturation,
            ChartArg::Temp => ChartVital::Temperature,
            ChartArg::RespiratoryRate => ChartVital::RespiratoryRate,
            ChartArg::Pulse => ChartVital::Pulse,
        }
    }
}

/// One flag per form field. Values are passed through as typed.
#[derive(Args)]
struct VitalsArgs {
    #[arg(long)]
    systolic: Option<String>,
    #[arg(long)]
    diastolic: Option<String>,
    #[arg(long)]
    pulse: Option<String>,
    #[arg(long)]
    oxygen_saturation: Option<String>,
    #[arg(long)]
    respiratory_rate: Option<String>,
    #[arg(long)]
    temperature: Option<String>,
    #[arg(long)]
    note: Option<String>,
    #[arg(long)]
    weight: Option<String>,
    #[arg(long)]
    height: Option<String>,
    #[arg(long)]
    muac: Option<String>,
}

impl VitalsArgs {
    fn into_fields(self) -> Vec<(BiometricsField, String)> {
        [
            (BiometricsField::SystolicBloodPressure, self.systolic),
            (BiometricsField::DiastolicBloodPressure, self.diastolic),
            (BiometricsField::Pulse, self.pulse),
            (BiometricsField::OxygenSaturation, self.oxygen_saturation),
            (BiometricsField::RespiratoryRate, self.respiratory_rate),
            (BiometricsField::Temperature, self.temperature),
            (BiometricsField::GeneralPatientNote, self.note),
            (BiometricsField::Weight, self.weight),
            (BiometricsField::Height, self.height),
            (BiometricsField::MidUpperArmCircumference, self.muac),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

/// Reports workspace navigation on the terminal.
struct ConsoleLauncher;

impl WorkspaceLauncher for ConsoleLauncher {
    fn attach(&self, slot: &str, workspace_id: &str) {
        println!("Opening workspace '{workspace_id}' in '{slot}'");
    }

    fn close(&self, workspace_id: &str) {
        println!("Closed workspace '{workspace_id}'");
    }
}

/// Main entry point for the chart CLI.
///
/// # Errors
/// Returns an error if:
/// - the logging configuration cannot be initialised,
/// - the chart configuration cannot be loaded or is invalid,
/// - a required environment variable is missing, or
/// - a command fails (including a vitals save that the server does not accept).
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chart=info".parse()?)
                .add_directive("openmrs_client=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    match cli.command {
        Some(Commands::Conditions {
            patient_file,
            identifier,
            page,
            add,
        }) => {
            let mut overview = match (patient_file, identifier) {
                (Some(path), _) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    let patient = fhir::Patient::parse(&text)?;
                    tracing::info!("showing conditions for {}", patient.display_name());
                    ConditionsOverview::for_patient(&config, &patient)?
                }
                (None, Some(identifier)) => {
                    ConditionsOverview::for_identifier(&config, &identifier)
                }
                (None, None) => anyhow::bail!("either --patient-file or --identifier is required"),
            };
            if add {
                overview.launch_form(&ConsoleLauncher);
                return Ok(());
            }
            let client = connect()?;
            load_page(&mut overview, &client, page).await;
            print!("{}", render::overview(&overview.view()));
        }
        Some(Commands::Vitals {
            patient_uuid,
            page,
            add,
            chart,
        }) => {
            if add {
                VitalsOverview::for_patient(&config, patient_uuid, None)
                    .launch_form(&ConsoleLauncher);
                return Ok(());
            }
            let client = connect()?;
            let metadata = concept_metadata(&client, &config).await;
            let mut overview = VitalsOverview::for_patient(&config, patient_uuid, metadata);
            if let Some(vital) = chart {
                overview.set_view_mode(VitalsViewMode::Chart);
                overview.select_chart_vital(vital.into());
            }
            load_page(&mut overview, &client, page).await;
            let chart = overview.chart();
            print!(
                "{}",
                render::vitals(&overview.view(), overview.view_mode(), chart.as_ref())
            );
        }
        Some(Commands::Bmi { weight, height }) => {
            let mut form = BiometricsForm::new(Uuid::nil(), config.biometrics().clone());
            form.set(BiometricsField::Weight, weight);
            form.set(BiometricsField::Height, height);
            match form.bmi() {
                Some(bmi) => println!("{}", render::bmi(&bmi, &config.biometrics().bmi_unit)),
                None => anyhow::bail!("BMI needs a positive numeric weight and height"),
            }
        }
        Some(Commands::RecordVitals {
            patient_uuid,
            fields,
        }) => {
            let client = Arc::new(connect()?);
            record_vitals(client, &config, patient_uuid, fields).await?;
        }
        None => {
            println!("Use 'chart --help' for commands");
        }
    }

    Ok(())
}

fn load_config() -> anyhow::Result<ChartConfig> {
    match std::env::var_os("CHART_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            tracing::info!("loading chart configuration from {}", path.display());
            ChartConfig::load(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(ChartConfig::default()),
    }
}

fn connect() -> anyhow::Result<OpenmrsClient> {
    let base_url =
        std::env::var("OPENMRS_BASE_URL").context("OPENMRS_BASE_URL must be set")?;
    let credentials = match (
        std::env::var("OPENMRS_USERNAME"),
        std::env::var("OPENMRS_PASSWORD"),
    ) {
        (Ok(username), Ok(password)) => Some(Credentials::new(username, password)),
        _ => {
            tracing::warn!("OPENMRS_USERNAME/OPENMRS_PASSWORD not set; sending no credentials");
            None
        }
    };
    Ok(OpenmrsClient::new(&base_url, credentials)?)
}

/// Concept metadata, or `None` if it cannot be fetched. Units and ranges are optional extras.
async fn concept_metadata<F>(fetcher: &F, config: &ChartConfig) -> Option<ConceptMetadataIndex>
where
    F: ChartFetcher + ?Sized,
{
    match fetch_concept_metadata(fetcher, config).await {
        Ok(metadata) => Some(metadata),
        Err(err) => {
            tracing::warn!("continuing without concept metadata: {err}");
            None
        }
    }
}

async fn load_page<K, F>(overview: &mut Overview<K>, fetcher: &F, page: usize)
where
    K: OverviewKind,
    F: ChartFetcher + ?Sized,
{
    overview.load(fetcher).await;
    let index = page.saturating_sub(1);
    if index > 0 && !overview.go_to_page(index) {
        tracing::warn!("page {page} is out of range; showing page 1");
    }
}

async fn record_vitals(
    client: Arc<OpenmrsClient>,
    config: &ChartConfig,
    patient_uuid: Uuid,
    fields: VitalsArgs,
) -> anyhow::Result<()> {
    let session = fetch_session(client.as_ref(), config).await?;
    let mut form = BiometricsForm::new(patient_uuid, config.biometrics().clone());
    if let Some(metadata) = concept_metadata(client.as_ref(), config).await {
        form = form.with_metadata(metadata);
    }
    for (field, value) in fields.into_fields() {
        form.set(field, value);
    }

    if let Some(bmi) = form.bmi() {
        println!("{}", render::bmi(&bmi, &config.biometrics().bmi_unit));
    }
    for field in BiometricsField::ALL {
        if let Some(class) = form
            .field_interpretation(field)
            .and_then(|i| i.css_class())
        {
            println!("{}: {} [{class}]", field.title(), form.value(field));
        }
    }

    let PendingSave { request, abort } = form.prepare_submission(&session, config)?;
    let ctrl_c = {
        let abort = abort.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted; cancelling save");
                abort.abort();
            }
        })
    };

    let saver = EncounterVitalsSaver::new(client, config.rest_base_path());
    let result = saver.save_patient_vitals(&request, abort).await;
    ctrl_c.abort();

    let outcome = form.finish_submission(result, &ConsoleLauncher);
    if let Some(notification) = form.notification() {
        println!("{}", render::notification(notification));
    }
    match outcome {
        SubmitOutcome::Saved => Ok(()),
        SubmitOutcome::Failed => anyhow::bail!("vitals were not saved"),
    }
}
