//! MediFlow Schedule CLI
//!
//! Answers scheduling questions against a JSON fixture of staff, patients and
//! appointments, with the same authorization and validation the service
//! applies.
//!
//! Usage:
//!   mediflow-schedule --fixture <file> availability --doctor <id> --date <YYYY-MM-DD>
//!   mediflow-schedule --fixture <file> check --doctor <id> --start <RFC3339> [--exclude <id>]
//!   mediflow-schedule --fixture <file> list [--doctor <id>] [--patient <id>] [--status <s>]
//!   mediflow-schedule grants [--role <role>] [--permission <permission>]
//!
//! `availability` and `check` take `--duration <min>`; `list` takes `--page <n>`.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use mediflow_rbac::{Caller, GrantTable, Guard, Permission, Role};
use mediflow_scheduling::{
    Appointment, AppointmentFilter, AppointmentId, AppointmentService, AppointmentStatus,
    AppointmentStore, Availability, ConflictOutcome, ConflictQuery, Fixture, InMemoryStore, Page,
    PageRequest, PatientId, SchedulingConfig, DEFAULT_PAGE_SIZE,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mediflow-schedule")]
#[command(author = "MediFlow")]
#[command(version = "0.1.0")]
#[command(about = "Inspect doctor availability, conflicts and role grants", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON fixture with staff, patients and appointments
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Scheduling config (JSON); defaults to 09:00-17:00 in 30 minute steps
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Replacement grant table (JSON object of role -> permissions)
    #[arg(long, global = true)]
    grants: Option<PathBuf>,

    /// Role the request is made as
    #[arg(long = "as", global = true, default_value = "receptionist")]
    acting_role: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Slots for a doctor on one clinic-local day
    Availability {
        #[arg(short, long)]
        doctor: u64,

        /// Calendar day, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        /// Requested appointment length in minutes
        #[arg(long, default_value = "30")]
        duration: u32,
    },

    /// Would a booking collide with the doctor's calendar?
    Check {
        #[arg(short, long)]
        doctor: u64,

        /// Candidate start, RFC 3339
        #[arg(long)]
        start: DateTime<Utc>,

        #[arg(long, default_value = "30")]
        duration: u32,

        /// Appointment being rescheduled
        #[arg(long)]
        exclude: Option<u64>,
    },

    /// Appointments, newest first
    List {
        #[arg(short, long)]
        doctor: Option<u64>,

        #[arg(long)]
        patient: Option<u64>,

        /// scheduled, confirmed, in_progress, completed, cancelled or no_show
        #[arg(long)]
        status: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },

    /// Show the grant table
    Grants {
        /// Only this role's permissions
        #[arg(long)]
        role: Option<Role>,

        /// Only the roles holding this permission
        #[arg(long)]
        permission: Option<Permission>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => SchedulingConfig::from_path(path)?,
        None => SchedulingConfig::default(),
    };
    let grants = match &cli.grants {
        Some(path) => GrantTable::from_json_str(&fs::read_to_string(path)?)?,
        None => GrantTable::standard(),
    };
    let store = match &cli.fixture {
        Some(path) => {
            let fixture: Fixture = serde_json::from_str(&fs::read_to_string(path)?)?;
            info!(
                staff = fixture.staff.len(),
                patients = fixture.patients.len(),
                appointments = fixture.appointments.len(),
                "fixture loaded"
            );
            InMemoryStore::from_fixture(fixture)
        }
        None => InMemoryStore::new(),
    };

    let caller = Caller::with_role_token(0u64, &cli.acting_role);

    match cli.command {
        Commands::Grants { role, permission } => {
            print_grants(&grants, role, permission, cli.format)?;
        }
        command => {
            let service = AppointmentService::new(store, Guard::new(Arc::new(grants)), config);
            run_scheduling(&service, &caller, command, cli.format)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_scheduling(
    service: &AppointmentService<InMemoryStore>,
    caller: &Caller,
    command: Commands,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Availability { doctor, date, duration } => {
            let availability = service.availability(caller, doctor.into(), date, duration)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&availability)?),
                OutputFormat::Table => print_availability(&availability),
            }
        }
        Commands::Check {
            doctor,
            start,
            duration,
            exclude,
        } => {
            let query = ConflictQuery {
                doctor_id: doctor.into(),
                start_time: start,
                duration_minutes: duration,
                exclude_appointment_id: exclude.map(AppointmentId),
            };
            let outcome = service.check_conflict(caller, &query)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
                OutputFormat::Table => print_outcome(&outcome),
            }
        }
        Commands::List {
            doctor,
            patient,
            status,
            page,
            page_size,
        } => {
            let status = status
                .map(|token| {
                    serde_json::from_value::<AppointmentStatus>(serde_json::Value::String(token))
                })
                .transpose()?;
            let filter = AppointmentFilter {
                doctor_id: doctor.map(Into::into),
                patient_id: patient.map(PatientId),
                status,
                ..Default::default()
            };
            let listed = service.list(caller, &filter, PageRequest::new(page, page_size))?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listed)?),
                OutputFormat::Table => print_listing(service.store(), &listed)?,
            }
        }
        Commands::Grants { .. } => {}
    }

    Ok(())
}

fn print_listing(
    store: &InMemoryStore,
    listed: &Page<Appointment>,
) -> Result<(), Box<dyn std::error::Error>> {
    let heading = format!(
        "Page {}/{} ({} total)",
        listed.page,
        listed.total_pages.max(1),
        listed.total
    );
    println!("{}", heading.bold());
    for apt in &listed.items {
        let patient = match store.fetch_patient(apt.patient_id)? {
            Some(record) => record.full_name(),
            None => format!("patient {}", apt.patient_id),
        };
        println!(
            "  #{:<5} {} - {}  doctor {:<4} {:<24} {}",
            apt.id,
            apt.start_time.format("%Y-%m-%d %H:%M"),
            apt.end_time().format("%H:%M"),
            apt.doctor_id,
            patient,
            status_label(apt.status)
        );
    }
    if listed.has_more() {
        println!("{}", format!("More on page {}", listed.page + 1).dimmed());
    }
    Ok(())
}

fn print_availability(availability: &Availability) {
    println!(
        "{}",
        format!(
            "Doctor {} on {} ({} min)",
            availability.doctor_id, availability.date, availability.duration_minutes
        )
        .blue()
        .bold()
    );
    for slot in &availability.slots {
        let label = if slot.available {
            "free".green()
        } else if slot.overruns_close {
            "past closing".yellow()
        } else {
            "busy".red()
        };
        println!(
            "  {} - {}  {}",
            slot.start_time.format("%H:%M"),
            slot.end_time.format("%H:%M"),
            label
        );
    }
    println!(
        "{} of {} slots available",
        availability.available_slots().count(),
        availability.slots.len()
    );
}

fn print_outcome(outcome: &ConflictOutcome) {
    match outcome {
        ConflictOutcome::Clear => println!("{}", "No conflict".green().bold()),
        ConflictOutcome::Conflict {
            appointment_id,
            interval,
        } => println!(
            "{} with appointment {} {}",
            "Conflict".red().bold(),
            appointment_id,
            interval
        ),
    }
}

fn status_label(status: AppointmentStatus) -> ColoredString {
    if status.is_active() {
        status.as_str().green()
    } else {
        status.as_str().dimmed()
    }
}

fn print_grants(
    grants: &GrantTable,
    role: Option<Role>,
    permission: Option<Permission>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(permission) = permission {
        let roles = grants.roles_with(permission);
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&roles)?),
            OutputFormat::Table => {
                println!("{}", permission.to_string().cyan().bold());
                for role in roles {
                    println!("  {}", role);
                }
            }
        }
        return Ok(());
    }

    let roles: Vec<Role> = match role {
        Some(role) => vec![role],
        None => Role::ALL.to_vec(),
    };

    match format {
        OutputFormat::Json => {
            let table: serde_json::Map<String, serde_json::Value> = roles
                .iter()
                .map(|role| {
                    let permissions = grants
                        .permissions_for(*role)
                        .iter()
                        .map(|p| p.as_str().into())
                        .collect();
                    (role.as_str().to_string(), serde_json::Value::Array(permissions))
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        OutputFormat::Table => {
            for role in roles {
                let permissions = grants.permissions_for(role);
                println!("{} ({})", role.as_str().cyan().bold(), permissions.len());
                for (resource, actions) in by_resource(permissions.iter().copied()) {
                    println!("  {:<16} {}", resource, actions.join(", "));
                }
            }
        }
    }

    Ok(())
}

/// Group permissions as resource -> actions
fn by_resource(
    permissions: impl IntoIterator<Item = Permission>,
) -> BTreeMap<&'static str, Vec<&'static str>> {
    let mut grouped: BTreeMap<_, Vec<_>> = BTreeMap::new();
    for permission in permissions {
        grouped
            .entry(permission.resource())
            .or_default()
            .push(permission.action());
    }
    grouped
}
