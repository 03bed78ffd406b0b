use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::error;

use duty_roster::config::{InfeasibleSessionPolicy, PlannerConfig};
use duty_roster::error::{PlanError, PlanResult};
use duty_roster::io::{write_schedule_csv, InputTables};
use duty_roster::planner;

#[derive(Parser)]
#[command(
    name = "duty-roster",
    version,
    about = "Monthly duty roster planner for occupational physicians"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan a roster from tabular inputs.
    Plan(PlanArgs),
}

#[derive(Args)]
struct PlanArgs {
    /// Path to doctors.csv.
    #[arg(long, required_unless_present = "workbook")]
    doctors: Option<PathBuf>,
    /// Path to locations.csv.
    #[arg(long, required_unless_present = "workbook")]
    locations: Option<PathBuf>,
    /// Path to sessions.csv.
    #[arg(long, required_unless_present = "workbook")]
    sessions: Option<PathBuf>,
    /// Path to rooms.csv.
    #[arg(long)]
    rooms: Option<PathBuf>,
    /// Path to preferences.csv.
    #[arg(long)]
    preferences: Option<PathBuf>,
    /// Path to travel_times.csv.
    #[arg(long)]
    travel_times: Option<PathBuf>,
    /// Path to doctor_workdays.csv.
    #[arg(long)]
    doctor_workdays: Option<PathBuf>,
    /// Path to doctor_week_rules.csv.
    #[arg(long)]
    doctor_week_rules: Option<PathBuf>,
    /// Excel workbook with Doctors/Locations/Rooms/Sessions/Preferences/
    /// TravelTimes/DoctorWorkdays/DoctorWeekRules tabs, replacing the
    /// per-table CSV paths.
    #[arg(
        long,
        conflicts_with_all = [
            "doctors", "locations", "sessions", "rooms", "preferences",
            "travel_times", "doctor_workdays", "doctor_week_rules"
        ]
    )]
    workbook: Option<PathBuf>,
    /// Output CSV path.
    #[arg(long)]
    output: PathBuf,
    /// Solver wall-clock budget in seconds.
    #[arg(long, default_value_t = 30.0)]
    time_budget_seconds: f64,
    /// Solver worker threads (1 = deterministic).
    #[arg(long, default_value_t = 1)]
    workers: usize,
    /// Random seed for the solver.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Score for physician-location pairs without a preference row.
    #[arg(long, default_value_t = 0)]
    default_preference_score: i64,
    /// What to do with sessions no physician can take.
    #[arg(long, value_enum, default_value_t = InfeasiblePolicy::Skip)]
    infeasible_sessions: InfeasiblePolicy,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InfeasiblePolicy {
    /// Leave them unassigned in the output.
    Skip,
    /// Fail the run.
    Fail,
}

impl From<InfeasiblePolicy> for InfeasibleSessionPolicy {
    fn from(policy: InfeasiblePolicy) -> Self {
        match policy {
            InfeasiblePolicy::Skip => InfeasibleSessionPolicy::Skip,
            InfeasiblePolicy::Fail => InfeasibleSessionPolicy::Fail,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Plan(args) => run_plan(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run_plan(args: PlanArgs) -> PlanResult<()> {
    let tables = match &args.workbook {
        Some(path) => InputTables::from_workbook(path)?,
        None => InputTables::from_csv_paths(
            required_path(&args.doctors, "--doctors")?,
            required_path(&args.locations, "--locations")?,
            required_path(&args.sessions, "--sessions")?,
            args.rooms.as_deref(),
            args.preferences.as_deref(),
            args.travel_times.as_deref(),
            args.doctor_workdays.as_deref(),
            args.doctor_week_rules.as_deref(),
        )?,
    };
    let input = tables.normalize()?;

    let config = PlannerConfig::new()
        .with_time_budget_seconds(args.time_budget_seconds)
        .with_worker_count(args.workers)
        .with_random_seed(args.seed)
        .with_default_preference_score(args.default_preference_score)
        .with_infeasible_session_policy(args.infeasible_sessions.into());

    let outcome = planner::plan(&input, &config)?;
    write_schedule_csv(&args.output, &outcome.schedule)?;

    println!(
        "Schedule written to: {} (total preference score = {})",
        args.output.display(),
        outcome.objective
    );
    if !outcome.proven_optimal {
        println!("note: roster is feasible but not proven optimal within the time budget");
    }
    if !outcome.infeasible_sessions.is_empty() {
        println!(
            "warning: {} session(s) had no eligible physician and were left unassigned",
            outcome.infeasible_sessions.len()
        );
    }
    Ok(())
}

/// Guarded by clap's `required_unless_present`; missing here is a bug.
fn required_path<'a>(path: &'a Option<PathBuf>, flag: &str) -> PlanResult<&'a Path> {
    path.as_deref()
        .ok_or_else(|| PlanError::Internal(format!("{flag} is required without --workbook")))
}
