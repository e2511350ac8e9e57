use std::io::Write;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use jobnest::client::{Dashboard, JobApiClient, Stats, StatusFilter};
use jobnest::config::{ClientConfig, ServerConfig, StoreConfig, DEFAULT_MAX_JOBS};
use jobnest::error::JobNestError;
use jobnest::server::Server;
use jobnest::shutdown::install_shutdown_handler;
use jobnest::store::{Job, JobStatus};

#[derive(Parser, Debug)]
#[command(name = "jobnest")]
#[command(version)]
#[command(about = "Track job applications: REST API server and terminal dashboard")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the jobs API server
    Server(ServerArgs),

    /// Dashboard commands against a running server
    Job {
        #[command(flatten)]
        client: ClientArgs,

        #[command(subcommand)]
        command: JobCommands,
    },
}

// =============================================================================
// Server Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ServerArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long, default_value = "5000")]
    port: u16,

    /// JSON file the job store is loaded from and saved to.
    /// Without it, jobs are kept in memory only.
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Maximum number of stored jobs
    #[arg(long, default_value_t = DEFAULT_MAX_JOBS)]
    max_jobs: usize,
}

// =============================================================================
// Client Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ClientArgs {
    /// Server address
    #[arg(long, short = 'a', default_value = "http://127.0.0.1:5000")]
    addr: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// Job Commands
// =============================================================================

#[derive(clap::Subcommand, Debug)]
enum JobCommands {
    /// Show the dashboard: stats, job table and reminders
    List {
        /// Only show companies containing this text (case-insensitive)
        #[arg(long, short, default_value = "")]
        search: String,

        /// All, Applied, Interview, Offer or Rejected
        #[arg(long, default_value = "All")]
        status: StatusFilter,
    },
    /// Record a new application
    Add {
        #[arg(long)]
        company: String,

        #[arg(long)]
        role: String,

        /// Applied, Interview, Offer or Rejected
        #[arg(long, default_value = "Applied")]
        status: JobStatus,

        #[arg(long, default_value = "")]
        reminder: String,

        /// RFC 3339 timestamp, defaults to now
        #[arg(long)]
        applied_date: Option<DateTime<Utc>>,
    },
    /// Edit an application; omitted fields keep their current value
    Edit {
        job_id: Uuid,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        status: Option<JobStatus>,

        #[arg(long)]
        reminder: Option<String>,
    },
    /// Delete an application
    Delete {
        job_id: Uuid,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Show application counters
    Stats,
    /// Show applications with a reminder
    Reminders,
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct DashboardOutput<'a> {
    stats: Stats,
    search: &'a str,
    status: String,
    jobs: Vec<&'a Job>,
    reminders: Vec<&'a Job>,
}

// =============================================================================
// Helper Functions
// =============================================================================

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn confirm_delete(job: Option<&Job>) -> bool {
    if let Some(job) = job {
        eprintln!("{} - {} ({})", job.company, job.role, job.status);
    }
    eprint!("Are you sure you want to delete this application? [y/N] ");
    if std::io::stderr().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print a failed save the way the user needs to see it and exit.
fn exit_with_save_error(e: JobNestError) -> ! {
    match e {
        JobNestError::InvalidForm
        | JobNestError::JobNotFound(_)
        | JobNestError::Connectivity { .. } => {
            eprintln!("Error: {}", e)
        }
        other => eprintln!("Error saving job: {}", other),
    }
    std::process::exit(1);
}

fn print_stats(stats: &Stats) {
    println!(
        "Applications: {}   Interviews: {}   Offers: {}   Rejected: {}",
        stats.total, stats.interviews, stats.offers, stats.rejected
    );
}

fn job_table_header() -> String {
    format!(
        "{:<38} {:<20} {:<20} {:<10} APPLIED",
        "JOB ID", "COMPANY", "ROLE", "STATUS"
    )
}

fn job_table_row(job: &Job) -> String {
    format!(
        "{:<38} {:<20} {:<20} {:<10} {}",
        job.id.to_string(),
        truncate(&job.company, 20),
        truncate(&job.role, 20),
        job.status,
        format_date(&job.applied_date)
    )
}

fn print_job_table(jobs: &[&Job]) {
    println!("{}", job_table_header());
    println!("{}", "-".repeat(104));
    for job in jobs {
        println!("{}", job_table_row(job));
    }
}

fn print_reminders(reminders: &[&Job]) {
    if reminders.is_empty() {
        println!("No reminders.");
        return;
    }
    println!("Reminders:");
    for job in reminders {
        println!(
            "  {} ({}): {}",
            job.company,
            job.role,
            job.reminder.as_deref().unwrap_or_default().trim()
        );
    }
}

fn print_job(job: &Job, output_format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(job)?),
        OutputFormat::Table => {
            println!("Job ID:   {}", job.id);
            println!("Company:  {}", job.company);
            println!("Role:     {}", job.role);
            println!("Status:   {}", job.status);
            println!("Applied:  {}", format_date(&job.applied_date));
            if job.has_reminder() {
                println!("Reminder: {}", job.reminder.as_deref().unwrap_or_default());
            }
        }
    }
    Ok(())
}

// =============================================================================
// Server Implementation
// =============================================================================

async fn run_server(args: ServerArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging("info");

    let mut store = StoreConfig::default().with_max_jobs(args.max_jobs);
    if let Some(path) = args.data_file {
        store = store.with_data_file(path);
    }
    let config = ServerConfig::new(SocketAddr::new(args.bind, args.port)).with_store(store);

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_file = ?config.store.data_file,
        max_jobs = config.store.max_jobs,
        "Starting jobnest server"
    );

    let shutdown = install_shutdown_handler();
    let server = Server::open(config).await?;
    server.run(shutdown).await?;
    Ok(())
}

// =============================================================================
// Client Command Handlers
// =============================================================================

async fn handle_job_list(
    api: &JobApiClient,
    search: String,
    status: StatusFilter,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::new();
    dashboard.load(api).await;
    dashboard.search_term = search;
    dashboard.status_filter = status;

    let filtered = dashboard.filtered_jobs();
    let reminders = dashboard.reminders();

    match output_format {
        OutputFormat::Json => {
            let output = DashboardOutput {
                stats: dashboard.stats(),
                search: &dashboard.search_term,
                status: dashboard.status_filter.to_string(),
                jobs: filtered,
                reminders,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            print_stats(&dashboard.stats());
            println!();
            if filtered.is_empty() {
                println!("No applications found.");
            } else {
                print_job_table(&filtered);
                println!();
                println!(
                    "Showing {} of {} applications",
                    filtered.len(),
                    dashboard.jobs().len()
                );
            }
            println!();
            print_reminders(&reminders);
        }
    }
    Ok(())
}

async fn handle_job_add(
    api: &JobApiClient,
    company: String,
    role: String,
    status: JobStatus,
    reminder: String,
    applied_date: Option<DateTime<Utc>>,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::new();
    dashboard.form.company = company;
    dashboard.form.role = role;
    dashboard.form.status = status;
    dashboard.form.reminder = reminder;
    dashboard.form.applied_date = applied_date;

    match dashboard.submit(api).await {
        Ok(job) => {
            if let OutputFormat::Table = output_format {
                println!("Application added!");
            }
            print_job(&job, output_format)
        }
        Err(e) => exit_with_save_error(e),
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_job_edit(
    api: &JobApiClient,
    job_id: Uuid,
    company: Option<String>,
    role: Option<String>,
    status: Option<JobStatus>,
    reminder: Option<String>,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::new();
    if let Err(e) = dashboard.begin_edit_by_id(api, &job_id).await {
        exit_with_save_error(e);
    }

    if let Some(company) = company {
        dashboard.form.company = company;
    }
    if let Some(role) = role {
        dashboard.form.role = role;
    }
    if let Some(status) = status {
        dashboard.form.status = status;
    }
    if let Some(reminder) = reminder {
        dashboard.form.reminder = reminder;
    }

    match dashboard.submit(api).await {
        Ok(job) => {
            if let OutputFormat::Table = output_format {
                println!("Application updated!");
            }
            print_job(&job, output_format)
        }
        Err(e) => exit_with_save_error(e),
    }
}

async fn handle_job_delete(
    api: &JobApiClient,
    job_id: Uuid,
    yes: bool,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::new();
    dashboard.load(api).await;
    let known = dashboard.find(&job_id).cloned();

    match dashboard
        .delete(api, &job_id, || yes || confirm_delete(known.as_ref()))
        .await
    {
        Ok(Some(job)) => match output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&job)?),
            OutputFormat::Table => println!("Deleted {} - {} ({})", job.company, job.role, job.id),
        },
        Ok(None) => println!("Cancelled."),
        Err(e @ JobNestError::Connectivity { .. }) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error deleting job: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn handle_job_stats(
    api: &JobApiClient,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::new();
    dashboard.load(api).await;
    let stats = dashboard.stats();

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table => print_stats(&stats),
    }
    Ok(())
}

async fn handle_job_reminders(
    api: &JobApiClient,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::new();
    dashboard.load(api).await;
    let reminders = dashboard.reminders();

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reminders)?),
        OutputFormat::Table => print_reminders(&reminders),
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Server(server_args) => {
            run_server(server_args).await?;
        }
        Commands::Job { client, command } => {
            init_logging("warn");
            let api = JobApiClient::new(ClientConfig::new(client.addr.clone()));
            let output = &client.output;

            match command {
                JobCommands::List { search, status } => {
                    handle_job_list(&api, search, status, output).await?;
                }
                JobCommands::Add {
                    company,
                    role,
                    status,
                    reminder,
                    applied_date,
                } => {
                    handle_job_add(&api, company, role, status, reminder, applied_date, output)
                        .await?;
                }
                JobCommands::Edit {
                    job_id,
                    company,
                    role,
                    status,
                    reminder,
                } => {
                    handle_job_edit(&api, job_id, company, role, status, reminder, output).await?;
                }
                JobCommands::Delete { job_id, yes } => {
                    handle_job_delete(&api, job_id, yes, output).await?;
                }
                JobCommands::Stats => {
                    handle_job_stats(&api, output).await?;
                }
                JobCommands::Reminders => {
                    handle_job_reminders(&api, output).await?;
                }
            }
        }
    }

    Ok(())
}
