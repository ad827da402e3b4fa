use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use nanoslurm::config::{DashboardConfig, ToolConfig};
use nanoslurm::dashboard::{run_dashboard, DashboardState};
use nanoslurm::shutdown::install_shutdown_handler;
use nanoslurm::stats::{counts, utilization_percent, Span};
use nanoslurm::{Job, JobState, Slurm, SubmitRequest};

#[derive(Parser, Debug)]
#[command(name = "nanoslurm")]
#[command(version)]
#[command(about = "Submit, track and summarize Slurm jobs")]
#[command(propagate_version = true)]
struct Args {
    /// Directory holding the Slurm commands (default: PATH)
    #[arg(long, global = true, env = "NANOSLURM_BIN_DIR")]
    bin_dir: Option<PathBuf>,

    /// User recorded on submitted jobs (default: $USER)
    #[arg(long, global = true, env = "NANOSLURM_USER")]
    as_user: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Submit a command as a batch job
    Submit(SubmitArgs),

    /// Show the current state of one or more jobs
    Status {
        #[arg(required = true)]
        job_ids: Vec<u64>,
    },

    /// Block until a job reaches a terminal state
    Wait {
        job_id: u64,

        /// Seconds between polls
        #[arg(long, default_value = "5")]
        poll: u64,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Cancel a job
    Cancel { job_id: u64 },

    /// Show scontrol's detail record for a job
    Info { job_id: u64 },

    /// List jobs in the queue (or accounting when squeue is missing)
    List {
        /// Only this user's jobs
        #[arg(long, short = 'u')]
        user: Option<String>,

        /// Print per-state, per-user and per-partition counts instead of jobs
        #[arg(long)]
        stats: bool,
    },

    /// Partition capacity and utilization
    Partitions,

    /// Fair-share score per user
    Fairshare,

    /// Completed jobs per day or week
    History {
        #[arg(long, default_value = "day")]
        span: Span,

        #[arg(long, default_value = "7")]
        count: usize,
    },

    /// Node counts per state
    Nodes,

    /// Serve the HTTP monitor
    Dashboard {
        #[arg(long, default_value = "127.0.0.1:8080", env = "NANOSLURM_LISTEN")]
        listen: SocketAddr,

        /// Page refresh interval in milliseconds
        #[arg(long, default_value = "5000")]
        refresh_ms: u64,
    },
}

#[derive(Parser, Debug)]
struct SubmitArgs {
    /// Partition to submit to
    #[arg(long, short = 'p')]
    partition: String,

    /// Wall-clock limit, HH:MM:SS or D-HH:MM:SS
    #[arg(long, short = 't', default_value = "01:00:00")]
    time: String,

    #[arg(long, short = 'c', default_value = "1")]
    cpus: u32,

    /// Memory in GB
    #[arg(long, default_value = "4")]
    mem: u32,

    #[arg(long, default_value = "0")]
    gpus: u32,

    /// Job name prefix; a timestamp is appended
    #[arg(long, default_value = "job")]
    name: String,

    /// Stdout path template (`%j` is the job id)
    #[arg(long)]
    stdout: Option<PathBuf>,

    /// Stderr path template (`%j` is the job id)
    #[arg(long)]
    stderr: Option<PathBuf>,

    /// Signal spec passed to --signal, e.g. SIGUSR1@90
    #[arg(long)]
    signal: Option<String>,

    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Wait for the job to finish after submitting
    #[arg(long)]
    wait: bool,

    /// The command to run
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct SubmitOutput {
    job: Job,
    final_state: Option<JobState>,
}

#[derive(Serialize)]
struct StatusOutput {
    job_id: u64,
    state: JobState,
}

#[derive(Serialize)]
struct PartitionOutput {
    partition: String,
    cpus_used: u64,
    cpus_total: u64,
    gpus_used: u64,
    gpus_total: u64,
    utilization: f64,
}

#[derive(Serialize)]
struct ListStatsOutput {
    states: Vec<counts::Share>,
    top_users: Vec<counts::Share>,
    partitions: Vec<counts::Share>,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fmt_time(time: Option<chrono::NaiveDateTime>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_state(state: Option<JobState>) -> &'static str {
    state.unwrap_or(JobState::Unknown).as_str()
}

// =============================================================================
// Command Handlers
// =============================================================================

fn handle_submit(slurm: &Slurm, args: SubmitArgs, output: &OutputFormat) -> CliResult {
    let mut request = SubmitRequest::new(args.command, args.partition, args.time, args.cpus, args.mem, args.gpus)
        .with_name(args.name);
    if let Some(path) = args.stdout {
        request = request.with_stdout(path);
    }
    if let Some(path) = args.stderr {
        request = request.with_stderr(path);
    }
    if let Some(signal) = args.signal {
        request = request.with_signal(signal);
    }
    if let Some(dir) = args.workdir {
        request = request.with_workdir(dir);
    }

    let mut handle = slurm.submit(&request)?;
    let final_state = if args.wait {
        Some(handle.wait(Duration::from_secs(5), None)?)
    } else {
        None
    };

    match output {
        OutputFormat::Json => print_json(&SubmitOutput {
            job: handle.into_job(),
            final_state,
        })?,
        OutputFormat::Table => {
            let job = handle.job();
            println!("Submitted job {} ({})", job.id, job.name);
            if let Some(path) = &job.stdout_path {
                println!("stdout: {}", path.display());
            }
            if let Some(path) = &job.stderr_path {
                println!("stderr: {}", path.display());
            }
            if let Some(state) = final_state {
                println!("Final state: {}", state);
            }
        }
    }
    Ok(())
}

fn handle_status(slurm: &Slurm, job_ids: Vec<u64>, output: &OutputFormat) -> CliResult {
    let mut rows = Vec::with_capacity(job_ids.len());
    for job_id in job_ids {
        rows.push(StatusOutput {
            job_id,
            state: slurm.job_state(job_id)?,
        });
    }

    match output {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            println!("{:<12} STATE", "JOB ID");
            for row in rows {
                println!("{:<12} {}", row.job_id, row.state);
            }
        }
    }
    Ok(())
}

fn handle_wait(slurm: &Slurm, job_id: u64, poll: u64, timeout: Option<u64>, output: &OutputFormat) -> CliResult {
    let mut handle = slurm.handle(Job::new(job_id, "", "", ""));
    let state = handle.wait(Duration::from_secs(poll.max(1)), timeout.map(Duration::from_secs))?;

    match output {
        OutputFormat::Json => print_json(&StatusOutput { job_id, state })?,
        OutputFormat::Table => {
            if state.is_terminal() {
                println!("Job {} finished: {}", job_id, state);
            } else {
                println!("Timed out waiting for job {} (last state {})", job_id, state);
            }
        }
    }
    Ok(())
}

fn handle_info(slurm: &Slurm, job_id: u64, output: &OutputFormat) -> CliResult {
    let info = slurm.job_info(job_id)?;
    match output {
        OutputFormat::Json => print_json(&info)?,
        OutputFormat::Table => {
            if info.is_empty() {
                println!("No record for job {}", job_id);
            }
            for (key, value) in &info {
                println!("{:<20} {}", key, value);
            }
        }
    }
    Ok(())
}

fn handle_list(slurm: &Slurm, user: Option<String>, stats: bool, output: &OutputFormat) -> CliResult {
    let jobs = slurm.list_jobs(user.as_deref())?;

    if stats {
        let out = ListStatsOutput {
            states: counts::job_state_counts(&jobs),
            top_users: counts::top_users(&jobs, 10),
            partitions: counts::partition_counts(&jobs),
        };
        return match output {
            OutputFormat::Json => print_json(&out),
            OutputFormat::Table => {
                for (title, shares) in [
                    ("STATE", &out.states),
                    ("USER", &out.top_users),
                    ("PARTITION", &out.partitions),
                ] {
                    println!("{:<16} {:>6} {:>7}", title, "JOBS", "%");
                    for share in shares {
                        println!("{:<16} {:>6} {:>6.1}%", share.label, share.count, share.percent);
                    }
                    println!();
                }
                Ok(())
            }
        };
    }

    match output {
        OutputFormat::Json => print_json(&jobs)?,
        OutputFormat::Table => {
            if jobs.is_empty() {
                println!("No jobs found.");
                return Ok(());
            }
            println!(
                "{:<10} {:<24} {:<12} {:<12} {:<12} {:<20} STARTED",
                "JOB ID", "NAME", "USER", "PARTITION", "STATE", "SUBMITTED"
            );
            for job in &jobs {
                println!(
                    "{:<10} {:<24} {:<12} {:<12} {:<12} {:<20} {}",
                    job.id,
                    job.name,
                    job.user,
                    job.partition,
                    fmt_state(job.last_state()),
                    fmt_time(job.submit_time),
                    fmt_time(job.start_time)
                );
            }
        }
    }
    Ok(())
}

fn handle_partitions(slurm: &Slurm, output: &OutputFormat) -> CliResult {
    let capacity = slurm.partition_capacity()?;
    let usage = slurm.running_usage()?;
    let rows: Vec<PartitionOutput> = capacity
        .into_iter()
        .map(|(partition, cap)| {
            let used = usage.get(&partition).copied().unwrap_or_default();
            PartitionOutput {
                partition,
                cpus_used: used.cpus,
                cpus_total: cap.cpus,
                gpus_used: used.gpus,
                gpus_total: cap.gpus,
                utilization: utilization_percent(cap, used),
            }
        })
        .collect();

    match output {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            println!("{:<16} {:>12} {:>10} {:>7}", "PARTITION", "CPUS", "GPUS", "UTIL");
            for row in rows {
                println!(
                    "{:<16} {:>12} {:>10} {:>6.1}%",
                    row.partition,
                    format!("{}/{}", row.cpus_used, row.cpus_total),
                    format!("{}/{}", row.gpus_used, row.gpus_total),
                    row.utilization
                );
            }
        }
    }
    Ok(())
}

fn handle_fairshare(slurm: &Slurm, output: &OutputFormat) -> CliResult {
    let scores = slurm.fairshare_scores()?;
    match output {
        OutputFormat::Json => print_json(&scores)?,
        OutputFormat::Table => {
            if scores.is_empty() {
                println!("No fair-share data available.");
            }
            for (user, score) in &scores {
                println!("{:<16} {:.4}", user, score);
            }
        }
    }
    Ok(())
}

fn handle_history(slurm: &Slurm, span: Span, count: usize, output: &OutputFormat) -> CliResult {
    let buckets = slurm.recent_completions(span, count)?;
    match output {
        OutputFormat::Json => print_json(&buckets)?,
        OutputFormat::Table => {
            println!("{:<12} COMPLETED", span.to_string().to_uppercase());
            for bucket in &buckets {
                println!("{:<12} {}", bucket.period, bucket.count);
            }
        }
    }
    Ok(())
}

fn handle_nodes(slurm: &Slurm, output: &OutputFormat) -> CliResult {
    let nodes = slurm.node_state_counts()?;
    match output {
        OutputFormat::Json => print_json(&nodes)?,
        OutputFormat::Table => {
            println!("{:<16} NODES", "STATE");
            for (state, count) in &nodes {
                println!("{:<16} {}", state, count);
            }
        }
    }
    Ok(())
}

fn run_dashboard_blocking(slurm: Slurm, listen: SocketAddr, refresh_ms: u64) -> CliResult {
    let config = DashboardConfig {
        listen_addr: listen,
        refresh_interval_ms: refresh_ms,
    };
    let state = DashboardState::new(slurm, &config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let shutdown = install_shutdown_handler();
        run_dashboard(config, state, shutdown).await;
    });
    Ok(())
}

fn main() -> CliResult {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ToolConfig::new();
    if let Some(dir) = args.bin_dir {
        config = config.with_search_dir(dir);
    }
    if let Some(user) = args.as_user {
        config = config.with_user(user);
    }
    let slurm = Slurm::new(config);
    let output = args.output;

    match args.command {
        Commands::Submit(submit) => handle_submit(&slurm, submit, &output)?,
        Commands::Status { job_ids } => handle_status(&slurm, job_ids, &output)?,
        Commands::Wait {
            job_id,
            poll,
            timeout,
        } => handle_wait(&slurm, job_id, poll, timeout, &output)?,
        Commands::Cancel { job_id } => {
            slurm.cancel(job_id)?;
            if let OutputFormat::Table = output {
                println!("Cancellation requested for job {}", job_id);
            }
        }
        Commands::Info { job_id } => handle_info(&slurm, job_id, &output)?,
        Commands::List { user, stats } => handle_list(&slurm, user, stats, &output)?,
        Commands::Partitions => handle_partitions(&slurm, &output)?,
        Commands::Fairshare => handle_fairshare(&slurm, &output)?,
        Commands::History { span, count } => handle_history(&slurm, span, count, &output)?,
        Commands::Nodes => handle_nodes(&slurm, &output)?,
        Commands::Dashboard { listen, refresh_ms } => {
            run_dashboard_blocking(slurm, listen, refresh_ms)?
        }
    }

    Ok(())
}
