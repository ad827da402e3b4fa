use std::time::Duration;

use clap::Parser;
use nanoslurm::{Slurm, SubmitRequest, ToolConfig};

#[derive(Parser, Debug)]
#[command(name = "submit-job")]
#[command(about = "Submit a job, wait for it and print the end of its log")]
struct Args {
    /// Partition to submit to
    #[arg(short, long)]
    partition: String,

    /// Wall-clock limit
    #[arg(short, long, default_value = "00:10:00")]
    time: String,

    /// Seconds between status polls
    #[arg(long, default_value = "5")]
    poll: u64,

    /// Lines of stdout to show once the job ends
    #[arg(long, default_value = "20")]
    tail: usize,

    /// The command to run
    #[arg(required = true, trailing_var_arg = true)]
    cmd: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let slurm = Slurm::new(ToolConfig::default());
    let request = SubmitRequest::new(args.cmd, args.partition, args.time, 1, 1, 0).with_name("demo");

    let mut job = slurm.submit(&request)?;
    println!("Submitted job {} as {}", job.id(), job.job().name);

    let state = job.wait(Duration::from_secs(args.poll), None)?;
    println!("Job {} finished: {}", job.id(), state);

    match job.tail(args.tail) {
        Ok(text) => print!("{}", text),
        Err(e) => eprintln!("No output: {}", e),
    }

    Ok(())
}
