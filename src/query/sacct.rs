use crate::exec::Tool;
use crate::query::{push_list, push_time, QueryFilter, Source};

/// Historical accounting: records of finished and running jobs.
pub struct Sacct;

impl Source for Sacct {
    const TOOL: Tool = Tool::Sacct;

    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "JobID"),
        ("name", "JobName"),
        ("user", "User"),
        ("account", "Account"),
        ("partition", "Partition"),
        ("state", "State"),
        ("submit", "Submit"),
        ("start", "Start"),
        ("end", "End"),
        ("elapsed", "Elapsed"),
        ("timelimit", "Timelimit"),
        ("cpus", "AllocCPUS"),
        ("tres", "AllocTRES"),
        ("nodes", "NNodes"),
        ("nodelist", "NodeList"),
        ("exitcode", "ExitCode"),
    ];

    fn build_args(tokens: &[&'static str], filter: &QueryFilter) -> Vec<String> {
        let mut args = vec![
            "-n".to_string(),
            "-P".to_string(),
            format!("--format={}", tokens.join(",")),
        ];
        push_list(&mut args, "-j", &filter.jobs);
        if !filter.users.is_empty() {
            push_list(&mut args, "-u", &filter.users);
        } else if filter.all_users {
            args.push("-a".to_string());
        }
        push_list(&mut args, "-r", &filter.partitions);
        push_list(&mut args, "-s", &filter.states);
        push_time(&mut args, "-S", filter.start_time);
        push_time(&mut args, "-E", filter.end_time);
        if filter.allocations {
            args.push("-X".to_string());
        }
        args
    }
}
