use crate::exec::Tool;
use crate::query::{format_spec, push_list, QueryFilter, Source};

/// Live queue: jobs that are pending, running or about to finish.
pub struct Squeue;

impl Source for Squeue {
    const TOOL: Tool = Tool::Squeue;

    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "%i"),
        ("name", "%j"),
        ("user", "%u"),
        ("account", "%a"),
        ("partition", "%P"),
        ("state", "%T"),
        ("reason", "%r"),
        ("submit", "%V"),
        ("start", "%S"),
        ("end", "%e"),
        ("elapsed", "%M"),
        ("timelimit", "%l"),
        ("cpus", "%C"),
        ("gres", "%b"),
        ("nodes", "%D"),
        ("nodelist", "%N"),
        ("priority", "%Q"),
    ];

    fn build_args(tokens: &[&'static str], filter: &QueryFilter) -> Vec<String> {
        let mut args = vec!["-h".to_string(), "-o".to_string(), format_spec(tokens)];
        push_list(&mut args, "-j", &filter.jobs);
        push_list(&mut args, "-u", &filter.users);
        push_list(&mut args, "-p", &filter.partitions);
        push_list(&mut args, "-t", &filter.states);
        args
    }
}
