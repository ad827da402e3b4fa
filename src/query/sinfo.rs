use crate::exec::Tool;
use crate::query::{format_spec, push_list, QueryFilter, Source};

/// Partition and node capacity.
pub struct Sinfo;

impl Source for Sinfo {
    const TOOL: Tool = Tool::Sinfo;

    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("partition", "%P"),
        ("avail", "%a"),
        ("timelimit", "%l"),
        ("nodes", "%D"),
        ("state", "%T"),
        ("cpus", "%C"),
        ("gres", "%G"),
        ("memory", "%m"),
        ("nodelist", "%N"),
    ];

    fn build_args(tokens: &[&'static str], filter: &QueryFilter) -> Vec<String> {
        let mut args = vec!["-h".to_string()];
        if filter.all_partitions {
            args.push("-a".to_string());
        }
        if filter.per_node {
            args.push("-N".to_string());
        }
        args.push("-o".to_string());
        args.push(format_spec(tokens));
        push_list(&mut args, "-p", &filter.partitions);
        push_list(&mut args, "-t", &filter.states);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_partitions_flag() {
        let args = Sinfo::build_args(&["%P", "%C", "%G", "%D"], &QueryFilter::new().all_partitions());
        assert_eq!(args, vec!["-h", "-a", "-o", "%P|%C|%G|%D"]);
    }

    #[test]
    fn per_node_listing() {
        let args = Sinfo::build_args(&["%N", "%T"], &QueryFilter::new().all_partitions().per_node());
        assert_eq!(args, vec!["-h", "-a", "-N", "-o", "%N|%T"]);
    }

    #[test]
    fn ignores_job_filters() {
        let args = Sinfo::build_args(&["%T"], &QueryFilter::new().job(7).user("x").partition("gpu"));
        assert_eq!(args, vec!["-h", "-o", "%T", "-p", "gpu"]);
    }
}
