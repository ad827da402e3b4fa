use crate::exec::Tool;
use crate::query::{format_spec, push_list, QueryFilter, Source};

/// Priority factors of pending jobs, including the fair-share factor.
pub struct Sprio;

impl Source for Sprio {
    const TOOL: Tool = Tool::Sprio;

    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "%i"),
        ("user", "%u"),
        ("account", "%o"),
        ("partition", "%r"),
        ("priority", "%Y"),
        ("age", "%A"),
        ("fairshare", "%f"),
        ("jobsize", "%J"),
        ("qos", "%Q"),
    ];

    fn build_args(tokens: &[&'static str], filter: &QueryFilter) -> Vec<String> {
        let mut args = vec!["-h".to_string(), "-o".to_string(), format_spec(tokens)];
        push_list(&mut args, "-j", &filter.jobs);
        push_list(&mut args, "-u", &filter.users);
        push_list(&mut args, "-p", &filter.partitions);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_fairshare_format() {
        let tokens = [
            Sprio::field_token("user").unwrap(),
            Sprio::field_token("fairshare").unwrap(),
        ];
        let args = Sprio::build_args(&tokens, &QueryFilter::new().user("alice"));
        assert_eq!(args, vec!["-h", "-o", "%u|%f", "-u", "alice"]);
    }
}
