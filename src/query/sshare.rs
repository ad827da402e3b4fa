use crate::exec::Tool;
use crate::query::{push_list, QueryFilter, Source};

/// Fair-share accounting per account and user association.
pub struct Sshare;

impl Source for Sshare {
    const TOOL: Tool = Tool::Sshare;

    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("account", "Account"),
        ("user", "User"),
        ("rawshares", "RawShares"),
        ("normshares", "NormShares"),
        ("rawusage", "RawUsage"),
        ("effectvusage", "EffectvUsage"),
        ("fairshare", "FairShare"),
    ];

    fn build_args(tokens: &[&'static str], filter: &QueryFilter) -> Vec<String> {
        let mut args = vec![
            "-n".to_string(),
            "-P".to_string(),
            "-o".to_string(),
            tokens.join(","),
        ];
        if !filter.users.is_empty() {
            push_list(&mut args, "-u", &filter.users);
        } else if filter.all_users {
            args.push("-a".to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_users_listing() {
        let args = Sshare::build_args(&["User", "FairShare"], &QueryFilter::new().all_users());
        assert_eq!(args, vec!["-n", "-P", "-o", "User,FairShare", "-a"]);
    }

    #[test]
    fn named_users() {
        let args = Sshare::build_args(&["User"], &QueryFilter::new().user("a").user("b"));
        assert_eq!(args, vec!["-n", "-P", "-o", "User", "-u", "a,b"]);
    }
}
