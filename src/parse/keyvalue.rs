use std::collections::BTreeMap;

/// Parse whitespace-separated `key=value` tokens, as printed by
/// `scontrol -o show ...`. Only the first `=` splits a token, so values such
/// as `TRES=cpu=4,mem=8G` survive intact. Tokens without `=` are ignored.
pub fn parse_key_values(line: &str) -> BTreeMap<String, String> {
    line.split_whitespace()
        .filter_map(|token| token.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
