/// Total GPU count encoded in a generic resource string.
///
/// Understands the shapes `sinfo %G` and `squeue %b` print, e.g. `gpu:4`,
/// `gpu:a100:4(S:0-1)`, `gres/gpu:2` and `gres:gpu:2`, with several
/// resources separated by commas. Anything unparsable counts as zero.
pub fn parse_gpu_count(gres: &str) -> u64 {
    gres.split(',')
        .map(|token| token.trim().split('(').next().unwrap_or(""))
        .filter_map(gpus_in_token)
        .sum()
}

fn gpus_in_token(token: &str) -> Option<u64> {
    let token = token
        .strip_prefix("gres/")
        .or_else(|| token.strip_prefix("gres:"))
        .unwrap_or(token);

    if !(token.starts_with("gpu:") || token.starts_with("gpu=")) {
        return None;
    }
    token.rsplit(|c: char| c == ':' || c == '=').next()?.parse().ok()
}
