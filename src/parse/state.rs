/// Reduce a raw state token to its bare state name.
///
/// Takes the first whitespace-separated word, cuts it at the first `+` and
/// the first `(`, then strips trailing `*`. Applying it twice gives the same
/// result as applying it once.
pub fn normalize_state(raw: &str) -> String {
    let word = raw.split_whitespace().next().unwrap_or("");
    let word = word.split('+').next().unwrap_or("");
    let word = word.split('(').next().unwrap_or("");
    word.trim_end_matches('*').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_qualifiers() {
        assert_eq!(normalize_state("RUNNING*"), "RUNNING");
        assert_eq!(normalize_state("COMPLETING+"), "COMPLETING");
        assert_eq!(normalize_state("RUNNING+foo(bar)"), "RUNNING");
        assert_eq!(normalize_state("PENDING(Resources)"), "PENDING");
        assert_eq!(normalize_state("CANCELLED by 1234"), "CANCELLED");
        assert_eq!(normalize_state("idle*"), "idle");
        assert_eq!(normalize_state("  FAILED  "), "FAILED");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize_state(""), "");
        assert_eq!(normalize_state("   "), "");
        assert_eq!(normalize_state("*"), "");
        assert_eq!(normalize_state("(null)"), "");
    }

    #[test]
    fn canonical_tokens_pass_through() {
        for token in ["COMPLETED", "RESV_DEL_HOLD", "STAGE_OUT", "mixed"] {
            assert_eq!(normalize_state(token), token);
        }
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "RUNNING*",
            "COMPLETING+",
            "RUNNING+foo(bar)",
            "A*(b)*",
            "RUN*NING**",
            "CANCELLED by 0",
            "drained*+",
            "**",
            "x(y+z)*",
            "",
        ];
        for raw in inputs {
            let once = normalize_state(raw);
            assert_eq!(normalize_state(&once), once, "not idempotent for {raw:?}");
        }
    }
}
