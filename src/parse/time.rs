use std::time::Duration;

use chrono::NaiveDateTime;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a Slurm timestamp. Placeholders such as `N/A`, `Unknown` and
/// `None` yield `None`.
pub fn parse_datetime(token: &str) -> Option<NaiveDateTime> {
    let token = token.trim();
    if matches!(token, "" | "N/A" | "Unknown" | "None") {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(token, fmt).ok())
}

/// Parse a wall-clock limit of the form `HH:MM:SS` or `D-HH:MM:SS`.
pub fn parse_walltime(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (days, hms) = match s.split_once('-') {
        Some((d, rest)) => (d.parse::<u64>().ok()?, rest),
        None => (0, s),
    };

    let mut it = hms.split(':');
    let (h, m, sec) = (it.next()?, it.next()?, it.next()?);
    if it.next().is_some() {
        return None;
    }

    let (h, m, sec): (u64, u64, u64) = (h.parse().ok()?, m.parse().ok()?, sec.parse().ok()?);
    if m >= 60 || sec >= 60 {
        return None;
    }

    Some(Duration::from_secs(
        days.saturating_mul(24 * 3600)
            .saturating_add(h * 3600)
            .saturating_add(m * 60)
            .saturating_add(sec),
    ))
}
