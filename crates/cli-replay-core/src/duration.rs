//! Duration-string parsing shared by `session.ttl` validation
//! and the TTL cleaner.

/// Parse a duration string like `"60s"`, `"5m"`, `"1h"`, `"7d"` into a
/// [`std::time::Duration`].
pub fn parse_duration(s: &str) -> Result<std::time::Duration, String> {
    let s = s.trim();
    let split_pos = s
        .chars()
        .position(|c| !c.is_numeric())
        .ok_or_else(|| format!("invalid duration format: {}", s))?;

    let (num_str, unit) = s.split_at(split_pos);
    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", num_str))?;

    let duration = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => std::time::Duration::from_secs(num),
        "m" | "min" | "mins" | "minute" | "minutes" => std::time::Duration::from_secs(num * 60),
        "h" | "hr" | "hrs" | "hour" | "hours" => std::time::Duration::from_secs(num * 3600),
        "d" | "day" | "days" => std::time::Duration::from_secs(num * 86400),
        _ => return Err(format!("unknown duration unit: {}", unit)),
    };
    Ok(duration)
}
