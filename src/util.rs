use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};

/// Normalize a session title into an invite-code base: lowercase, runs of
/// non-alphanumerics collapsed to single hyphens, no leading/trailing hyphen.
pub fn slugify(base: &str) -> String {
    let re = regex::Regex::new(r"[^a-z0-9]+").unwrap();
    let lowered = base.to_lowercase();
    let collapsed = re.replace_all(&lowered, "-");
    collapsed.trim_matches('-').to_string()
}

/// Round a timestamp up to the next quarter hour, zeroing seconds.
/// Already-aligned timestamps are left unchanged.
pub fn round_up_to_quarter(at: DateTime<Utc>) -> DateTime<Utc> {
    let at = at.with_second(0).unwrap().with_nanosecond(0).unwrap();
    let minute = at.minute();
    let add = (15 - (minute % 15)) % 15;
    at + Duration::minutes(add as i64)
}

/// Enumerate HH:MM quarter-hour slots between `start` and `end` inclusive,
/// used to offer pick-a-time options when scheduling a session.
pub fn quarter_hour_slots(start: NaiveTime, end: NaiveTime) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = start;
    loop {
        if current > end {
            break;
        }
        out.push(current.format("%H:%M").to_string());
        match current.overflowing_add_signed(Duration::minutes(15)) {
            (next, 0) => current = next,
            // wrapped past midnight
            (_, _) => break,
        }
    }
    out
}
