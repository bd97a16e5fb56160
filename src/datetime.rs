use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Parses backend timestamps. The backend emits zone-less local times
/// (`2024-03-01T09:30:00.123`); RFC 3339 values are accepted and shifted to UTC.
pub fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        let utc = dt.to_offset(time::UtcOffset::UTC);
        return Some(PrimitiveDateTime::new(utc.date(), utc.time()));
    }
    let whole_seconds = raw.split('.').next().unwrap_or(raw);
    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(whole_seconds, fmt) {
        return Some(dt);
    }
    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    PrimitiveDateTime::parse(whole_seconds, fmt).ok()
}

/// `Mar 1, 2024, 09:30`
pub fn display_timestamp(dt: PrimitiveDateTime) -> String {
    let fmt = format_description!("[month repr:short] [day padding:none], [year], [hour]:[minute]");
    dt.format(fmt).unwrap_or_default()
}

/// Human form of an optional raw timestamp, `None` when absent or unparseable.
pub fn display_raw(raw: Option<&str>) -> Option<String> {
    raw.and_then(parse_timestamp).map(display_timestamp)
}
