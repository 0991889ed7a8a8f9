//! Weibo timestamp normalization
//!
//! Weibo renders post times in several shapes: full ISO-like timestamps,
//! the display style `MM月DD日 HH:MM` with no year, and either form with a
//! trailing `来自...` source-device suffix. Everything is normalized into
//! the canonical sortable `YYYY-MM-DD HH:MM:SS` form at ingest time, and
//! parse failures degrade to a minimum-time sentinel so that ranking sorts
//! are total over all posts.

use std::sync::OnceLock;

use chrono::Datelike;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Utc;
use regex::Regex;

use crate::models::Post;

/// Canonical timestamp format stored on every [`Post`]
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn device_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*来自.*$").expect("valid regex"))
}

fn display_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2})月(\d{1,2})日\s+(\d{1,2}):(\d{2})\s*$").expect("valid regex")
    })
}

/// Normalize a raw Weibo time string into `YYYY-MM-DD HH:MM:SS`.
///
/// Returns `None` for empty input, the literal `"nan"`, unknown formats,
/// and calendar-invalid components. Deterministic for fixed `reference`
/// and `default_year`.
///
/// The display style carries no year. When `default_year` is given it is
/// used as-is; otherwise the year is inferred from `reference`: a parsed
/// month more than one past the reference month means the post is from the
/// previous year (a December post viewed in a new January).
pub fn normalize_create_time(
    raw: &str,
    reference: Option<NaiveDateTime>,
    default_year: Option<i32>,
) -> Option<String> {
    let s = raw.replace('\u{a0}', " ");
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return None;
    }

    let s = device_suffix_re().replace(s, "");
    let s = s.trim();

    if let Some(dt) = parse_iso_like(s) {
        return Some(dt.format(CANONICAL_FORMAT).to_string());
    }

    if let Some(caps) = display_time_re().captures(s) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let hour: u32 = caps[3].parse().ok()?;
        let minute: u32 = caps[4].parse().ok()?;

        let year = match default_year {
            Some(year) => year,
            None => {
                let reference = reference.unwrap_or_else(|| Utc::now().naive_utc());
                let mut year = reference.year();
                if month > reference.month() + 1 {
                    year -= 1;
                }
                year
            }
        };

        let dt = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
        return Some(dt.format(CANONICAL_FORMAT).to_string());
    }

    None
}

fn parse_iso_like(s: &str) -> Option<NaiveDateTime> {
    // %.f makes a fractional-second part optional; the fraction is dropped
    // when formatting back to the canonical second-resolution form
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    // Date-only form canonicalizes to midnight
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a post's canonical timestamp for ranking.
///
/// Missing or unparseable timestamps yield `NaiveDateTime::MIN`, so
/// sentinel posts sort last under a descending time sort.
pub fn parse_created_at(post: &Post) -> NaiveDateTime {
    post.created_at
        .as_deref()
        .and_then(|s| NaiveDateTime::parse_from_str(s, CANONICAL_FORMAT).ok())
        .unwrap_or(NaiveDateTime::MIN)
}
