use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ROSTER_NAMESPACE: &str = "escala_vigilantes";
pub const LOG_NAMESPACE: &str = "logs_vigilantes";

// Namespaces are always two underscore-separated segments, so the month is the
// third token of every key.
static SCHEDULE_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^_]+_[^_]+)_([0-9]+)(_draft)?$").expect("valid schedule key regex")
});

static LOG_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^_]+_[^_]+)_([0-9]+)$").expect("valid log key regex"));

/// Month encoded as `year * 100 + month`, e.g. `202501` for January 2025.
///
/// Ordering is the plain integer ordering of the code. That is the ordering
/// the `future` deletion scope relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearMonth(u32);

impl YearMonth {
    /// Strict parse used for request parameters: six digits, month 01-12.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.len() != 6 || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(AppError::InvalidInput(format!(
                "month must be a YYYYMM value, got '{}'",
                raw
            )));
        }
        let code: u32 = trimmed
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("month is not numeric: '{}'", raw)))?;
        let month = Self(code);
        if !(1..=12).contains(&month.month()) {
            return Err(AppError::InvalidInput(format!(
                "month component out of range in '{}'",
                raw
            )));
        }
        Ok(month)
    }

    pub fn from_code(code: u32) -> Self {
        Self(code)
    }

    pub fn code(self) -> u32 {
        self.0
    }

    pub fn year(self) -> i32 {
        (self.0 / 100) as i32
    }

    pub fn month(self) -> u32 {
        self.0 % 100
    }

    pub fn first_day(self) -> AppResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
            .ok_or_else(|| AppError::InvalidInput(format!("{} is not a calendar month", self.0)))
    }

    /// Day zero of the following month, i.e. the last day of this one.
    pub fn days_in_month(self) -> AppResult<u32> {
        let first = self.first_day()?;
        let (next_year, next_month) = if first.month() == 12 {
            (first.year() + 1, 1)
        } else {
            (first.year(), first.month() + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .ok_or_else(|| AppError::InvalidInput(format!("{} is not a calendar month", self.0)))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleVariant {
    Published,
    Draft,
}

impl ScheduleVariant {
    /// Only the literal `draft` selects the draft copy.
    pub fn from_type(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("draft") => Self::Draft,
            _ => Self::Published,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
        }
    }
}

/// Month segment of any stored key: its third underscore-separated token,
/// when that token is all digits. Scoped deletion uses this instead of
/// `decode`, so keys with a trailing suffix or a padded month still count.
pub fn month_token(raw: &str) -> Option<YearMonth> {
    let token = raw.split('_').nth(2)?;
    if token.is_empty() || !token.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    token.parse().ok().map(YearMonth::from_code)
}

/// Keys of the document's string-keyed tables.
///
/// `decode` must reject anything `encode` would not produce, so that a decoded
/// key always serializes back to the exact same string.
pub trait StorageKey: Ord + Clone + Sized {
    fn encode(&self) -> String;
    fn decode(raw: &str) -> Option<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleKey {
    pub namespace: String,
    pub month: YearMonth,
    pub variant: ScheduleVariant,
}

impl ScheduleKey {
    pub fn roster(month: YearMonth, variant: ScheduleVariant) -> Self {
        Self {
            namespace: ROSTER_NAMESPACE.to_string(),
            month,
            variant,
        }
    }
}

impl StorageKey for ScheduleKey {
    fn encode(&self) -> String {
        match self.variant {
            ScheduleVariant::Published => format!("{}_{}", self.namespace, self.month),
            ScheduleVariant::Draft => format!("{}_{}_draft", self.namespace, self.month),
        }
    }

    fn decode(raw: &str) -> Option<Self> {
        let captures = SCHEDULE_KEY_RE.captures(raw)?;
        let code: u32 = captures.get(2)?.as_str().parse().ok()?;
        let key = Self {
            namespace: captures.get(1)?.as_str().to_string(),
            month: YearMonth::from_code(code),
            variant: if captures.get(3).is_some() {
                ScheduleVariant::Draft
            } else {
                ScheduleVariant::Published
            },
        };
        (key.encode() == raw).then_some(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogKey {
    pub namespace: String,
    pub month: YearMonth,
}

impl LogKey {
    pub fn audit(month: YearMonth) -> Self {
        Self {
            namespace: LOG_NAMESPACE.to_string(),
            month,
        }
    }
}

impl StorageKey for LogKey {
    fn encode(&self) -> String {
        format!("{}_{}", self.namespace, self.month)
    }

    fn decode(raw: &str) -> Option<Self> {
        let captures = LOG_KEY_RE.captures(raw)?;
        let code: u32 = captures.get(2)?.as_str().parse().ok()?;
        let key = Self {
            namespace: captures.get(1)?.as_str().to_string(),
            month: YearMonth::from_code(code),
        };
        (key.encode() == raw).then_some(key)
    }
}
