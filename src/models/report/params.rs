use chrono::{Datelike, Month, NaiveDate};
use serde::Deserialize;

use super::types::ReportKind;

pub const YEAR_RANGE: (i32, i32) = (2020, 2030);
pub const MONTH_RANGE: (i32, i32) = (1, 12);
pub const QUARTER_RANGE: (i32, i32) = (1, 4);

/// Raw query parameters of the reports page. Numbers stay strings here so
/// that garbage input is clamped rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub report: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub quarter: Option<String>,
    pub success: Option<String>,
}

impl ReportQuery {
    /// Read the raw query string. Repeated keys keep their last value and
    /// unknown keys are ignored, so no query string is ever rejected.
    pub fn parse(raw: &str) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw).unwrap_or_else(|e| {
            log::debug!("Ignoring malformed query string {raw:?}: {e}");
            Vec::new()
        });

        let mut query = ReportQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "report" => &mut query.report,
                "year" => &mut query.year,
                "month" => &mut query.month,
                "quarter" => &mut query.quarter,
                "success" => &mut query.success,
                _ => continue,
            };
            *slot = Some(value);
        }
        query
    }
}

/// Absent values take `default`; present values are read as a leading integer
/// (non-numeric reads as 0) and clamped into `[min, max]`.
pub fn sanitize_number(raw: Option<&str>, min: i32, max: i32, default: i32) -> i32 {
    let value = match raw {
        None => default,
        Some(s) => leading_int(s),
    };
    value.clamp(min, max)
}

fn leading_int(raw: &str) -> i32 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| (acc * 10 + i64::from(d - b'0')).min(i64::from(i32::MAX) + 1));
    let signed = if negative { -magnitude } else { magnitude };
    signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Normalized request for one render of the reports page.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    /// Key exactly as received; unknown keys are kept and resolved by `kind()`.
    pub report_key: String,
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
}

impl ReportRequest {
    pub fn from_query(query: &ReportQuery, today: NaiveDate) -> Self {
        let current_quarter = (today.month0() / 3 + 1) as i32;
        let year = sanitize_number(query.year.as_deref(), YEAR_RANGE.0, YEAR_RANGE.1, today.year());
        let month = sanitize_number(
            query.month.as_deref(),
            MONTH_RANGE.0,
            MONTH_RANGE.1,
            today.month() as i32,
        );
        let quarter = sanitize_number(
            query.quarter.as_deref(),
            QUARTER_RANGE.0,
            QUARTER_RANGE.1,
            current_quarter,
        );

        Self {
            report_key: query.report.clone().unwrap_or_else(|| "overview".to_string()),
            year,
            month: month as u32,
            quarter: quarter as u32,
        }
    }

    /// Unknown keys resolve to the overview report.
    pub fn kind(&self) -> ReportKind {
        ReportKind::from_key(&self.report_key).unwrap_or(ReportKind::Overview)
    }

    pub fn title(&self) -> &'static str {
        self.kind().title()
    }

    /// "March 2024" for the monthly report, "Q1 2024" for the rest.
    pub fn period_label(&self) -> String {
        match self.kind() {
            ReportKind::Monthly => format!("{} {}", month_name(self.month), self.year),
            _ => format!("Q{} {}", self.quarter, self.year),
        }
    }

    /// Query string for switching to `kind` while keeping the selected period.
    pub fn href_for(&self, kind: ReportKind) -> String {
        format!(
            "?report={}&year={}&month={}&quarter={}",
            kind.key(),
            self.year,
            self.month,
            self.quarter
        )
    }
}

pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}
