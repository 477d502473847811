use super::types::{QuickStats, ReportRow};

/// A one-line observation for the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub icon: &'static str,
    pub text: String,
}

pub fn insights(stats: &QuickStats, rows: &[ReportRow]) -> Vec<Insight> {
    let mut out = Vec::new();

    if let Some(top) = rows.iter().max_by_key(|r| r.count).filter(|r| r.count > 0) {
        let text = match top.percentage {
            Some(p) => format!("{} is the largest group ({:.1}% of records)", top.category, p),
            None => format!("{} is the largest group with {} records", top.category, top.count),
        };
        out.push(Insight { icon: "bi-trophy", text });
    }

    if let Some(rising) = rows
        .iter()
        .filter(|r| r.trend.is_some_and(|t| t > 0.0))
        .max_by(|a, b| a.trend.unwrap_or(0.0).total_cmp(&b.trend.unwrap_or(0.0)))
    {
        out.push(Insight {
            icon: "bi-graph-up-arrow",
            text: format!("{} grew by {}", rising.category, rising.trend_display()),
        });
    }

    if stats.total_families > 0 {
        out.push(Insight {
            icon: "bi-house",
            text: format!("Average family size is {} members", stats.avg_family_size_display()),
        });
    }

    out.push(Insight {
        icon: "bi-calendar-check",
        text: match stats.this_month_registrations {
            0 => "No new registrations this month".to_string(),
            1 => "1 new registration this month".to_string(),
            n => format!("{n} new registrations this month"),
        },
    });

    out
}
