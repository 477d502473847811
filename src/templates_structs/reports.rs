use askama::Template;

use super::PageContext;
use crate::models::report::params::{MONTH_RANGE, QUARTER_RANGE, YEAR_RANGE};
use crate::models::report::{
    ActivityEntry, Insight, PageData, QuickStats, ReportKind, ReportRequest, ReportRow, insights,
    month_name, table_rows,
};

pub struct ReportTab {
    pub key: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub href: String,
    pub active: bool,
}

pub struct SelectOption {
    pub value: i32,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "reports/gn_reports.html")]
pub struct GnReportsTemplate {
    pub ctx: PageContext,
    pub report_key: &'static str,
    pub report_title: &'static str,
    pub report_icon: &'static str,
    pub period_label: String,
    pub tabs: Vec<ReportTab>,
    pub year_options: Vec<SelectOption>,
    pub month_options: Vec<SelectOption>,
    pub quarter_options: Vec<SelectOption>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub quick_stats: QuickStats,
    pub rows: Vec<ReportRow>,
    /// `None` when there is nothing to plot; the chart panel is then left out.
    pub chart_json: Option<String>,
    pub chart_type: &'static str,
    pub activities: Vec<ActivityEntry>,
    pub insights: Vec<Insight>,
}

impl GnReportsTemplate {
    pub fn new(
        ctx: PageContext,
        request: &ReportRequest,
        data: PageData,
        success: Option<String>,
        error: Option<String>,
    ) -> Self {
        let kind = request.kind();
        let rows = table_rows(&data.report.report_data);
        let chart = &data.report.chart_data;
        let chart_json = (!chart.is_empty()).then(|| chart.to_script_json());
        let insights = insights(&data.quick_stats, &rows);

        let tabs = ReportKind::ALL
            .into_iter()
            .map(|k| ReportTab {
                key: k.key(),
                title: k.title(),
                icon: k.icon(),
                href: request.href_for(k),
                active: k == kind,
            })
            .collect();

        Self {
            ctx,
            report_key: kind.key(),
            report_title: kind.title(),
            report_icon: kind.icon(),
            period_label: request.period_label(),
            tabs,
            year_options: options(YEAR_RANGE, request.year, |y| y.to_string()),
            month_options: options(MONTH_RANGE, request.month as i32, |m| {
                month_name(m as u32).to_string()
            }),
            quarter_options: options(QUARTER_RANGE, request.quarter as i32, |q| format!("Q{q}")),
            success: success.filter(|s| !s.is_empty()),
            error,
            quick_stats: data.quick_stats,
            rows,
            chart_json,
            chart_type: kind.chart_type(),
            activities: data.activities,
            insights,
        }
    }

    pub fn is_monthly(&self) -> bool {
        self.report_key == ReportKind::Monthly.key()
    }
}

fn options(range: (i32, i32), selected: i32, label: impl Fn(i32) -> String) -> Vec<SelectOption> {
    (range.0..=range.1)
        .map(|value| SelectOption { value, label: label(value), selected: value == selected })
        .collect()
}
