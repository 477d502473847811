use super::params::ReportRequest;
use super::source::ReportSource;
use super::types::{ActivityEntry, ChartData, DivisionScope, QuickStats, ReportData, ReportKind};
use crate::errors::AppError;

#[derive(Debug, Clone, Default)]
pub struct ReportResult {
    pub report_data: ReportData,
    pub chart_data: ChartData,
}

/// Everything the reports page shows besides session fields and the request itself.
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub report: ReportResult,
    pub activities: Vec<ActivityEntry>,
    pub quick_stats: QuickStats,
}

/// Run the table query and then the chart query for the requested kind.
pub async fn fetch_report<S: ReportSource>(
    source: &S,
    scope: &DivisionScope,
    request: &ReportRequest,
) -> Result<ReportResult, sqlx::Error> {
    let (report_data, chart_data) = match request.kind() {
        ReportKind::Overview => (
            source.overview_stats(scope).await?,
            source.monthly_registration_trend(scope).await?,
        ),
        ReportKind::Population => (
            source.population_stats(scope).await?,
            source.population_distribution(scope).await?,
        ),
        ReportKind::Family => (
            source.family_stats(scope).await?,
            source.family_size_distribution(scope).await?,
        ),
        ReportKind::Demographic => (
            source.demographic_stats(scope).await?,
            source.demographic_distribution(scope).await?,
        ),
        ReportKind::Education => (
            source.education_stats(scope).await?,
            source.education_distribution(scope).await?,
        ),
        ReportKind::Employment => (
            source.employment_stats(scope).await?,
            source.employment_distribution(scope).await?,
        ),
        ReportKind::Health => (
            source.health_stats(scope).await?,
            source.health_chart(scope).await?,
        ),
        ReportKind::AgeGroup => (
            source.age_group_stats(scope).await?,
            source.age_pyramid(scope).await?,
        ),
        ReportKind::Gender => (
            source.gender_stats(scope).await?,
            source.gender_chart(scope).await?,
        ),
        ReportKind::Monthly => (
            source.monthly_report(scope, request.year, request.month).await?,
            source.monthly_comparison(scope, request.year, request.month).await?,
        ),
    };

    Ok(ReportResult { report_data, chart_data })
}

/// Load the whole page. Any failure aborts the load; the caller decides how to degrade.
pub async fn load_page_data<S: ReportSource>(
    source: &S,
    scope: &DivisionScope,
    request: &ReportRequest,
    activity_limit: i64,
) -> Result<PageData, AppError> {
    let report = fetch_report(source, scope, request).await?;

    // Independent of the report kind, so run side by side.
    let (activities, quick_stats) = tokio::try_join!(
        source.recent_activities(scope, activity_limit),
        source.quick_stats(scope),
    )?;

    Ok(PageData { report, activities, quick_stats })
}
