use super::types::{ActivityEntry, ChartData, DivisionScope, QuickStats, ReportData};

/// Read-only aggregate queries behind the reports page. Every call is
/// restricted to a single division.
#[allow(async_fn_in_trait)]
pub trait ReportSource {
    // Tabular stats
    async fn overview_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error>;
    async fn population_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error>;
    async fn family_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error>;
    async fn demographic_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error>;
    async fn education_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error>;
    async fn employment_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error>;
    async fn health_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error>;
    async fn age_group_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error>;
    async fn gender_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error>;
    async fn monthly_report(
        &self,
        scope: &DivisionScope,
        year: i32,
        month: u32,
    ) -> Result<ReportData, sqlx::Error>;

    // Chart series
    async fn monthly_registration_trend(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error>;
    async fn population_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error>;
    async fn family_size_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error>;
    async fn demographic_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error>;
    async fn education_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error>;
    async fn employment_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error>;
    async fn health_chart(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error>;
    async fn age_pyramid(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error>;
    async fn gender_chart(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error>;
    async fn monthly_comparison(
        &self,
        scope: &DivisionScope,
        year: i32,
        month: u32,
    ) -> Result<ChartData, sqlx::Error>;

    // Sidebar
    async fn recent_activities(
        &self,
        scope: &DivisionScope,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, sqlx::Error>;
    async fn quick_stats(&self, scope: &DivisionScope) -> Result<QuickStats, sqlx::Error>;
}
