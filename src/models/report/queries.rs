use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::{Value, json};
use sqlx::PgPool;

use super::params::month_name;
use super::source::ReportSource;
use super::types::{
    ActivityEntry, ChartData, ChartDataset, ChartPoint, ChartSeries, DivisionScope, QuickStats,
    ReportData,
};

// ---------- Category expressions (fixed SQL, never user input) ----------

const AGE_BAND: &str = "CASE \
    WHEN c.date_of_birth IS NULL THEN 'Unknown' \
    WHEN age(c.date_of_birth) < INTERVAL '5 years' THEN '0-4' \
    WHEN age(c.date_of_birth) < INTERVAL '15 years' THEN '5-14' \
    WHEN age(c.date_of_birth) < INTERVAL '25 years' THEN '15-24' \
    WHEN age(c.date_of_birth) < INTERVAL '40 years' THEN '25-39' \
    WHEN age(c.date_of_birth) < INTERVAL '60 years' THEN '40-59' \
    ELSE '60+' END";
// Youngest band first, unknown last.
const AGE_ORDER: &str = "MIN(COALESCE(c.date_of_birth, DATE '1800-01-01')) DESC";

const ETHNICITY: &str = "COALESCE(NULLIF(c.ethnicity, ''), 'Not specified')";
const EDUCATION: &str = "COALESCE(NULLIF(c.education_level, ''), 'Not specified')";
const EMPLOYMENT: &str = "COALESCE(NULLIF(c.employment_status, ''), 'Not specified')";
const HEALTH: &str = "COALESCE(NULLIF(c.health_condition, ''), 'None reported')";
const GENDER: &str = "INITCAP(COALESCE(NULLIF(c.gender, ''), 'unknown'))";
const BY_COUNT: &str = "count DESC, category";

// ---------- Row types ----------

#[derive(Debug, Clone, Default, sqlx::FromRow)]
struct PopulationRow {
    total: i64,
    male: i64,
    female: i64,
    children: i64,
    adults: i64,
    seniors: i64,
    disabled: i64,
}

#[derive(Debug, Clone, Default, sqlx::FromRow)]
struct OverviewRow {
    families: i64,
    citizens: i64,
    male: i64,
    female: i64,
    this_month: i64,
    last_month: i64,
}

#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
struct MonthCounts {
    families: i64,
    citizens: i64,
    births: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ActivityRow {
    action: String,
    description: String,
    details: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, sqlx::FromRow)]
struct QuickStatsRow {
    total_families: i64,
    total_population: i64,
    this_month_registrations: i64,
}

// ---------- Generator ----------

/// Postgres-backed report source over the `families` / `citizens` / `activity_log` tables.
#[derive(Clone)]
pub struct PgReportGenerator {
    pool: PgPool,
}

impl PgReportGenerator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Citizen counts grouped by a fixed category expression.
    async fn grouped(
        &self,
        scope: &DivisionScope,
        category: &str,
        order: &str,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        let sql = format!(
            "SELECT {category} AS category, COUNT(*) AS count \
             FROM citizens c \
             WHERE c.office_code = $1 \
             GROUP BY 1 \
             ORDER BY {order}"
        );
        sqlx::query_as::<_, (String, i64)>(&sql)
            .bind(scope.office_code())
            .fetch_all(&self.pool)
            .await
    }

    async fn family_sizes(&self, scope: &DivisionScope) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT CASE \
                        WHEN m.members <= 1 THEN '1 member' \
                        WHEN m.members <= 3 THEN '2-3 members' \
                        WHEN m.members <= 5 THEN '4-5 members' \
                        ELSE '6+ members' END AS category, \
                    COUNT(*) AS count \
             FROM ( \
                 SELECT f.id, COUNT(c.id) AS members \
                 FROM families f \
                 LEFT JOIN citizens c ON c.family_id = f.id \
                 WHERE f.office_code = $1 \
                 GROUP BY f.id \
             ) m \
             GROUP BY 1 \
             ORDER BY MIN(m.members)",
        )
        .bind(scope.office_code())
        .fetch_all(&self.pool)
        .await
    }

    async fn month_counts(
        &self,
        scope: &DivisionScope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthCounts, sqlx::Error> {
        sqlx::query_as::<_, MonthCounts>(
            "SELECT \
                (SELECT COUNT(*) FROM families \
                  WHERE office_code = $1 AND registered_at >= $2 AND registered_at < $3) AS families, \
                (SELECT COUNT(*) FROM citizens \
                  WHERE office_code = $1 AND created_at >= $2 AND created_at < $3) AS citizens, \
                (SELECT COUNT(*) FROM citizens \
                  WHERE office_code = $1 AND date_of_birth >= $2 AND date_of_birth < $3) AS births",
        )
        .bind(scope.office_code())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
    }
}

impl ReportSource for PgReportGenerator {
    async fn overview_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        let row = sqlx::query_as::<_, OverviewRow>(
            "SELECT \
                (SELECT COUNT(*) FROM families WHERE office_code = $1) AS families, \
                (SELECT COUNT(*) FROM citizens WHERE office_code = $1) AS citizens, \
                (SELECT COUNT(*) FROM citizens WHERE office_code = $1 AND gender = 'male') AS male, \
                (SELECT COUNT(*) FROM citizens WHERE office_code = $1 AND gender = 'female') AS female, \
                (SELECT COUNT(*) FROM citizens \
                  WHERE office_code = $1 AND created_at >= date_trunc('month', NOW())) AS this_month, \
                (SELECT COUNT(*) FROM citizens \
                  WHERE office_code = $1 \
                    AND created_at >= date_trunc('month', NOW()) - INTERVAL '1 month' \
                    AND created_at < date_trunc('month', NOW())) AS last_month",
        )
        .bind(scope.office_code())
        .fetch_one(&self.pool)
        .await?;

        let mut data = ReportData::new();
        data.insert("Total Families".into(), json!({ "count": row.families }));
        data.insert("Total Population".into(), json!({ "count": row.citizens }));
        data.insert("Male".into(), counted(row.male, row.citizens, None));
        data.insert("Female".into(), counted(row.female, row.citizens, None));
        data.insert(
            "New This Month".into(),
            counted(row.this_month, 0, pct_change(row.this_month, row.last_month)),
        );
        Ok(data)
    }

    async fn population_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        let row = sqlx::query_as::<_, PopulationRow>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE c.gender = 'male') AS male, \
                    COUNT(*) FILTER (WHERE c.gender = 'female') AS female, \
                    COUNT(*) FILTER (WHERE age(c.date_of_birth) < INTERVAL '18 years') AS children, \
                    COUNT(*) FILTER (WHERE age(c.date_of_birth) >= INTERVAL '18 years' \
                                       AND age(c.date_of_birth) < INTERVAL '60 years') AS adults, \
                    COUNT(*) FILTER (WHERE age(c.date_of_birth) >= INTERVAL '60 years') AS seniors, \
                    COUNT(*) FILTER (WHERE c.has_disability) AS disabled \
             FROM citizens c \
             WHERE c.office_code = $1",
        )
        .bind(scope.office_code())
        .fetch_one(&self.pool)
        .await?;

        let mut data = ReportData::new();
        data.insert("Total Population".into(), counted(row.total, row.total, None));
        for (label, count) in [
            ("Male", row.male),
            ("Female", row.female),
            ("Children (0-17)", row.children),
            ("Adults (18-59)", row.adults),
            ("Seniors (60+)", row.seniors),
            ("Persons with Disability", row.disabled),
        ] {
            data.insert(label.into(), counted(count, row.total, None));
        }
        Ok(data)
    }

    async fn family_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        Ok(with_percentages(self.family_sizes(scope).await?))
    }

    async fn demographic_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        Ok(with_percentages(self.grouped(scope, ETHNICITY, BY_COUNT).await?))
    }

    async fn education_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        Ok(with_percentages(self.grouped(scope, EDUCATION, BY_COUNT).await?))
    }

    async fn employment_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        Ok(with_percentages(self.grouped(scope, EMPLOYMENT, BY_COUNT).await?))
    }

    async fn health_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        Ok(with_percentages(self.grouped(scope, HEALTH, BY_COUNT).await?))
    }

    async fn age_group_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        Ok(with_percentages(self.grouped(scope, AGE_BAND, AGE_ORDER).await?))
    }

    async fn gender_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        Ok(with_percentages(self.grouped(scope, GENDER, BY_COUNT).await?))
    }

    async fn monthly_report(
        &self,
        scope: &DivisionScope,
        year: i32,
        month: u32,
    ) -> Result<ReportData, sqlx::Error> {
        let (prev, start, end) = month_bounds(year, month)?;
        let current = self.month_counts(scope, start, end).await?;
        let previous = self.month_counts(scope, prev, start).await?;

        let mut data = ReportData::new();
        for (label, now, before) in [
            ("New Families", current.families, previous.families),
            ("New Citizens", current.citizens, previous.citizens),
            ("Births", current.births, previous.births),
        ] {
            data.insert(label.into(), counted(now, 0, pct_change(now, before)));
        }
        Ok(data)
    }

    async fn monthly_registration_trend(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT to_char(m.month, 'Mon YYYY') AS label, COUNT(c.id) AS count \
             FROM generate_series( \
                     date_trunc('month', NOW()) - INTERVAL '11 months', \
                     date_trunc('month', NOW()), \
                     INTERVAL '1 month') AS m(month) \
             LEFT JOIN citizens c \
                    ON c.office_code = $1 \
                   AND c.created_at >= m.month \
                   AND c.created_at < m.month + INTERVAL '1 month' \
             GROUP BY m.month \
             ORDER BY m.month",
        )
        .bind(scope.office_code())
        .fetch_all(&self.pool)
        .await?;

        let (labels, data): (Vec<String>, Vec<f64>) =
            rows.into_iter().map(|(label, count)| (label, count as f64)).unzip();
        Ok(ChartData::Series(ChartSeries {
            labels,
            datasets: vec![dataset("Registrations", data, "#0d6efd")],
        }))
    }

    async fn population_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        Ok(points(self.grouped(scope, AGE_BAND, AGE_ORDER).await?))
    }

    async fn family_size_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        Ok(points(self.family_sizes(scope).await?))
    }

    async fn demographic_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        Ok(points(self.grouped(scope, ETHNICITY, BY_COUNT).await?))
    }

    async fn education_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        Ok(points(self.grouped(scope, EDUCATION, BY_COUNT).await?))
    }

    async fn employment_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        Ok(points(self.grouped(scope, EMPLOYMENT, BY_COUNT).await?))
    }

    async fn health_chart(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        Ok(points(self.grouped(scope, HEALTH, BY_COUNT).await?))
    }

    async fn age_pyramid(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        let sql = format!(
            "SELECT {AGE_BAND} AS category, \
                    COUNT(*) FILTER (WHERE c.gender = 'male') AS male, \
                    COUNT(*) FILTER (WHERE c.gender = 'female') AS female \
             FROM citizens c \
             WHERE c.office_code = $1 \
             GROUP BY 1 \
             ORDER BY {AGE_ORDER}"
        );
        let rows = sqlx::query_as::<_, (String, i64, i64)>(&sql)
            .bind(scope.office_code())
            .fetch_all(&self.pool)
            .await?;

        let mut labels = Vec::with_capacity(rows.len());
        let mut male = Vec::with_capacity(rows.len());
        let mut female = Vec::with_capacity(rows.len());
        for (band, m, f) in rows {
            labels.push(band);
            male.push(m as f64);
            female.push(f as f64);
        }
        Ok(ChartData::Series(ChartSeries {
            labels,
            datasets: vec![dataset("Male", male, "#0d6efd"), dataset("Female", female, "#d63384")],
        }))
    }

    async fn gender_chart(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        Ok(points(self.grouped(scope, GENDER, BY_COUNT).await?))
    }

    async fn monthly_comparison(
        &self,
        scope: &DivisionScope,
        year: i32,
        month: u32,
    ) -> Result<ChartData, sqlx::Error> {
        let (prev, start, end) = month_bounds(year, month)?;
        let current = self.month_counts(scope, start, end).await?;
        let previous = self.month_counts(scope, prev, start).await?;

        let series = |c: MonthCounts| vec![c.families as f64, c.citizens as f64, c.births as f64];
        Ok(ChartData::Series(ChartSeries {
            labels: vec!["New Families".into(), "New Citizens".into(), "Births".into()],
            datasets: vec![
                dataset(&month_label(prev), series(previous), "#adb5bd"),
                dataset(&month_label(start), series(current), "#0d6efd"),
            ],
        }))
    }

    async fn recent_activities(
        &self,
        scope: &DivisionScope,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            "SELECT action, description, details, created_at \
             FROM activity_log \
             WHERE office_code = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2",
        )
        .bind(scope.office_code())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|r| ActivityEntry {
                title: humanize(&r.action),
                description: r.description,
                details: r.details,
                time_ago: time_ago(r.created_at, now),
            })
            .collect())
    }

    async fn quick_stats(&self, scope: &DivisionScope) -> Result<QuickStats, sqlx::Error> {
        let row = sqlx::query_as::<_, QuickStatsRow>(
            "SELECT \
                (SELECT COUNT(*) FROM families WHERE office_code = $1) AS total_families, \
                (SELECT COUNT(*) FROM citizens WHERE office_code = $1) AS total_population, \
                (SELECT COUNT(*) FROM citizens \
                  WHERE office_code = $1 AND created_at >= date_trunc('month', NOW())) AS this_month_registrations",
        )
        .bind(scope.office_code())
        .fetch_one(&self.pool)
        .await?;

        let avg_family_size = if row.total_families > 0 {
            row.total_population as f64 / row.total_families as f64
        } else {
            0.0
        };
        Ok(QuickStats {
            total_families: row.total_families,
            total_population: row.total_population,
            avg_family_size,
            this_month_registrations: row.this_month_registrations,
        })
    }
}

// ---------- Helpers ----------

/// `{count, percentage?, trend?}`; percentage is omitted when `total` is 0.
fn counted(count: i64, total: i64, trend: Option<f64>) -> Value {
    let mut record = serde_json::Map::new();
    record.insert("count".into(), json!(count));
    if total > 0 {
        record.insert("percentage".into(), json!(round1(count as f64 * 100.0 / total as f64)));
    }
    if let Some(t) = trend {
        record.insert("trend".into(), json!(t));
    }
    Value::Object(record)
}

fn with_percentages(rows: Vec<(String, i64)>) -> ReportData {
    let total: i64 = rows.iter().map(|(_, n)| n).sum();
    rows.into_iter()
        .map(|(category, count)| (category, counted(count, total, None)))
        .collect()
}

fn points(rows: Vec<(String, i64)>) -> ChartData {
    ChartData::Points(
        rows.into_iter()
            .map(|(label, count)| ChartPoint { label, value: count as f64 })
            .collect(),
    )
}

fn dataset(label: &str, data: Vec<f64>, color: &str) -> ChartDataset {
    let mut options = serde_json::Map::new();
    options.insert("backgroundColor".into(), json!(color));
    options.insert("borderColor".into(), json!(color));
    ChartDataset { label: label.to_string(), data, options }
}

/// Percent change, `None` when there is nothing to compare against.
fn pct_change(current: i64, previous: i64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some(round1((current - previous) as f64 * 100.0 / previous as f64))
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// First day of the previous month, of `year-month`, and of the month after.
fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate, NaiveDate), sqlx::Error> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| sqlx::Error::Protocol(format!("invalid report month {year}-{month}")))?;
    let prev = start
        .checked_sub_months(chrono::Months::new(1))
        .ok_or_else(|| sqlx::Error::Protocol("month out of range".to_string()))?;
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .ok_or_else(|| sqlx::Error::Protocol("month out of range".to_string()))?;
    Ok((prev, start, end))
}

fn month_label(date: NaiveDate) -> String {
    format!("{} {}", month_name(date.month()), date.year())
}

/// "family_registered" -> "Family registered"
fn humanize(action: &str) -> String {
    let spaced = action.replace(['_', '.'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    let plural = |n: i64, unit: &str| {
        if n == 1 { format!("1 {unit} ago") } else { format!("{n} {unit}s ago") }
    };
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => plural(secs / 60, "minute"),
        3600..=86_399 => plural(secs / 3600, "hour"),
        86_400..=2_591_999 => plural(secs / 86_400, "day"),
        _ => at.format("%Y-%m-%d").to_string(),
    }
}
