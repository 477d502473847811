use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------- Scope ----------

/// Division a query is restricted to. Only built from an authenticated session,
/// so no report query can run without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionScope {
    office_code: String,
}

impl DivisionScope {
    pub(crate) fn new(office_code: &str) -> Self {
        Self { office_code: office_code.to_string() }
    }

    pub fn office_code(&self) -> &str {
        &self.office_code
    }
}

// ---------- Report kinds ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Overview,
    Population,
    Family,
    Demographic,
    Education,
    Employment,
    Health,
    AgeGroup,
    Gender,
    Monthly,
}

impl ReportKind {
    /// Tab order on the reports page.
    pub const ALL: [ReportKind; 10] = [
        ReportKind::Overview,
        ReportKind::Population,
        ReportKind::Family,
        ReportKind::Demographic,
        ReportKind::Education,
        ReportKind::Employment,
        ReportKind::Health,
        ReportKind::AgeGroup,
        ReportKind::Gender,
        ReportKind::Monthly,
    ];

    /// Exact, case-sensitive match on the query-string key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    pub fn key(self) -> &'static str {
        match self {
            ReportKind::Overview => "overview",
            ReportKind::Population => "population",
            ReportKind::Family => "family",
            ReportKind::Demographic => "demographic",
            ReportKind::Education => "education",
            ReportKind::Employment => "employment",
            ReportKind::Health => "health",
            ReportKind::AgeGroup => "age_group",
            ReportKind::Gender => "gender",
            ReportKind::Monthly => "monthly",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Overview => "Overview Report",
            ReportKind::Population => "Population Statistics",
            ReportKind::Family => "Family Statistics",
            ReportKind::Demographic => "Demographic Analysis",
            ReportKind::Education => "Education Statistics",
            ReportKind::Employment => "Employment Statistics",
            ReportKind::Health => "Health Statistics",
            ReportKind::AgeGroup => "Age Group Analysis",
            ReportKind::Gender => "Gender Distribution",
            ReportKind::Monthly => "Monthly Report",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ReportKind::Overview => "bi-speedometer2",
            ReportKind::Population => "bi-people",
            ReportKind::Family => "bi-house",
            ReportKind::Demographic => "bi-globe",
            ReportKind::Education => "bi-mortarboard",
            ReportKind::Employment => "bi-briefcase",
            ReportKind::Health => "bi-heart-pulse",
            ReportKind::AgeGroup => "bi-bar-chart-steps",
            ReportKind::Gender => "bi-gender-ambiguous",
            ReportKind::Monthly => "bi-calendar3",
        }
    }

    /// Chart.js chart type used by the client script.
    pub fn chart_type(self) -> &'static str {
        match self {
            ReportKind::Overview | ReportKind::Monthly => "line",
            ReportKind::Gender | ReportKind::Demographic | ReportKind::Health => "doughnut",
            _ => "bar",
        }
    }
}

// ---------- Tabular stats ----------

/// Category name -> `{count, percentage?, trend?}`, in the order the source produced them.
/// Values are kept loose so a malformed entry can be skipped instead of failing the page.
pub type ReportData = Map<String, Value>;

/// One table row that survived validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub category: String,
    pub count: i64,
    pub percentage: Option<f64>,
    pub trend: Option<f64>,
}

impl ReportRow {
    pub fn percentage_display(&self) -> String {
        match self.percentage {
            Some(p) => format!("{p:.1}%"),
            None => "-".to_string(),
        }
    }

    pub fn trend_display(&self) -> String {
        match self.trend {
            Some(t) if t > 0.0 => format!("+{t:.1}%"),
            Some(t) => format!("{t:.1}%"),
            None => "-".to_string(),
        }
    }

    pub fn trend_class(&self) -> &'static str {
        match self.trend {
            Some(t) if t > 0.0 => "trend-up",
            Some(t) if t < 0.0 => "trend-down",
            _ => "trend-flat",
        }
    }
}

/// Keep only entries that are objects with a numeric `count`; everything else is skipped.
pub fn table_rows(data: &ReportData) -> Vec<ReportRow> {
    data.iter()
        .filter_map(|(category, value)| {
            let record = value.as_object()?;
            let count = numeric(record.get("count")?)?;
            Some(ReportRow {
                category: category.clone(),
                count: count as i64,
                percentage: record.get("percentage").and_then(numeric),
                trend: record.get("trend").and_then(numeric),
            })
        })
        .collect()
}

fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

// ---------- Chart payloads ----------

/// Either a labelled multi-series chart or a flat list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartData {
    Series(ChartSeries),
    Points(Vec<ChartPoint>),
}

impl Default for ChartData {
    fn default() -> Self {
        ChartData::Points(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    /// Styling passed straight through to the chart library.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    #[serde(alias = "category")]
    pub label: String,
    #[serde(alias = "count")]
    pub value: f64,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Series(s) => s.labels.is_empty() || s.datasets.is_empty(),
            ChartData::Points(p) => p.is_empty(),
        }
    }

    /// JSON for embedding inside a `<script>` element; `<`, `>` and `&` are
    /// escaped so category names cannot close the element.
    pub fn to_script_json(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("Failed to serialize chart data: {e}");
            "null".to_string()
        });
        json.replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026")
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029")
    }
}

// ---------- Sidebar data ----------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuickStats {
    pub total_families: i64,
    pub total_population: i64,
    pub avg_family_size: f64,
    pub this_month_registrations: i64,
}

impl QuickStats {
    pub fn avg_family_size_display(&self) -> String {
        format!("{:.1}", self.avg_family_size)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub title: String,
    pub description: String,
    pub details: String,
    pub time_ago: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> ReportData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn rows_skip_non_finite_counts() {
        let rows = table_rows(&data(json!({
            "NaN": {"count": "NaN"},
            "Inf": {"count": "inf"},
            "Huge": {"count": "1e400"},
            "Kept": {"count": "7", "percentage": "NaN", "trend": "-inf"},
        })));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Kept");
        assert_eq!(rows[0].count, 7);
        assert_eq!(rows[0].percentage, None);
        assert_eq!(rows[0].trend, None);
    }

    #[test]
    fn kind_keys_round_trip() {
        for kind in ReportKind::ALL {
            assert_eq!(ReportKind::from_key(kind.key()), Some(kind));
        }
    }

    #[test]
    fn kind_lookup_is_case_sensitive_and_untrimmed() {
        assert_eq!(ReportKind::from_key("Monthly"), None);
        assert_eq!(ReportKind::from_key("monthly "), None);
        assert_eq!(ReportKind::from_key(""), None);
    }

    #[test]
    fn rows_skip_entries_without_count() {
        let rows = table_rows(&data(json!({
            "Male": {"count": 120, "percentage": 48.0},
            "Female": {"percentage": 52.0},
            "Total": 250,
            "Notes": "n/a",
            "Unknown": {"count": null},
        })));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Male");
        assert_eq!(rows[0].count, 120);
        assert_eq!(rows[0].percentage, Some(48.0));
        assert_eq!(rows[0].trend, None);
    }

    #[test]
    fn rows_keep_source_order() {
        let rows = table_rows(&data(json!({
            "Zeta": {"count": 1},
            "Alpha": {"count": 2},
            "Mid": {"count": "3"},
        })));
        let names: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);
        assert_eq!(rows[2].count, 3);
    }

    #[test]
    fn trend_formatting() {
        let row = ReportRow { category: "x".into(), count: 1, percentage: None, trend: Some(2.5) };
        assert_eq!(row.trend_display(), "+2.5%");
        assert_eq!(row.trend_class(), "trend-up");
        let row = ReportRow { trend: Some(-1.25), ..row };
        assert_eq!(row.trend_class(), "trend-down");
        assert_eq!(row.percentage_display(), "-");
    }

    #[test]
    fn chart_points_accept_alternate_field_names() {
        let chart: ChartData = serde_json::from_value(json!([
            {"label": "Employed", "value": 10},
            {"category": "Student", "count": 4},
        ]))
        .unwrap();
        match chart {
            ChartData::Points(points) => {
                assert_eq!(points[1].label, "Student");
                assert_eq!(points[1].value, 4.0);
            }
            other => panic!("expected points, got {other:?}"),
        }
    }

    #[test]
    fn chart_series_keeps_dataset_options() {
        let chart: ChartData = serde_json::from_value(json!({
            "labels": ["Jan", "Feb"],
            "datasets": [{"label": "Registrations", "data": [3, 5], "borderColor": "#0d6efd"}],
        }))
        .unwrap();
        let ChartData::Series(series) = &chart else { panic!("expected series") };
        assert_eq!(series.datasets[0].options.get("borderColor"), Some(&json!("#0d6efd")));
        assert!(!chart.is_empty());
    }

    #[test]
    fn empty_charts() {
        assert!(ChartData::default().is_empty());
        assert!(ChartData::Series(ChartSeries::default()).is_empty());
    }

    #[test]
    fn script_json_cannot_close_the_script_element() {
        let chart = ChartData::Points(vec![ChartPoint {
            label: "</script><b>".into(),
            value: 1.0,
        }]);
        let json = chart.to_script_json();
        assert!(!json.contains("</script>"));
        assert!(json.contains("\\u003c/script\\u003e"));
    }
}
