pub mod dispatch;
pub mod insights;
pub mod params;
pub mod queries;
pub mod source;
pub mod types;

pub use dispatch::{PageData, ReportResult, fetch_report, load_page_data};
pub use insights::{Insight, insights};
pub use params::{ReportQuery, ReportRequest, month_name, sanitize_number};
pub use queries::PgReportGenerator;
pub use source::ReportSource;
pub use types::{
    ActivityEntry, ChartData, ChartDataset, ChartPoint, ChartSeries, DivisionScope, QuickStats,
    ReportData, ReportKind, ReportRow, table_rows,
};
