use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analytics {
    #[serde(default)]
    pub totals: AnalyticsTotals,
    #[serde(default)]
    pub series: AnalyticsSeries,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsTotals {
    pub users: i64,
    pub students: i64,
    pub staff: i64,
    pub workers: i64,
    pub open_issues: i64,
    pub inprogress_issues: i64,
    pub resolved_issues: i64,
    pub notices: i64,
    pub doctors: i64,
    pub doctors_available_today: i64,
    pub student_medical_records: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSeries {
    pub issues_last_30_days: Vec<DateCount>,
    pub notices_last_12_months: Vec<MonthCount>,
    pub issues_by_status: Vec<StatusCount>,
    pub top_reporters: Vec<ReporterCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterCount {
    pub reporter: String,
    pub count: i64,
}
