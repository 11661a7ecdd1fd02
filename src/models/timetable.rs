use serde::{Deserialize, Serialize};

/// Row of `/api/timetable`: `schedule` is a comma-joined list like "08:00 AM, 09:10 AM".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTimetable {
    pub id: i64,
    pub route_name: String,
    #[serde(default)]
    pub schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusRoute {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub times: Vec<String>,
}
