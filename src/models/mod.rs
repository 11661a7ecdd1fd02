pub mod analytics;
pub mod hostel_exit;
pub mod issue;
pub mod marketplace;
pub mod medical;
pub mod mess;
pub mod notice;
pub mod timetable;
pub mod user;
pub mod worker;

pub use analytics::{Analytics, AnalyticsSeries, AnalyticsTotals};
pub use hostel_exit::{ExitDecision, ExitRequest, ExitRequestDraft};
pub use issue::{Issue, IssueDraft, IssueEdit, IssueStatus};
pub use marketplace::{MarketplaceItem, MarketplaceSearch, MarketplaceStatus, NearbyShops};
pub use medical::{Doctor, DoctorDraft, StudentRecord, StudentRecordDraft};
pub use mess::{MessDraft, MessItem, MessUpdate};
pub use notice::{Notice, NoticeDraft, NoticeUpdate};
pub use timetable::{BusRoute, RemoteTimetable};
pub use user::{NewWorker, ProfileUpdate, SignupDraft, User, UserRole};
pub use worker::{Category, Worker};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Ids and authors come back as numbers from some endpoints and strings from others.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string_or_number(deserializer)?.unwrap_or_default())
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
