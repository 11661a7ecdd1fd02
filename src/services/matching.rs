//! Worker suggestions for the admin assignment view.
//!
//! There is no authoritative category-to-worker-type mapping, so this
//! compares whatever category-like text the issue carries against each
//! worker's type, name and id. It over-matches on substring collisions and
//! can come back empty; both are acceptable for a suggestion list.

use serde_json::Value;
use tracing::warn;

use crate::models::{Issue, Worker};

/// Checked in order; `title` is the last resort.
const ISSUE_HINT_FIELDS: [&str; 9] = [
    "category",
    "categoryName",
    "type",
    "issue_type",
    "worker_type",
    "ticket_category",
    "category_id",
    "categoryId",
    "title",
];

const WORKER_TYPE_FIELDS: [&str; 4] = ["worker_type", "type", "category", "workerType"];
const WORKER_NAME_FIELDS: [&str; 3] = ["name", "full_name", "email"];

/// Trimmed, lowercased text form. Missing and null values become "".
pub fn normalize(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_lowercase(),
        Some(other) => other.to_string().trim().to_lowercase(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First truthy field, the way a chain of `a || b || c` picks one.
fn first_truthy(fields: &[&str], lookup: impl Fn(&str) -> Option<Value>) -> Option<Value> {
    fields.iter().filter_map(|f| lookup(f)).find(is_truthy)
}

/// Distinct normalized category hints, in field order. Falls back to the first
/// three words of the description when every hint field is empty.
pub fn issue_category_hints(issue: &Issue) -> Vec<String> {
    let mut hints: Vec<String> = Vec::new();
    for field in ISSUE_HINT_FIELDS {
        let hint = normalize(issue.field(field).as_ref());
        if !hint.is_empty() && !hints.contains(&hint) {
            hints.push(hint);
        }
    }

    if hints.is_empty() {
        let description = normalize(Some(&Value::String(issue.description.clone())));
        if !description.is_empty() {
            hints.push(description.split(' ').take(3).collect::<Vec<_>>().join(" "));
        }
    }
    hints
}

pub fn worker_matches(worker: &Worker, hints: &[String]) -> bool {
    let worker_type = normalize(first_truthy(&WORKER_TYPE_FIELDS, |f| worker.field(f)).as_ref());
    let worker_name = normalize(first_truthy(&WORKER_NAME_FIELDS, |f| worker.field(f)).as_ref());
    let worker_id = worker.id.to_string();

    hints.iter().filter(|h| !h.is_empty()).any(|hint| {
        if !worker_type.is_empty()
            && (*hint == worker_type || hint.contains(&worker_type) || worker_type.contains(hint.as_str()))
        {
            return true;
        }
        if *hint == worker_id {
            return true;
        }
        !worker_name.is_empty() && hint.contains(&worker_name)
    })
}

pub fn candidate_workers<'a>(issue: &Issue, workers: &'a [Worker]) -> Vec<&'a Worker> {
    let hints = issue_category_hints(issue);
    let candidates: Vec<&Worker> = workers.iter().filter(|w| worker_matches(w, &hints)).collect();

    if candidates.is_empty() {
        warn!(
            "No worker candidates for issue id={}. hints={:?}",
            issue.id,
            hints.iter().take(6).collect::<Vec<_>>()
        );
    }
    candidates
}
