//! Bus timetable with "departing soon" highlighting.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::models::{BusRoute, RemoteTimetable};

pub const HIGHLIGHT_WINDOW_MINUTES: i64 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct ScheduledTime {
    pub time: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteView {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub times: Vec<ScheduledTime>,
}

/// Parses "08:00 AM" style times. 12 PM stays noon, 12 AM is midnight.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let (clock, period) = raw.trim().split_once(' ')?;
    let (hour, minute) = clock.split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour = match period.trim().to_ascii_uppercase().as_str() {
        "AM" => hour % 12,
        "PM" => hour % 12 + 12,
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// True when `now` is within 20 minutes of `time` on the same date.
///
/// Only hours and minutes are compared; the seconds of `now` do not count.
/// Times that do not parse are never highlighted.
pub fn is_highlighted(time: &str, now: NaiveDateTime) -> bool {
    let Some(scheduled) = parse_clock(time) else {
        return false;
    };
    let Some(now_minute) = now.with_second(0).and_then(|t| t.with_nanosecond(0)) else {
        return false;
    };
    let scheduled = now.date().and_time(scheduled);

    (now_minute - scheduled).num_minutes().abs() <= HIGHLIGHT_WINDOW_MINUTES
}

pub fn default_routes() -> Vec<BusRoute> {
    let route = |id: i64, title: &str, subtitle: &str, times: &[&str]| BusRoute {
        id,
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        times: times.iter().map(|t| t.to_string()).collect(),
    };

    vec![
        route(
            1,
            "Starts from Gram Panchayat Waranga till Panchsheel Square",
            "Scheduled from 08:00 AM till 08:35 PM",
            &[
                "08:00 AM", "09:10 AM", "10:00 AM", "10:40 AM", "11:45 AM", "12:30 PM",
                "02:25 PM", "03:30 PM", "04:55 PM", "06:00 PM", "06:20 PM", "08:35 PM",
            ],
        ),
        route(
            2,
            "Starts from Panchsheel Square till Gram Panchayat Waranga",
            "Scheduled from 06:55 AM till 07:30 PM",
            &[
                "06:55 AM", "08:00 AM", "08:50 AM", "09:10 AM", "10:30 AM", "11:10 AM",
                "01:10 PM", "02:15 PM", "03:40 PM", "04:45 PM", "05:15 PM", "07:30 PM",
            ],
        ),
    ]
}

/// Routes published by the backend. Empty schedules are skipped.
pub fn routes_from_remote(rows: Vec<RemoteTimetable>) -> Vec<BusRoute> {
    rows.into_iter()
        .filter_map(|row| {
            let times: Vec<String> = row
                .schedule
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            let first = times.first()?.clone();
            let last = times.last()?.clone();
            Some(BusRoute {
                id: row.id,
                title: row.route_name,
                subtitle: format!("Scheduled from {} till {}", first, last),
                times,
            })
        })
        .collect()
}

pub fn annotate(routes: &[BusRoute], now: NaiveDateTime) -> Vec<RouteView> {
    routes
        .iter()
        .map(|route| RouteView {
            id: route.id,
            title: route.title.clone(),
            subtitle: route.subtitle.clone(),
            times: route
                .times
                .iter()
                .map(|t| ScheduledTime {
                    time: t.clone(),
                    highlighted: is_highlighted(t, now),
                })
                .collect(),
        })
        .collect()
}
