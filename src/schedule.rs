// Staggered rest-break scheduling for a shift roster.
//
// Each agent gets the same break pattern; agent i's first break starts
// i staggers after agent 0's, and the rest of the agent's breaks chain
// from that first break. The stagger shifts phase between consecutive
// agents but does not cap how many agents are on break at once; callers
// needing a hard coverage floor must add that constraint themselves.
use crate::error::{ReportError, Result};
use crate::types::{Cell, ReportTable, ScheduleEntry};
use crate::util::fmt_clock;
use chrono::{Duration, NaiveTime};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

const SHIFT_HOURS: i64 = 9;

/// Allowed shift-start selections, keyed by the number the planner types.
static SHIFT_STARTS: Lazy<BTreeMap<u8, NaiveTime>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    let t = |h, min| NaiveTime::from_hms_opt(h, min, 0).unwrap();
    m.insert(9, t(9, 0));
    m.insert(7, t(7, 0));
    m.insert(11, t(11, 0));
    m.insert(10, t(22, 0));
    m.insert(4, t(16, 0));
    m.insert(1, t(13, 0));
    m
});

pub fn shift_start(choice: &str) -> Result<NaiveTime> {
    choice
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(|n| SHIFT_STARTS.get(&n).copied())
        .ok_or_else(|| ReportError::ShiftStart(choice.trim().to_string()))
}

/// One step of a break pattern: how long after the previous break ends
/// this one starts, and how long it lasts.
#[derive(Debug, Clone, Copy)]
struct BreakStep {
    offset: Duration,
    duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakSchema {
    /// 15-30-15: breaks 2h apart, 15m stagger between agents.
    ThreeBreak,
    /// 30-30: breaks 3h apart, 30m stagger between agents.
    TwoBreak,
}

impl BreakSchema {
    pub fn parse(choice: &str) -> Result<Self> {
        match choice.trim() {
            "1" => Ok(BreakSchema::ThreeBreak),
            "2" => Ok(BreakSchema::TwoBreak),
            other => Err(ReportError::BreakSchema(other.to_string())),
        }
    }

    fn steps(&self) -> Vec<BreakStep> {
        let step = |offset_h: i64, dur_m: i64| BreakStep {
            offset: Duration::hours(offset_h),
            duration: Duration::minutes(dur_m),
        };
        match self {
            BreakSchema::ThreeBreak => vec![step(2, 15), step(2, 30), step(2, 15)],
            BreakSchema::TwoBreak => vec![step(2, 30), step(3, 30)],
        }
    }

    /// Per-agent phase shift: the duration of the schema's first break, so
    /// consecutive agents never start their first break together.
    fn stagger(&self) -> Duration {
        self.steps()[0].duration
    }

    pub fn break_headers(&self) -> Vec<String> {
        self.steps()
            .iter()
            .map(|s| format!("{} Min Break", s.duration.num_minutes()))
            .collect()
    }
}

/// Compute the staggered schedule for an ordered roster.
///
/// Agent i's first break = shift start + first offset + i * stagger; later
/// breaks chain from that agent's own first break. Every agent shares the
/// same 9-hour shift window.
pub fn build_schedule(
    agents: &[String],
    shift_start: NaiveTime,
    schema: BreakSchema,
) -> Vec<ScheduleEntry> {
    let steps = schema.steps();
    let stagger = schema.stagger();
    let shift_end = shift_start + Duration::hours(SHIFT_HOURS);

    agents
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut breaks = Vec::with_capacity(steps.len());
            let mut at = shift_start + steps[0].offset + stagger * i as i32;
            breaks.push(at);
            for pair in steps.windows(2) {
                at += pair[0].duration + pair[1].offset;
                breaks.push(at);
            }
            ScheduleEntry {
                name: name.clone(),
                shift_start,
                breaks,
                shift_end,
            }
        })
        .collect()
}

/// Lay the schedule out as a renderable table, one row per agent.
pub fn schedule_table(entries: &[ScheduleEntry], schema: BreakSchema) -> ReportTable {
    let mut headers = vec!["Agent Name".to_string(), "Start Time".to_string()];
    headers.extend(schema.break_headers());
    headers.push("End Time".to_string());

    let rows = entries
        .iter()
        .map(|e| {
            let mut cells = vec![
                Cell::Text(e.name.clone()),
                Cell::Text(fmt_clock(e.shift_start)),
            ];
            cells.extend(e.breaks.iter().map(|b| Cell::Text(fmt_clock(*b))));
            cells.push(Cell::Text(fmt_clock(e.shift_end)));
            cells
        })
        .collect();
    ReportTable {
        headers,
        rows,
        has_total_row: false,
    }
}
