use chrono::{NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One raw survey row as it arrives from the CSV, before any coercion.
///
/// Field names here are the canonical schema names; the ingestor trims and
/// canonicalizes the actual header row before deserializing against it.
#[derive(Debug, Deserialize)]
pub struct RawSurveyRow {
    #[serde(rename = "Agent Name")]
    pub agent: Option<String>,
    #[serde(rename = "Answer")]
    pub answer: Option<String>,
    #[serde(rename = "Customer Phone Number")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawTicketRow {
    #[serde(rename = "Ticket Id")]
    pub ticket_id: Option<String>,
    #[serde(rename = "Ticket Owner")]
    pub owner: Option<String>,
    #[serde(rename = "Team")]
    pub team: Option<String>,
    #[serde(rename = "Ticket Closed Time")]
    pub closed_time: Option<String>,
}

/// Coerced result of a single observation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Positive,
    Negative,
    Excluded,
}

/// A survey row after coercion. Excluded records never enter aggregation
/// counts; they are tallied separately for the run accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRecord {
    pub group_key: String,
    pub outcome: Outcome,
}

/// Field-coercion spec handed to the ingestor: which column carries the
/// outcome, which token means "no outcome", and how coerced values map
/// into the outcome domain.
#[derive(Debug, Clone)]
pub struct CoercionSpec {
    pub outcome_field: &'static str,
    pub group_field: &'static str,
    pub exclusion_token: &'static str,
    pub outcome_map: BTreeMap<i64, Outcome>,
}

impl Default for CoercionSpec {
    fn default() -> Self {
        let mut outcome_map = BTreeMap::new();
        outcome_map.insert(0, Outcome::Excluded);
        outcome_map.insert(1, Outcome::Positive);
        outcome_map.insert(2, Outcome::Negative);
        CoercionSpec {
            outcome_field: "Answer",
            group_field: "Agent Name",
            exclusion_token: "No_Answer",
            outcome_map,
        }
    }
}

/// A cleaned ticket record used by the productivity pivot.
#[derive(Debug, Clone)]
pub struct TicketRecord {
    pub ticket_id: String,
    pub owner: String,
    pub team: String,
    pub closed: NaiveDateTime,
}

/// One aggregated group. The derived metrics are methods so they can never
/// drift from the counts they are defined on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggRow {
    pub group_key: String,
    pub positive: u64,
    pub negative: u64,
}

impl AggRow {
    pub fn eligible(&self) -> u64 {
        self.positive + self.negative
    }

    /// Positive / (Positive + Negative), or `None` when the group has no
    /// eligible observations.
    pub fn ratio(&self) -> Option<f64> {
        let eligible = self.eligible();
        if eligible == 0 {
            None
        } else {
            Some(self.positive as f64 / eligible as f64)
        }
    }
}

/// A finished survey report: sorted data rows plus the synthesized grand
/// total, kept apart so the total can never be re-sorted into the body.
#[derive(Debug, Clone)]
pub struct SurveyReport {
    pub rows: Vec<AggRow>,
    pub total: AggRow,
}

/// Two-dimensional owner x team count table; the margin row is synthesized
/// by the aggregation engine and appended last.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub teams: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub owner: String,
    pub counts: Vec<u64>,
}

impl PivotRow {
    pub fn row_total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// One cell of a rendered report. `Percent` carries the raw ratio in
/// [0, 1]; the renderer owns its on-sheet formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Percent(f64),
}

impl Cell {
    pub fn display_string(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Percent(p) => format!("{:.0}%", p * 100.0),
        }
    }

    /// Character width as it will appear on the sheet, used for column
    /// auto-sizing.
    pub fn display_width(&self) -> usize {
        self.display_string().chars().count()
    }
}

/// An ordered table ready for the renderer: header names plus rows of
/// cells. When `has_total_row` is set the last row is the grand-total /
/// margin row and is styled (and excluded from color scaling) accordingly.
#[derive(Debug, Clone)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub has_total_row: bool,
}

impl ReportTable {
    /// Index of a header by name, for explicit named-field access.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// One agent's computed shift: fixed window plus staggered break times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub name: String,
    pub shift_start: NaiveTime,
    pub breaks: Vec<NaiveTime>,
    pub shift_end: NaiveTime,
}
