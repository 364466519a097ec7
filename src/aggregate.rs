// Grouped aggregation and summary-row synthesis.
//
// Two variants share this module: the survey report (single group key,
// ratio metric) and the productivity pivot (owner x team counts with a
// margin row). Grand totals are always recomputed from summed raw counts,
// never averaged from per-row derived metrics.
use crate::types::{
    AggRow, Cell, Outcome, OutcomeRecord, PivotRow, PivotTable, ReportTable, SurveyReport,
    TicketRecord,
};
use crate::util::fmt_clock;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const TOTAL_LABEL: &str = "Grand Total";

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub rows: Vec<AggRow>,
    pub excluded: usize,
    pub dropped_groups: usize,
}

/// Group outcome records by key, counting positives and negatives.
///
/// Excluded records never enter the counts; groups left with no eligible
/// observations carry no signal and are dropped rather than shown as a
/// misleading 0% row. Rows come back sorted by ratio descending, ties by
/// group key ascending.
pub fn aggregate_survey(records: &[OutcomeRecord]) -> Aggregation {
    let mut counts: HashMap<&str, (u64, u64)> = HashMap::new();
    let mut excluded = 0usize;
    for rec in records {
        match rec.outcome {
            Outcome::Excluded => excluded += 1,
            Outcome::Positive => counts.entry(&rec.group_key).or_default().0 += 1,
            Outcome::Negative => counts.entry(&rec.group_key).or_default().1 += 1,
        }
    }
    // Groups seen only through excluded records never reach `counts`, so
    // the dropped-group tally has to look at the full key set.
    let distinct_keys = records
        .iter()
        .map(|r| r.group_key.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();

    let mut rows: Vec<AggRow> = counts
        .into_iter()
        .map(|(key, (positive, negative))| AggRow {
            group_key: key.to_string(),
            positive,
            negative,
        })
        .filter(|row| row.ratio().is_some())
        .collect();
    rows.sort_by(|a, b| {
        b.ratio()
            .partial_cmp(&a.ratio())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.group_key.cmp(&b.group_key))
    });

    let dropped_groups = distinct_keys - rows.len();
    Aggregation {
        rows,
        excluded,
        dropped_groups,
    }
}

/// Synthesize the grand-total row: element-wise sums of the raw counts,
/// with the ratio recomputed from those sums.
pub fn grand_total(rows: &[AggRow]) -> AggRow {
    AggRow {
        group_key: TOTAL_LABEL.to_string(),
        positive: rows.iter().map(|r| r.positive).sum(),
        negative: rows.iter().map(|r| r.negative).sum(),
    }
}

pub fn survey_report(agg: &Aggregation) -> SurveyReport {
    SurveyReport {
        rows: agg.rows.clone(),
        total: grand_total(&agg.rows),
    }
}

/// Lay a survey report out as a renderable table. The CSAT column is
/// visible and percent-formatted; there is no hidden helper column.
///
/// A report with no surviving groups gets no total row either: a
/// synthesized 0% over zero observations would be exactly the misleading
/// figure the degenerate-group policy exists to keep off the sheet.
pub fn survey_table(report: &SurveyReport) -> ReportTable {
    let headers = vec![
        "Agent Name".to_string(),
        "Good".to_string(),
        "Bad".to_string(),
        "Surveys".to_string(),
        "CSAT".to_string(),
    ];
    let total = (!report.rows.is_empty()).then_some(&report.total);
    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(report.rows.len() + 1);
    for agg in report.rows.iter().chain(total) {
        rows.push(vec![
            Cell::Text(agg.group_key.clone()),
            Cell::Int(agg.positive as i64),
            Cell::Int(agg.negative as i64),
            Cell::Int(agg.eligible() as i64),
            Cell::Percent(agg.ratio().unwrap_or(0.0)),
        ]);
    }
    ReportTable {
        headers,
        rows,
        has_total_row: total.is_some(),
    }
}

/// Pivot tickets into an owner x team count matrix.
///
/// Teams become columns in first-appearance order; cells are zero-filled
/// where an owner has no tickets for a team. Rows are sorted by row total
/// descending, ties by owner ascending.
pub fn pivot_by_owner_team(tickets: &[TicketRecord]) -> PivotTable {
    let mut teams: Vec<String> = Vec::new();
    for t in tickets {
        if !teams.contains(&t.team) {
            teams.push(t.team.clone());
        }
    }
    let team_index: HashMap<&str, usize> = teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let mut by_owner: HashMap<&str, Vec<u64>> = HashMap::new();
    for t in tickets {
        let counts = by_owner
            .entry(&t.owner)
            .or_insert_with(|| vec![0; teams.len()]);
        counts[team_index[t.team.as_str()]] += 1;
    }

    let mut rows: Vec<PivotRow> = by_owner
        .into_iter()
        .map(|(owner, counts)| PivotRow {
            owner: owner.to_string(),
            counts,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.row_total()
            .cmp(&a.row_total())
            .then_with(|| a.owner.cmp(&b.owner))
    });
    PivotTable { teams, rows }
}

/// Margin row for the pivot: per-team column sums. Its row total doubles
/// as the grand-total cell.
pub fn pivot_margin(pivot: &PivotTable) -> PivotRow {
    let mut counts = vec![0u64; pivot.teams.len()];
    for row in &pivot.rows {
        for (i, c) in row.counts.iter().enumerate() {
            counts[i] += c;
        }
    }
    PivotRow {
        owner: TOTAL_LABEL.to_string(),
        counts,
    }
}

/// Lay the pivot out as a renderable table with a trailing row-total
/// column and the margin row pinned last.
pub fn pivot_view(pivot: &PivotTable) -> ReportTable {
    let mut headers = vec!["Ticket Owner".to_string()];
    headers.extend(pivot.teams.iter().cloned());
    headers.push(TOTAL_LABEL.to_string());

    let margin = pivot_margin(pivot);
    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(pivot.rows.len() + 1);
    for row in pivot.rows.iter().chain(std::iter::once(&margin)) {
        let mut cells = vec![Cell::Text(row.owner.clone())];
        cells.extend(row.counts.iter().map(|c| Cell::Int(*c as i64)));
        cells.push(Cell::Int(row.row_total() as i64));
        rows.push(cells);
    }
    ReportTable {
        headers,
        rows,
        has_total_row: true,
    }
}

/// Raw view of the filtered ticket rows for the `Filtered Data` sheet.
pub fn ticket_rows_table(tickets: &[TicketRecord]) -> ReportTable {
    let headers = vec![
        "Ticket Id".to_string(),
        "Ticket Owner".to_string(),
        "Team".to_string(),
        "Ticket Closed Time".to_string(),
    ];
    let rows = tickets
        .iter()
        .map(|t| {
            vec![
                Cell::Text(t.ticket_id.clone()),
                Cell::Text(t.owner.clone()),
                Cell::Text(t.team.clone()),
                Cell::Text(format!(
                    "{} {}",
                    t.closed.format("%d %b %Y"),
                    fmt_clock(t.closed.time())
                )),
            ]
        })
        .collect();
    ReportTable {
        headers,
        rows,
        has_total_row: false,
    }
}
