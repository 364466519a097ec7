// Record ingestion: CSV in, typed records out.
//
// Header names are trimmed and matched case-insensitively against the
// expected schema, then each row is deserialized against the canonicalized
// header record. Rows that fail coercion are dropped and counted; an
// outcome value outside the known domain aborts the run.
use crate::error::{ReportError, Result};
use crate::types::{CoercionSpec, Outcome, OutcomeRecord, RawSurveyRow, RawTicketRow, TicketRecord};
use crate::util::{parse_i64_safe, parse_ticket_time};
use chrono::{Datelike, Timelike};
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::{Path, PathBuf};

/// Leading non-data lines in the ticket export before the header row.
const TICKET_SKIP_ROWS: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub total_rows: usize,
    pub skipped_rows: usize,
}

/// Canonicalize a raw header row: trim each name and, where it matches one
/// of `expected` ignoring case, substitute the canonical spelling.
fn canonical_headers(raw: &StringRecord, expected: &[&str]) -> StringRecord {
    let mut out = StringRecord::new();
    for field in raw.iter() {
        let trimmed = field.trim();
        match expected.iter().copied().find(|e| e.eq_ignore_ascii_case(trimmed)) {
            Some(canon) => out.push_field(canon),
            None => out.push_field(trimmed),
        }
    }
    out
}

fn require_field(headers: &StringRecord, name: &str) -> Result<()> {
    if headers.iter().any(|h| h == name) {
        Ok(())
    } else {
        Err(ReportError::MissingField(name.to_string()))
    }
}

/// Load a survey export and coerce it into outcome records.
///
/// The `spec` names the outcome and group columns, the exclusion token and
/// the outcome mapping; the input file is never mutated.
pub fn load_survey(path: &Path, spec: &CoercionSpec) -> Result<(Vec<OutcomeRecord>, IngestStats)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let expected = [spec.group_field, spec.outcome_field, "Customer Phone Number"];
    let headers = canonical_headers(rdr.headers()?, &expected);
    require_field(&headers, spec.group_field)?;
    require_field(&headers, spec.outcome_field)?;

    let mut stats = IngestStats::default();
    let mut records = Vec::new();
    for result in rdr.records() {
        stats.total_rows += 1;
        let row: RawSurveyRow = match result?.deserialize(Some(&headers)) {
            Ok(r) => r,
            Err(_) => {
                stats.skipped_rows += 1;
                continue;
            }
        };

        let agent = match row.agent.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => a.to_string(),
            _ => {
                stats.skipped_rows += 1;
                continue;
            }
        };

        // Observations are counted by phone number; a row without one is
        // not an observation.
        if row.phone.as_deref().map(str::trim).unwrap_or("").is_empty() {
            stats.skipped_rows += 1;
            continue;
        }

        // The exclusion token stands in for "no outcome"; it coerces to the
        // zero sentinel before the numeric mapping.
        let answer = match row.answer.as_deref().map(str::trim) {
            Some(a) if a == spec.exclusion_token => Some("0"),
            other => other,
        };
        let value = match parse_i64_safe(answer) {
            Some(v) => v,
            None => {
                stats.skipped_rows += 1;
                continue;
            }
        };
        let outcome = match spec.outcome_map.get(&value) {
            Some(o) => *o,
            None => {
                let known = spec
                    .outcome_map
                    .keys()
                    .map(|k| k.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ReportError::OutcomeDomain(value, known));
            }
        };

        records.push(OutcomeRecord {
            group_key: agent,
            outcome,
        });
    }
    Ok((records, stats))
}

/// Load a ticket export, skipping the fixed preamble before the header.
pub fn load_tickets(path: &Path) -> Result<(Vec<TicketRecord>, IngestStats)> {
    let raw = fs::read_to_string(path)?;
    let body: String = raw
        .lines()
        .skip(TICKET_SKIP_ROWS)
        .collect::<Vec<_>>()
        .join("\n");

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());
    let expected = ["Ticket Id", "Ticket Owner", "Team", "Ticket Closed Time"];
    let headers = canonical_headers(rdr.headers()?, &expected);
    for name in expected {
        require_field(&headers, name)?;
    }

    let mut stats = IngestStats::default();
    let mut records = Vec::new();
    for result in rdr.records() {
        stats.total_rows += 1;
        let row: RawTicketRow = match result?.deserialize(Some(&headers)) {
            Ok(r) => r,
            Err(_) => {
                stats.skipped_rows += 1;
                continue;
            }
        };
        let closed = match parse_ticket_time(row.closed_time.as_deref()) {
            Some(t) => t,
            None => {
                stats.skipped_rows += 1;
                continue;
            }
        };
        let (Some(ticket_id), Some(owner), Some(team)) = (row.ticket_id, row.owner, row.team)
        else {
            stats.skipped_rows += 1;
            continue;
        };
        records.push(TicketRecord {
            ticket_id: ticket_id.trim().to_string(),
            owner: owner.trim().to_string(),
            team: team.trim().to_string(),
            closed,
        });
    }
    Ok((records, stats))
}

pub fn filter_by_hour(tickets: &[TicketRecord], hour: u32) -> Vec<TicketRecord> {
    tickets
        .iter()
        .filter(|t| t.closed.hour() == hour)
        .cloned()
        .collect()
}

pub fn filter_by_day(tickets: &[TicketRecord], day: u32) -> Vec<TicketRecord> {
    tickets
        .iter()
        .filter(|t| t.closed.day() == day)
        .cloned()
        .collect()
}

/// Find the single `.csv` input whose file name starts with `prefix`.
///
/// Zero or multiple candidates is an error: silently picking an arbitrary
/// file would make the report depend on directory listing order.
pub fn discover_input(dir: &Path, prefix: &str) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().map(|e| e == "csv").unwrap_or(false)
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(prefix))
                    .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    if candidates.len() == 1 {
        Ok(candidates.remove(0))
    } else {
        Err(ReportError::Discovery {
            prefix: prefix.to_string(),
            found: candidates.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ops_report_test_{}", name));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.csv", name));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn survey_headers_are_trimmed_and_case_insensitive() {
        let path = write_temp(
            "survey_headers",
            " agent name , ANSWER ,Customer Phone Number\nAlaa,1,123\nBadr,2,456\n",
        );
        let (records, stats) = load_survey(&path, &CoercionSpec::default()).unwrap();
        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.skipped_rows, 0);
        assert_eq!(records[0].group_key, "Alaa");
        assert_eq!(records[0].outcome, Outcome::Positive);
        assert_eq!(records[1].outcome, Outcome::Negative);
    }

    #[test]
    fn exclusion_token_maps_to_excluded() {
        let path = write_temp(
            "survey_excluded",
            "Agent Name,Answer,Customer Phone Number\nAlaa,No_Answer,123\n",
        );
        let (records, stats) = load_survey(&path, &CoercionSpec::default()).unwrap();
        assert_eq!(stats.skipped_rows, 0);
        assert_eq!(records[0].outcome, Outcome::Excluded);
    }

    #[test]
    fn unparseable_outcome_is_skipped_not_fatal() {
        let path = write_temp(
            "survey_skip",
            "Agent Name,Answer,Customer Phone Number\nAlaa,maybe,123\nBadr,1,456\n",
        );
        let (records, stats) = load_survey(&path, &CoercionSpec::default()).unwrap();
        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.skipped_rows, 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn out_of_domain_outcome_is_fatal() {
        let path = write_temp(
            "survey_domain",
            "Agent Name,Answer,Customer Phone Number\nAlaa,7,123\n",
        );
        let err = load_survey(&path, &CoercionSpec::default()).unwrap_err();
        assert!(matches!(err, ReportError::OutcomeDomain(7, _)));
    }

    #[test]
    fn missing_outcome_column_is_fatal() {
        let path = write_temp(
            "survey_missing",
            "Agent Name,Customer Phone Number\nAlaa,123\n",
        );
        let err = load_survey(&path, &CoercionSpec::default()).unwrap_err();
        assert!(matches!(err, ReportError::MissingField(_)));
    }

    #[test]
    fn ticket_preamble_is_skipped() {
        let path = write_temp(
            "tickets",
            "export,,,\ngenerated,,,\nby,,,\nsomeone,,,\nTicket Id,Ticket Owner,Team,Ticket Closed Time\nT-1,Alaa,L2,03 Jan 2024 11:42 AM\nT-2,Badr,L1,03 Jan 2024 01:05 PM\n",
        );
        let (records, stats) = load_tickets(&path).unwrap();
        assert_eq!(stats.total_rows, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].owner, "Alaa");
        assert_eq!(filter_by_hour(&records, 11).len(), 1);
        assert_eq!(filter_by_hour(&records, 13).len(), 1);
        assert_eq!(filter_by_day(&records, 3).len(), 2);
    }

    #[test]
    fn discovery_requires_exactly_one_candidate() {
        let dir = std::env::temp_dir().join("ops_report_test_discovery");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        assert!(matches!(
            discover_input(&dir, "IVR"),
            Err(ReportError::Discovery { found: 0, .. })
        ));
        fs::write(dir.join("IVR one.csv"), "a,b\n").unwrap();
        assert!(discover_input(&dir, "IVR").is_ok());
        fs::write(dir.join("IVR two.csv"), "a,b\n").unwrap();
        assert!(matches!(
            discover_input(&dir, "IVR"),
            Err(ReportError::Discovery { found: 2, .. })
        ));
    }
}
