// Entry point and high-level CLI flow.
//
// The menu shell is thin glue: it discovers the input file, reads the few
// parameters a report needs, and hands everything to the core pipeline
// (ingest -> aggregate -> render). The run timestamp used in artifact
// names is computed once here and threaded down.
mod aggregate;
mod error;
mod ingest;
mod render;
mod schedule;
mod types;
mod util;

use chrono::Local;
use error::Result;
use render::{ColorScale, ColorStop, RenderSpec};
use std::io::{self, Write};
use std::path::Path;
use types::CoercionSpec;
use util::format_int;

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the report selection menu after generating a
/// report. Returns `true` for `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Red-to-green scale over the full 0..100% satisfaction range.
fn satisfaction_scale() -> ColorScale {
    ColorScale::three_stop(
        ColorStop {
            value: 0.0,
            color: render::SCALE_LOW,
        },
        ColorStop {
            value: 0.5,
            color: render::SCALE_MID,
        },
        ColorStop {
            value: 1.0,
            color: render::SCALE_HIGH,
        },
    )
}

/// Survey report: discover the IVR export, aggregate per agent, write the
/// formatted single-sheet artifact.
fn run_csat(stamp: &str) -> Result<()> {
    let input = ingest::discover_input(Path::new("."), "IVR")?;
    let (records, stats) = ingest::load_survey(&input, &CoercionSpec::default())?;
    println!(
        "Processing {}... ({} rows, {} skipped)",
        input.display(),
        format_int(stats.total_rows as i64),
        format_int(stats.skipped_rows as i64)
    );

    let agg = aggregate::aggregate_survey(&records);
    if agg.excluded > 0 || agg.dropped_groups > 0 {
        println!(
            "Note: {} unanswered surveys excluded, {} agents without any answered survey omitted.",
            format_int(agg.excluded as i64),
            format_int(agg.dropped_groups as i64)
        );
    }
    let table = aggregate::survey_table(&aggregate::survey_report(&agg));
    render::preview_table(&table, 10);

    let mut spec = RenderSpec::plain("Pivot Table");
    spec.metric_column = Some("CSAT".to_string());
    spec.scale = Some(satisfaction_scale());
    let out = format!("CSAT {}.xlsx", stamp);
    render::save_report(vec![(table, spec)], Path::new(&out))?;
    println!("Done! The output file has been saved as: {}\n", out);
    Ok(())
}

enum ProductivityWindow {
    Hour(u32),
    Day(u32),
}

/// Sheet layout for the productivity artifact: the filtered raw rows are
/// sheet 1, the formatted pivot follows.
fn productivity_sheets(
    raw: types::ReportTable,
    pivot: types::ReportTable,
) -> Vec<(types::ReportTable, RenderSpec)> {
    let mut pivot_spec = RenderSpec::plain("Pivot Table");
    pivot_spec.borders = true;
    vec![
        (raw, RenderSpec::plain("Filtered Data")),
        (pivot, pivot_spec),
    ]
}

/// Productivity report: discover the ticket export, filter to the chosen
/// window, pivot owner x team, write pivot + filtered rows.
fn run_productivity(stamp: &str, window: ProductivityWindow) -> Result<()> {
    let input = ingest::discover_input(Path::new("."), "L2")?;
    let (tickets, stats) = ingest::load_tickets(&input)?;
    println!(
        "Processing {}... ({} rows, {} skipped)",
        input.display(),
        format_int(stats.total_rows as i64),
        format_int(stats.skipped_rows as i64)
    );

    let (filtered, label) = match window {
        ProductivityWindow::Hour(h) => (ingest::filter_by_hour(&tickets, h), format!("hour {}", h)),
        ProductivityWindow::Day(d) => (ingest::filter_by_day(&tickets, d), format!("day {}", d)),
    };
    println!(
        "{} tickets closed in the selected window.",
        format_int(filtered.len() as i64)
    );

    let pivot = aggregate::pivot_by_owner_team(&filtered);
    let pivot_table = aggregate::pivot_view(&pivot);
    render::preview_table(&pivot_table, 10);

    let raw_table = aggregate::ticket_rows_table(&filtered);
    let out = format!("Productivity {} {}.xlsx", label, stamp);
    render::save_report(productivity_sheets(raw_table, pivot_table), Path::new(&out))?;
    println!("Done! The output file has been saved as: {}\n", out);
    Ok(())
}

/// Break schedule: roster and parameters from the prompt, one sheet out.
fn run_breaks(stamp: &str) -> Result<()> {
    let shift_choice = read_line("Enter the shift start time: ");
    let start = schedule::shift_start(&shift_choice)?;
    let agents: Vec<String> = read_line("Enter the names of agents, space-separated: ")
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let schema =
        schedule::BreakSchema::parse(&read_line("Enter the break schema \n\t1 = (15-30-15) \n\t2 = (30-30)\n=> "))?;

    let entries = schedule::build_schedule(&agents, start, schema);
    let table = schedule::schedule_table(&entries, schema);
    render::preview_table(&table, 20);

    let mut spec = RenderSpec::plain("Breaks");
    spec.highlight_fill = render::SCHEDULE_FILL;
    spec.borders = true;
    let out = format!("Breaks shift {} {}.xlsx", shift_choice, stamp);
    render::save_report(vec![(table, spec)], Path::new(&out))?;
    println!("Break schedule saved to {}\n", out);
    Ok(())
}

fn main() {
    // Minute-resolution stamp, computed once so every artifact of this run
    // shares it.
    let stamp = Local::now().format("%d_%H_%M").to_string();

    loop {
        println!("===========[[ Operations Reporting ]]===========");
        println!("1) Productivity for an hour");
        println!("2) Productivity for a day");
        println!("3) C-SAT over day");
        println!("4) Generate break schedule");
        println!("5) Exit\n");
        let result = match read_line("Enter choice: ").as_str() {
            "1" => {
                let hour = read_line("Enter the hour you want to filter by (0-23): ");
                match hour.parse::<u32>() {
                    Ok(h) if h < 24 => run_productivity(&stamp, ProductivityWindow::Hour(h)),
                    _ => {
                        println!("Invalid hour.\n");
                        continue;
                    }
                }
            }
            "2" => {
                let day = read_line("Enter the day you want to filter by (1-31): ");
                match day.parse::<u32>() {
                    Ok(d) if (1..=31).contains(&d) => {
                        run_productivity(&stamp, ProductivityWindow::Day(d))
                    }
                    _ => {
                        println!("Invalid day.\n");
                        continue;
                    }
                }
            }
            "3" => run_csat(&stamp),
            "4" => run_breaks(&stamp),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter a number from 1 to 5.\n");
                continue;
            }
        };

        if let Err(e) = result {
            eprintln!("Error: {}\n", e);
            continue;
        }
        if !prompt_back_to_menu() {
            println!("Exiting the program.");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportTable;

    #[test]
    fn productivity_artifact_puts_filtered_rows_on_sheet_one() {
        let raw = ReportTable {
            headers: vec!["Ticket Id".to_string()],
            rows: vec![],
            has_total_row: false,
        };
        let pivot = ReportTable {
            headers: vec!["Ticket Owner".to_string()],
            rows: vec![],
            has_total_row: true,
        };
        let sheets = productivity_sheets(raw, pivot);
        let names: Vec<&str> = sheets.iter().map(|(_, s)| s.sheet_name.as_str()).collect();
        assert_eq!(names, vec!["Filtered Data", "Pivot Table"]);
        assert!(sheets[1].1.borders);
    }
}
