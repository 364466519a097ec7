// Report rendering: styled XLSX artifacts and console previews.
//
// The renderer takes finished `ReportTable`s; it owns layout only. Header
// and total rows get a solid fill and bold text, data cells are centered,
// the designated metric column gets a value-driven background color, and
// column widths track the widest value per column.
use crate::error::{ReportError, Result};
use crate::types::{Cell, ReportTable};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Fixed width padding; the first (name) column gets the larger pad so
/// long names stay readable.
const COLUMN_PAD: usize = 2;
const NAME_COLUMN_PAD: usize = 10;

/// Classic red / yellow / green stops used for the satisfaction scale.
pub const SCALE_LOW: u32 = 0xF8696B;
pub const SCALE_MID: u32 = 0xFEDE81;
pub const SCALE_HIGH: u32 = 0x63BE7B;

pub const HEADER_FILL: u32 = 0x538DD5;
pub const SCHEDULE_FILL: u32 = 0x93C47D;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub value: f64,
    pub color: u32,
}

/// Continuous value-to-color interpolation over two or three stops.
/// Values outside the stop range clamp to the boundary colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    low: ColorStop,
    mid: Option<ColorStop>,
    high: ColorStop,
}

impl ColorScale {
    pub fn two_stop(low: ColorStop, high: ColorStop) -> Self {
        ColorScale {
            low,
            mid: None,
            high,
        }
    }

    pub fn three_stop(low: ColorStop, mid: ColorStop, high: ColorStop) -> Self {
        ColorScale {
            low,
            mid: Some(mid),
            high,
        }
    }

    /// Derive the stop values from observed data: literal min and max for
    /// the ends, the median for the midpoint. Returns `None` for an empty
    /// sample.
    pub fn observed(values: &[f64], colors: (u32, u32, u32)) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let mid = sorted[sorted.len() / 2];
        Some(ColorScale::three_stop(
            ColorStop {
                value: min,
                color: colors.0,
            },
            ColorStop {
                value: mid,
                color: colors.1,
            },
            ColorStop {
                value: max,
                color: colors.2,
            },
        ))
    }

    pub fn color_for(&self, value: f64) -> u32 {
        if value <= self.low.value {
            return self.low.color;
        }
        if value >= self.high.value {
            return self.high.color;
        }
        match self.mid {
            Some(mid) if value <= mid.value => lerp_color(self.low, mid, value),
            Some(mid) => lerp_color(mid, self.high, value),
            None => lerp_color(self.low, self.high, value),
        }
    }
}

/// Linear interpolation between two stops, per RGB channel.
fn lerp_color(a: ColorStop, b: ColorStop, value: f64) -> u32 {
    let span = b.value - a.value;
    if span <= f64::EPSILON {
        return b.color;
    }
    let t = (value - a.value) / span;
    let channel = |shift: u32| {
        let from = ((a.color >> shift) & 0xFF) as f64;
        let to = ((b.color >> shift) & 0xFF) as f64;
        ((from + (to - from) * t).round() as u32) & 0xFF
    };
    (channel(16) << 16) | (channel(8) << 8) | channel(0)
}

/// Per-sheet rendering spec. `metric_column` names the column the color
/// scale keys on; naming a column the table does not have is a fatal
/// configuration error.
#[derive(Debug, Clone)]
pub struct RenderSpec {
    pub sheet_name: String,
    pub metric_column: Option<String>,
    pub scale: Option<ColorScale>,
    pub highlight_fill: u32,
    pub borders: bool,
}

impl RenderSpec {
    pub fn plain(sheet_name: &str) -> Self {
        RenderSpec {
            sheet_name: sheet_name.to_string(),
            metric_column: None,
            scale: None,
            highlight_fill: HEADER_FILL,
            borders: false,
        }
    }
}

/// Maximum display width per column, plus padding.
pub(crate) fn column_widths(table: &ReportTable) -> Vec<usize> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.display_width());
            }
        }
    }
    for (i, w) in widths.iter_mut().enumerate() {
        *w += if i == 0 { NAME_COLUMN_PAD } else { COLUMN_PAD };
    }
    widths
}

fn base_format(spec: &RenderSpec) -> Format {
    let f = Format::new().set_align(FormatAlign::Center);
    if spec.borders {
        f.set_border(FormatBorder::Thin)
    } else {
        f
    }
}

/// Write one table onto a new worksheet of `workbook` per `spec`.
pub fn write_sheet(workbook: &mut Workbook, table: &ReportTable, spec: &RenderSpec) -> Result<()> {
    let metric_col = match &spec.metric_column {
        Some(name) => Some(
            table
                .column_index(name)
                .ok_or_else(|| ReportError::ColumnNotFound(name.clone()))?,
        ),
        None => None,
    };

    let header_format = base_format(spec)
        .set_bold()
        .set_background_color(spec.highlight_fill);
    let total_format = base_format(spec)
        .set_bold()
        .set_background_color(spec.highlight_fill);
    let total_percent_format = total_format.clone().set_num_format("0%");
    let data_format = base_format(spec);
    let percent_format = data_format.clone().set_num_format("0%");

    let sheet = workbook.add_worksheet();
    sheet.set_name(&spec.sheet_name)?;

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_with_format(0, col as u16, header.as_str(), &header_format)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let is_total = table.has_total_row && r + 1 == table.rows.len();
        for (c, cell) in row.iter().enumerate() {
            let xlsx_row = (r + 1) as u32;
            let xlsx_col = c as u16;
            // The color scale covers data rows only; the total row keeps
            // the highlight fill.
            let scale = if !is_total && Some(c) == metric_col {
                spec.scale.as_ref()
            } else {
                None
            };
            match cell {
                Cell::Text(s) => {
                    let f = if is_total { &total_format } else { &data_format };
                    sheet.write_with_format(xlsx_row, xlsx_col, s.as_str(), f)?;
                }
                Cell::Int(n) => match scale {
                    Some(scale) => {
                        let f = data_format
                            .clone()
                            .set_background_color(scale.color_for(*n as f64));
                        sheet.write_with_format(xlsx_row, xlsx_col, *n, &f)?;
                    }
                    None => {
                        let f = if is_total { &total_format } else { &data_format };
                        sheet.write_with_format(xlsx_row, xlsx_col, *n, f)?;
                    }
                },
                Cell::Percent(p) => {
                    let f = if is_total {
                        total_percent_format.clone()
                    } else {
                        percent_format.clone()
                    };
                    let f = match scale {
                        Some(scale) => f.set_background_color(scale.color_for(*p)),
                        None => f,
                    };
                    sheet.write_with_format(xlsx_row, xlsx_col, *p, &f)?;
                }
            }
        }
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        sheet.set_column_width(col as u16, width as f64)?;
    }
    Ok(())
}

/// Write a complete artifact: one worksheet per (table, spec) pair, in
/// order, saved to `path` in one shot so a failed run leaves no partial
/// artifact.
pub fn save_report(sheets: Vec<(ReportTable, RenderSpec)>, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    for (table, spec) in &sheets {
        write_sheet(&mut workbook, table, spec)?;
    }
    workbook.save(path)?;
    Ok(())
}

/// Markdown preview of the first `max_rows` data rows (the total row is
/// always shown when present).
pub fn preview_table(table: &ReportTable, max_rows: usize) {
    if table.rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(table.headers.clone());
    let shown: Vec<&Vec<Cell>> = if table.has_total_row && table.rows.len() > max_rows {
        table.rows[..max_rows.min(table.rows.len() - 1)]
            .iter()
            .chain(table.rows.last())
            .collect()
    } else {
        table.rows.iter().take(max_rows).collect()
    };
    for row in shown {
        builder.push_record(row.iter().map(|c| c.display_string()));
    }
    let rendered = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", rendered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, ReportTable};

    fn csat_scale() -> ColorScale {
        ColorScale::three_stop(
            ColorStop {
                value: 0.0,
                color: SCALE_LOW,
            },
            ColorStop {
                value: 0.5,
                color: SCALE_MID,
            },
            ColorStop {
                value: 1.0,
                color: SCALE_HIGH,
            },
        )
    }

    #[test]
    fn scale_boundaries_render_the_stop_colors() {
        let scale = csat_scale();
        assert_eq!(scale.color_for(0.0), SCALE_LOW);
        assert_eq!(scale.color_for(0.5), SCALE_MID);
        assert_eq!(scale.color_for(1.0), SCALE_HIGH);
    }

    #[test]
    fn out_of_range_values_clamp_to_boundary_colors() {
        let scale = csat_scale();
        assert_eq!(scale.color_for(-0.3), SCALE_LOW);
        assert_eq!(scale.color_for(1.7), SCALE_HIGH);
    }

    #[test]
    fn two_stop_interpolation_is_linear_per_channel() {
        let scale = ColorScale::two_stop(
            ColorStop {
                value: 0.0,
                color: 0xFF0000,
            },
            ColorStop {
                value: 1.0,
                color: 0x00FF00,
            },
        );
        // Halfway: red and green channels both at 0x80.
        assert_eq!(scale.color_for(0.5), 0x808000);
    }

    #[test]
    fn observed_scale_uses_min_median_max() {
        let scale =
            ColorScale::observed(&[0.2, 0.9, 0.4], (SCALE_LOW, SCALE_MID, SCALE_HIGH)).unwrap();
        assert_eq!(scale.color_for(0.2), SCALE_LOW);
        assert_eq!(scale.color_for(0.4), SCALE_MID);
        assert_eq!(scale.color_for(0.9), SCALE_HIGH);
        assert!(ColorScale::observed(&[], (0, 0, 0)).is_none());
    }

    fn sample_table() -> ReportTable {
        ReportTable {
            headers: vec!["Agent Name".to_string(), "CSAT".to_string()],
            rows: vec![
                vec![Cell::Text("Alaa".to_string()), Cell::Percent(1.0)],
                vec![Cell::Text("Grand Total".to_string()), Cell::Percent(1.0)],
            ],
            has_total_row: true,
        }
    }

    #[test]
    fn unknown_metric_column_is_a_configuration_error() {
        let table = sample_table();
        let mut spec = RenderSpec::plain("Pivot Table");
        spec.metric_column = Some("Nope".to_string());
        let mut workbook = Workbook::new();
        let err = write_sheet(&mut workbook, &table, &spec).unwrap_err();
        assert!(matches!(err, ReportError::ColumnNotFound(_)));
    }

    #[test]
    fn widths_track_longest_value_plus_padding() {
        let table = ReportTable {
            headers: vec!["Agent Name".to_string(), "Good".to_string()],
            rows: vec![vec![
                Cell::Text("A Very Long Agent Name".to_string()),
                Cell::Int(7),
            ]],
            has_total_row: false,
        };
        let widths = column_widths(&table);
        assert_eq!(widths[0], "A Very Long Agent Name".len() + 10);
        assert_eq!(widths[1], "Good".len() + 2);
    }
}
