//! Tabular rendering of summary rows.

use crate::stats::SummaryRow;

/// Column order of the summary table.
pub const FIELDS: [&str; 13] = [
    "input",
    "kind",
    "n",
    "min_u",
    "max_u",
    "span_u",
    "mean_abs_r",
    "max_abs_r",
    "var_r",
    "min_sigma",
    "max_sigma",
    "has_nan",
    "monotonic_u",
];

/// Shortest round-trip rendering of a float that always shows it is one:
/// `1.0`, `0.25`, `1e-07`, `nan`, `inf`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{x:e}");
    let exponent = sci
        .split_once('e')
        .and_then(|(_, e)| e.parse::<i32>().ok())
        .unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let plain = x.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let mantissa = sci.split_once('e').map_or(sci.as_str(), |(m, _)| m);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

impl SummaryRow {
    /// Cell values in [`FIELDS`] order.
    pub fn values(&self) -> Vec<String> {
        let s = &self.stats;
        vec![
            self.input.clone(),
            self.kind.clone(),
            s.n.to_string(),
            format_float(s.min_u),
            format_float(s.max_u),
            format_float(s.span_u),
            format_float(s.mean_abs_r),
            format_float(s.max_abs_r),
            format_float(s.var_r),
            format_float(s.min_sigma),
            format_float(s.max_sigma),
            s.has_nan.to_string(),
            s.monotonic_u.to_string(),
        ]
    }
}

fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV text with a header row; one line per row, newline-terminated.
pub fn render_csv(rows: &[SummaryRow]) -> String {
    let mut out = FIELDS.join(",");
    out.push('\n');
    for row in rows {
        let cells: Vec<String> = row.values().iter().map(|v| csv_cell(v)).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Pipe-delimited table: header, `---` separator, one line per row.
pub fn render_markdown(rows: &[SummaryRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!("|{}|", FIELDS.join("|")));
    lines.push(format!("|{}|", vec!["---"; FIELDS.len()].join("|")));
    for row in rows {
        lines.push(format!("|{}|", row.values().join("|")));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::DatasetStats;
    use crate::table::Columns;

    fn row() -> SummaryRow {
        SummaryRow {
            input: "data/a.csv".into(),
            kind: "residuals".into(),
            stats: DatasetStats::compute(&Columns {
                u: vec![1.0, 2.0, 3.0],
                residual: vec![0.1, -0.2, 0.05],
                sigma: vec![1.0, 1.0, 1.0],
            }),
        }
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.2), "0.2");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(2.5e-3), "0.0025");
        assert_eq!(format_float(1e-7), "1e-07");
        assert_eq!(format_float(1.5e20), "1.5e+20");
        assert_eq!(format_float(1e15), "1000000000000000.0");
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_csv_header_and_row() {
        let csv = render_csv(&[row()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], FIELDS.join(","));
        assert!(lines[1].starts_with("data/a.csv,residuals,3,1.0,3.0,2.0,"));
        assert!(lines[1].ends_with(",1.0,1.0,false,true"));
    }

    #[test]
    fn test_csv_empty_has_header_only() {
        assert_eq!(render_csv(&[]), format!("{}\n", FIELDS.join(",")));
    }

    #[test]
    fn test_csv_quotes_awkward_cells() {
        let mut r = row();
        r.kind = "a, \"b\"".into();
        let csv = render_csv(&[r]);
        assert!(csv.contains(",\"a, \"\"b\"\"\",3,"));
    }

    #[test]
    fn test_markdown_shape() {
        let md = render_markdown(&[row()]);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("|input|kind|n|"));
        assert_eq!(lines[1].matches("---").count(), FIELDS.len());
        assert!(lines[2].starts_with("|data/a.csv|residuals|3|"));
        assert!(lines[2].ends_with("|false|true|"));
    }
}
