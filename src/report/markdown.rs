use std::fmt::Write;

use super::chart::{DAMAGE_CHART_FILE, HARM_CHART_FILE};
use super::Report;
use crate::pipeline::processing::aggregate::CategoryTotals;

/// Dollar amount with a K/M/B suffix, e.g. `$1.50B`.
pub fn format_usd(amount: f64) -> String {
    let (scaled, suffix) = if amount >= 1e9 {
        (amount / 1e9, "B")
    } else if amount >= 1e6 {
        (amount / 1e6, "M")
    } else if amount >= 1e3 {
        (amount / 1e3, "K")
    } else {
        (amount, "")
    };
    format!("${:.2}{}", scaled, suffix)
}

/// Render the report as Markdown: findings, two ranked tables each linking its
/// chart file, then data-quality notes and provenance.
pub fn render(report: &Report) -> String {
    let mut out = String::new();
    let p = &report.provenance;

    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "# Storm events: population health and economic impact, {}-{}\n",
        p.start_year, p.end_year
    );

    out.push_str("## Findings\n\n");
    for line in &report.findings {
        let _ = writeln!(out, "- {}", line);
    }
    out.push('\n');

    let _ = writeln!(out, "## Most harmful to population health\n");
    if report.harm.is_empty() {
        out.push_str("No matched events in the window.\n\n");
    } else {
        out.push_str(&harm_table(&report.harm));
        out.push('\n');
        let _ = writeln!(out, "![Fatalities by event type]({})\n", HARM_CHART_FILE);
    }

    let _ = writeln!(
        out,
        "## Greatest economic consequences (total damage above {})\n",
        format_usd(report.damage_floor)
    );
    if report.damage.is_empty() {
        out.push_str("No category exceeds the damage floor.\n\n");
    } else {
        out.push_str(&damage_table(&report.damage));
        out.push('\n');
        let _ = writeln!(out, "![Total damage by event type]({})\n", DAMAGE_CHART_FILE);
    }

    let n = &report.normalization;
    let r = &report.records;
    out.push_str("## Data quality\n\n");
    let _ = writeln!(
        out,
        "- Rows loaded: {}; kept: {}; outside window: {}; summary rows: {}",
        r.loaded, r.kept, r.out_of_window, r.summary_rows
    );
    let _ = writeln!(
        out,
        "- Categories matched: {} exact, {} approximate, {} unmatched ({:.2}%)",
        n.exact,
        n.fuzzy,
        n.unmatched,
        n.unmatched_rate() * 100.0
    );
    let _ = writeln!(out, "- Distinct raw categories: {}", n.distinct_raw);
    if !n.top_unmatched.is_empty() {
        let listed: Vec<String> = n
            .top_unmatched
            .iter()
            .map(|(label, count)| format!("`{}` ({})", label, count))
            .collect();
        let _ = writeln!(out, "- Most frequent unmatched: {}", listed.join(", "));
    }
    out.push('\n');

    out.push_str("## Provenance\n\n");
    let _ = writeln!(out, "- Run: `{}`", p.run_id);
    let _ = writeln!(out, "- Generated: {}", p.generated_at.to_rfc3339());
    let _ = writeln!(out, "- Source: <{}>", p.source_url);
    if let Some(sha) = &p.source_sha256 {
        let _ = writeln!(out, "- Source SHA-256: `{}`", sha);
    }

    out
}

fn harm_table(rows: &[CategoryTotals]) -> String {
    let mut out = String::from(
        "| Rank | Event type | Fatalities | Injuries | Events |\n|---:|---|---:|---:|---:|\n",
    );
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            i + 1,
            row.category,
            row.fatalities,
            row.injuries,
            row.event_count
        );
    }
    out
}

fn damage_table(rows: &[CategoryTotals]) -> String {
    let mut out = String::from(
        "| Rank | Event type | Property | Crop | Total |\n|---:|---|---:|---:|---:|\n",
    );
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            i + 1,
            row.category,
            format_usd(row.property_damage),
            format_usd(row.crop_damage),
            format_usd(row.total_damage)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1_500_000_000.0), "$1.50B");
        assert_eq!(format_usd(3_000_000.0), "$3.00M");
        assert_eq!(format_usd(2_500.0), "$2.50K");
        assert_eq!(format_usd(7.0), "$7.00");
    }

    #[test]
    fn test_tables_list_rows_in_order() {
        let rows = vec![
            CategoryTotals {
                category: "TORNADO".to_string(),
                event_count: 4,
                fatalities: 20,
                injuries: 300,
                property_damage: 2e9,
                crop_damage: 1e6,
                total_damage: 2.001e9,
            },
            CategoryTotals {
                category: "HEAT".to_string(),
                event_count: 2,
                fatalities: 10,
                injuries: 5,
                ..Default::default()
            },
        ];
        let harm = harm_table(&rows);
        let lines: Vec<&str> = harm.lines().collect();
        assert_eq!(lines[2], "| 1 | TORNADO | 20 | 300 | 4 |");
        assert_eq!(lines[3], "| 2 | HEAT | 10 | 5 | 2 |");

        let damage = damage_table(&rows[..1]);
        assert!(damage.contains("| 1 | TORNADO | $2.00B | $1.00M | $2.00B |"));
    }
}
