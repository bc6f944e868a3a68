//! Plain-text rendering of a [`DashboardReport`] for the terminal.

use std::fmt::{self, Display, Formatter};

use crate::aggregate::AggregationResult;
use crate::dashboard::{DashboardReport, View};
use crate::rank::Share;

/// `1234567.4` → `"1,234,567"`.
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

fn format_share(share: &Share) -> String {
    match share {
        Share::Percent(p) => format!("{:.1}%", p),
        Share::NotApplicable => "n/a".to_string(),
    }
}

fn metric<T>(view: &View<T>, show: impl Fn(&T) -> String) -> String {
    match view.data() {
        Some(data) => show(data),
        None => "n/a".to_string(),
    }
}

/// Text layout of a report, one section per dashboard view.
pub struct TextReport<'a>(pub &'a DashboardReport);

impl TextReport<'_> {
    fn heading(f: &mut Formatter<'_>, title: &str) -> fmt::Result {
        writeln!(f, "\n{}\n{}", title, "-".repeat(title.chars().count()))
    }

    /// Writes the section body when the view is ready, the reason otherwise.
    fn section<T>(
        f: &mut Formatter<'_>,
        view: &View<T>,
        body: impl FnOnce(&mut Formatter<'_>, &T) -> fmt::Result,
    ) -> fmt::Result {
        match view {
            View::Ready { data } => body(f, data),
            View::Unavailable { reason } => writeln!(f, "  unavailable: {}", reason),
        }
    }

    fn totals(f: &mut Formatter<'_>, totals: &AggregationResult<String>) -> fmt::Result {
        if totals.is_empty() {
            return writeln!(f, "  (no rows)");
        }
        let width = totals.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        for entry in totals {
            writeln!(
                f,
                "  {:<width$}  {:>12}",
                entry.key,
                format_count(entry.sum),
                width = width
            )?;
        }
        Ok(())
    }

    fn metrics(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let m = &report.metrics;
        Self::heading(f, "Headline metrics")?;
        writeln!(f, "  Rows in view:             {}", report.rows)?;
        writeln!(
            f,
            "  Total interventions:      {}",
            metric(&m.total_beneficiaries, |v| format_count(*v))
        )?;
        writeln!(
            f,
            "  Highest demand district:  {}",
            metric(&m.top_district, |e| format!(
                "{} ({} reqs)",
                e.key,
                format_count(e.sum)
            ))
        )?;
        writeln!(
            f,
            "  Blocks:                   {}",
            metric(&m.active_blocks, |n| n.to_string())
        )?;
        writeln!(
            f,
            "  Support categories:       {}",
            metric(&m.support_categories, |n| n.to_string())
        )
    }
}

impl Display for TextReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;
        self.metrics(f)?;

        Self::heading(f, "Specific support type demand")?;
        Self::section(f, &report.support_type_top, Self::totals)?;

        Self::heading(f, "Broad category share")?;
        Self::section(f, &report.broad_category_share, |f, entries| {
            if entries.is_empty() {
                return writeln!(f, "  (no rows)");
            }
            for entry in entries {
                writeln!(
                    f,
                    "  {}: {} ({})",
                    entry.key,
                    format_count(entry.sum),
                    format_share(&entry.share)
                )?;
            }
            Ok(())
        })?;

        Self::heading(f, "District-wise demand")?;
        Self::section(f, &report.district_demand, Self::totals)?;

        Self::heading(f, "Category of support")?;
        Self::section(f, &report.category_breakdown, |f, breakdown| {
            writeln!(f, "  (column: {})", breakdown.column)?;
            Self::totals(f, &breakdown.totals)
        })?;

        Self::heading(f, "District × broad category")?;
        Self::section(f, &report.district_category_pivot, |f, matrix| {
            if matrix.is_empty() {
                return writeln!(f, "  (no rows)");
            }
            writeln!(f, "  {}", matrix.column_keys().join(" | "))?;
            for (key, row) in matrix.row_keys().iter().zip(matrix.cells()) {
                let cells: Vec<String> = row.iter().map(|v| format_count(*v)).collect();
                writeln!(f, "  {}: {}", key, cells.join(" | "))?;
            }
            Ok(())
        })?;

        Self::heading(f, "Input category → pillar flow")?;
        Self::section(f, &report.pillar_flow, |f, graph| {
            if graph.is_empty() {
                return writeln!(f, "  (no rows)");
            }
            for edge in graph.edges() {
                writeln!(
                    f,
                    "  {} → {}: {}",
                    graph.nodes()[edge.source].label,
                    graph.nodes()[edge.target].label,
                    format_count(edge.weight)
                )?;
            }
            Ok(())
        })
    }
}

pub fn render_text(report: &DashboardReport) -> String {
    TextReport(report).to_string()
}
