//! Plain-text rendering of chart view models.

use chart_core::{
    Bmi, ChartVital, Notification, NotificationKind, OverviewBody, OverviewView, TableView,
    VitalsChart, VitalsViewMode,
};

/// Render an overview panel as text.
pub fn overview(view: &OverviewView) -> String {
    let mut out = format!("{}\n", view.heading);
    match &view.body {
        OverviewBody::Loading => out.push_str("Loading...\n"),
        OverviewBody::Error(panel) => {
            out.push_str(&format!("{}\n{}\n", panel.headline, panel.guidance));
        }
        OverviewBody::Empty(empty) => {
            out.push_str(&format!("{}\n[{}]\n", empty.message, empty.action_label));
        }
        OverviewBody::Table(table) => {
            out.push_str(&format!("[{}]\n", table.add_label));
            out.push_str(&self::table(table));
        }
    }
    out
}

fn table(table: &TableView) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(&table.headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(&rule));
    for row in &table.rows {
        out.push_str(&line(row));
    }
    out.push_str(&format!(
        "{}  (page {} of {})\n",
        table.summary,
        table.page_index + 1,
        table.page_count
    ));
    out
}

/// Render the vitals panel in `mode`. The view toggle only appears once there are readings.
pub fn vitals(view: &OverviewView, mode: VitalsViewMode, chart: Option<&VitalsChart>) -> String {
    let OverviewBody::Table(_) = &view.body else {
        return overview(view);
    };
    let body = match (mode, chart) {
        (VitalsViewMode::Chart, Some(chart)) => vitals_chart(chart),
        _ => {
            let text = overview(view);
            text.split_once('\n').map_or(String::new(), |(_, rest)| rest.to_string())
        }
    };
    let toggle = options(&VitalsViewMode::ALL, mode, VitalsViewMode::label);
    format!("{}\n{toggle}\n{body}", view.heading)
}

/// Radio-style choice list, e.g. `(*) Table view  ( ) Chart view`.
fn options<T>(all: &[T], selected: T, label: impl Fn(T) -> &'static str) -> String
where
    T: Copy + PartialEq,
{
    all.iter()
        .map(|&option| {
            let mark = if option == selected { '*' } else { ' ' };
            format!("({mark}) {}", label(option))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn vitals_chart(chart: &VitalsChart) -> String {
    let mut out = format!("{}\n", options(&ChartVital::ALL, chart.vital, ChartVital::title));
    out.push_str(&format!("{}\n", chart.title));
    for series in &chart.series {
        out.push_str(&format!("{}\n", series.field.title()));
        for point in &series.points {
            out.push_str(&format!("  {}  {}\n", point.date.format("%d %b %Y"), point.value));
        }
    }
    out
}

/// Render a BMI value with its unit, flagging abnormal values.
pub fn bmi(bmi: &Bmi, unit: &str) -> String {
    match bmi.css_class() {
        Some(class) => format!("BMI: {} {unit} [{class}: {:?}]", bmi.display, bmi.interpretation),
        None => format!("BMI: {} {unit}", bmi.display),
    }
}

pub fn notification(notification: &Notification) -> String {
    let marker = match notification.kind {
        NotificationKind::Success => "OK",
        NotificationKind::Error => "ERROR",
    };
    format!(
        "[{marker}] {}: {}",
        notification.title, notification.description
    )
}
