//! Text rendering for weather series, project lists and report previews.

use obra_core::{DailyReport, HistoryReport, Project};

/// Bar length for the wettest day of the range.
const BAR_WIDTH: usize = 30;

pub fn history(report: &HistoryReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Weather history for {}, {}\n\n",
        report.city, report.country
    ));

    if report.days.is_empty() {
        out.push_str("No data returned for this range.\n");
        return out;
    }

    out.push_str("date          max °C   min °C  rain mm\n");
    for day in &report.days {
        out.push_str(&format!(
            "{}  {:>7.1}  {:>7.1}  {:>7.1}\n",
            day.date, day.max_temp_c, day.min_temp_c, day.precipitation_mm
        ));
    }

    out.push_str("\nPrecipitation (mm)\n");
    let wettest = report
        .days
        .iter()
        .map(|d| d.precipitation_mm)
        .fold(0.0_f64, f64::max);
    for day in &report.days {
        out.push_str(&format!(
            "{}  {:<width$} {:>5.1}\n",
            day.date,
            bar(day.precipitation_mm, wettest),
            day.precipitation_mm,
            width = BAR_WIDTH,
        ));
    }
    out
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "▇".repeat(len)
}

pub fn project_list(projects: &[Project]) -> String {
    let mut out = String::from("  id  since       name\n");
    for project in projects {
        let address = project
            .address
            .as_deref()
            .map(|a| format!(" ({a})"))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:>4}  {}  {}{}\n",
            project.id, project.start_date, project.name, address
        ));
    }
    out
}

/// The text preview of one daily report, the unit handed to the client.
pub fn report_preview(project: &Project, report: &DailyReport) -> String {
    let mut out = String::from("Diário de Obra\n");
    out.push_str(&format!("Project:    {}\n", project.name));
    if let Some(address) = &project.address {
        out.push_str(&format!("Address:    {address}\n"));
    }
    out.push_str(&format!("Date:       {}\n", report.date));
    out.push_str(&format!(
        "Weather:    {} ({})\n",
        report.weather, report.period
    ));
    out.push_str(&format!("Activities: {}\n", report.activities));
    out.push_str(&format!("Notes:      {}\n", report.notes));

    if report.crew.is_empty() {
        out.push_str("Crew:       none recorded\n");
    } else {
        out.push_str("Crew:\n");
        for entry in &report.crew {
            out.push_str(&format!("  {:<16} {:>3}\n", entry.role.as_str(), entry.count));
        }
    }

    if report.photos.is_empty() {
        out.push_str("Photos:     none\n");
    } else {
        out.push_str("Photos:\n");
        for photo in &report.photos {
            out.push_str(&format!("  {}: {}\n", photo.file_name, photo.description));
        }
    }
    out
}
