//! Interactive form for the daily-report aggregate.
//!
//! Walks the user through every field, pre-filling from the stored report
//! when one already exists for the chosen (project, date).

use anyhow::Result;
use chrono::NaiveDate;
use inquire::{Confirm, CustomType, Select, Text};

use obra_core::model::{
    CrewRole, DAY_PERIODS, DailyReport, PhotoRef, ReportDraft, WEATHER_CONDITIONS,
};

pub fn fill_report(
    project_id: i64,
    date: NaiveDate,
    existing: Option<&DailyReport>,
) -> Result<ReportDraft> {
    let weather = select_field(
        "Weather condition",
        WEATHER_CONDITIONS,
        existing.map(|r| r.weather.as_str()),
    )?;
    let period = select_field(
        "Period of day",
        DAY_PERIODS,
        existing.map(|r| r.period.as_str()),
    )?;

    let activities = Text::new("Activities carried out")
        .with_initial_value(existing.map_or("", |r| r.activities.as_str()))
        .prompt()?;
    let notes = Text::new("Notes")
        .with_initial_value(existing.map_or("", |r| r.notes.as_str()))
        .prompt()?;

    let mut crew = Vec::with_capacity(CrewRole::all().len());
    for role in CrewRole::all() {
        let current = existing
            .and_then(|r| r.crew.iter().find(|entry| entry.role == *role))
            .map_or(0, |entry| entry.count);
        let count = CustomType::<u32>::new(&format!("{role} on site"))
            .with_default(current)
            .with_error_message("Enter a whole number of workers")
            .prompt()?;
        crew.push((*role, count));
    }

    let mut photos = Vec::new();
    if let Some(report) = existing
        && !report.photos.is_empty()
    {
        let keep = Confirm::new(&format!(
            "Keep the {} photo(s) already on this report?",
            report.photos.len()
        ))
        .with_default(true)
        .prompt()?;
        if keep {
            photos.extend(report.photos.iter().cloned());
        }
    }
    while Confirm::new("Add a photo?").with_default(false).prompt()? {
        let file_name = Text::new("Photo file name").prompt()?;
        let description = Text::new("Photo description").prompt()?;
        photos.push(PhotoRef {
            file_name,
            description,
        });
    }

    Ok(ReportDraft {
        project_id,
        date,
        weather,
        period,
        activities,
        notes,
        crew,
        photos,
    })
}

/// Select with the cursor on the currently stored value, when it is one of
/// the offered options.
fn select_field(prompt: &str, options: &[&str], current: Option<&str>) -> Result<String> {
    let start = current
        .and_then(|value| options.iter().position(|option| *option == value))
        .unwrap_or(0);
    let choice = Select::new(prompt, options.to_vec())
        .with_starting_cursor(start)
        .prompt()?;
    Ok(choice.to_owned())
}
