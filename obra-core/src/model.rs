use chrono::NaiveDate;
use std::convert::TryFrom;

/// Weather conditions offered by the report form. Stored as free text, so
/// values outside this list are still valid data.
pub const WEATHER_CONDITIONS: &[&str] = &["Sol", "Nublado", "Chuva", "Garoa"];

/// Day periods offered by the report form.
pub const DAY_PERIODS: &[&str] = &["Manhã", "Tarde", "Dia inteiro"];

/// A registered construction project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    /// Recorded once at creation, never updated afterwards.
    pub start_date: NaiveDate,
}

/// Input for registering a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub address: Option<String>,
}

/// Fixed set of job titles tracked on a daily report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrewRole {
    Pedreiro,
    Servente,
    Carpinteiro,
    Armador,
    Eletricista,
    Encanador,
    Mestre,
}

impl CrewRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrewRole::Pedreiro => "Pedreiro",
            CrewRole::Servente => "Servente",
            CrewRole::Carpinteiro => "Carpinteiro",
            CrewRole::Armador => "Armador",
            CrewRole::Eletricista => "Eletricista",
            CrewRole::Encanador => "Encanador",
            CrewRole::Mestre => "Mestre de obras",
        }
    }

    pub const fn all() -> &'static [CrewRole] {
        &[
            CrewRole::Pedreiro,
            CrewRole::Servente,
            CrewRole::Carpinteiro,
            CrewRole::Armador,
            CrewRole::Eletricista,
            CrewRole::Encanador,
            CrewRole::Mestre,
        ]
    }
}

impl std::fmt::Display for CrewRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CrewRole {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        CrewRole::all()
            .iter()
            .find(|role| role.as_str() == value)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown crew role '{value}'."))
    }
}

/// One persisted crew line: a role and how many workers showed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrewEntry {
    pub role: CrewRole,
    pub count: u32,
}

/// Reference to a photo taken on site. The file itself lives outside the
/// store; only its name and a caption are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub file_name: String,
    pub description: String,
}

/// A daily report aggregate as stored: header fields plus owned child sets.
#[derive(Debug, Clone)]
pub struct DailyReport {
    pub id: i64,
    pub project_id: i64,
    pub date: NaiveDate,
    pub weather: String,
    pub period: String,
    pub activities: String,
    pub notes: String,
    pub crew: Vec<CrewEntry>,
    pub photos: Vec<PhotoRef>,
}

/// The unit of save: everything the form produces for one (project, date).
#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub project_id: i64,
    pub date: NaiveDate,
    pub weather: String,
    pub period: String,
    pub activities: String,
    pub notes: String,
    /// Zero counts are accepted here and dropped on save.
    pub crew: Vec<(CrewRole, u32)>,
    pub photos: Vec<PhotoRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crew_role_as_str_roundtrip() {
        for role in CrewRole::all() {
            let s = role.as_str();
            let parsed = CrewRole::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*role, parsed);
        }
    }

    #[test]
    fn unknown_crew_role_error() {
        let err = CrewRole::try_from("Astronauta").unwrap_err();
        assert!(err.to_string().contains("Unknown crew role"));
    }
}
