use thiserror::Error;

/// Failures from the SQLite-backed stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A precondition on the input failed before any SQL ran.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("no project with id {0}")]
    UnknownProject(i64),

    /// Deletion is refused while daily reports still reference the project.
    #[error("project {id} still has {reports} daily report(s)")]
    ProjectHasReports { id: i64, reports: i64 },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Failures from the weather-history lookup.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// A precondition on the request failed before any network call.
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    #[error("city '{0}' not found")]
    CityNotFound(String),

    /// The archive rejected the request; its reason is passed on verbatim.
    #[error("archive error: {0}")]
    Upstream(String),

    #[error("connection failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected {endpoint} response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}
