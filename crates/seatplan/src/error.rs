use thiserror::Error;

pub type Result<T> = std::result::Result<T, SeatPlanError>;

#[derive(Debug, Error)]
pub enum SeatPlanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid CSV header: {0}")]
    CsvHeader(String),

    #[error("Invalid CSV row {row}: {message}")]
    CsvRow { row: usize, message: String },

    #[error("Student name at position {position} is empty")]
    EmptyName { position: usize },

    #[error("Duplicate student names: {}", .0.join(", "))]
    DuplicateNames(Vec<String>),

    #[error("Unknown names in {context}: {}", .names.join(", "))]
    UnknownNames {
        context: &'static str,
        names: Vec<String>,
    },

    #[error("Forbidden group {index} needs at least two distinct names")]
    InvalidGroup { index: usize },

    #[error("Too many students: {count} students for {capacity} seats")]
    TooManyStudents { count: usize, capacity: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No valid seating found after {attempts} attempts")]
    NoSolutionFound { attempts: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SeatPlanError {
    /// Errors raised while validating class input, before any search starts
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SeatPlanError::EmptyName { .. }
                | SeatPlanError::DuplicateNames(_)
                | SeatPlanError::UnknownNames { .. }
                | SeatPlanError::InvalidGroup { .. }
                | SeatPlanError::TooManyStudents { .. }
                | SeatPlanError::InvalidInput(_)
        )
    }
}

impl From<toml::de::Error> for SeatPlanError {
    fn from(err: toml::de::Error) -> Self {
        SeatPlanError::Config(format!("TOML parse error: {}", err))
    }
}
