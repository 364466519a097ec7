// Error taxonomy for one report run.
//
// Fatal conditions (schema, configuration, discovery, I/O) get a variant
// here and abort the run before any artifact is written. Recovered defects
// (a row that fails coercion, a group with no eligible observations) are
// counted in stats structs instead and never surface as errors.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// A required input column could not be resolved against the header row.
    #[error("missing required field '{0}' in input header")]
    MissingField(String),

    /// An outcome value was numeric but outside the known outcome domain.
    #[error("unexpected outcome value {0} (known values: {1})")]
    OutcomeDomain(i64, String),

    /// Input discovery found zero or more than one candidate file.
    #[error("expected exactly one .csv file starting with '{prefix}', found {found}")]
    Discovery { prefix: String, found: usize },

    #[error("invalid shift start selection '{0}' (allowed: 1, 4, 7, 9, 10, 11)")]
    ShiftStart(String),

    #[error("invalid break schema '{0}' (choose '1' for 15-30-15 or '2' for 30-30)")]
    BreakSchema(String),

    /// A rendering spec referenced a column the table does not have.
    #[error("metric column '{0}' not found in report headers")]
    ColumnNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
