use std::path::PathBuf;

#[derive(Debug)]
pub enum DataProcessingError {
    ExpectedFiniteNonNanData {
        context: String,
    },
    InvalidParameter {
        field: &'static str,
        context: String,
    },
}

#[derive(Debug)]
pub enum InputReadingError {
    ParsingError {
        source: serde_json::Error,
        context: &'static str,
    },
    FileReadingError {
        source: std::io::Error,
        context: &'static str,
        path: PathBuf,
    },
    HeaderParsingError {
        line: usize,
        context: String,
    },
}

impl DataProcessingError {
    pub fn append_to_context(mut self, context: &str) -> Self {
        match &mut self {
            DataProcessingError::ExpectedFiniteNonNanData {
                context: owned_context,
            } => {
                owned_context.push_str(context);
            }
            DataProcessingError::InvalidParameter {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
        }
        self
    }
}

#[derive(Debug)]
pub enum RollupError {
    /// No protein database records were available to roll up against.
    DatabaseNotFound,
    /// No reference modification (UniMod) entries were available.
    ModificationTableNotFound,
    EmptyIdentifications {
        context: &'static str,
    },
    DataProcessingError(DataProcessingError),
    InputReadingError(InputReadingError),
}

impl std::fmt::Display for RollupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollupError::DatabaseNotFound => write!(f, "Cant locate database data"),
            RollupError::ModificationTableNotFound => {
                write!(f, "Cant locate the reference modification table")
            }
            RollupError::EmptyIdentifications { context } => {
                write!(f, "No identifications to aggregate: {}", context)
            }
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for RollupError {}

pub type Result<T> = std::result::Result<T, RollupError>;

impl From<DataProcessingError> for RollupError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessingError(x)
    }
}

impl From<InputReadingError> for RollupError {
    fn from(x: InputReadingError) -> Self {
        Self::InputReadingError(x)
    }
}
