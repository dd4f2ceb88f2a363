use thiserror::Error;

/// Errors raised while loading, aligning or scanning samples.
#[derive(Debug, Error)]
pub enum IndelError {
    /// The pairwise aligner could not produce an alignment for a sample.
    #[error("alignment failed for {accession}: {reason}")]
    AlignmentFailure { accession: String, reason: String },
    /// Rows of unequal length, or a column that is a gap in both rows.
    #[error("malformed alignment for {accession}: {reason}")]
    MalformedAlignment { accession: String, reason: String },
    #[error("invalid alignment scores: {0}")]
    InvalidScores(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl IndelError {
    pub fn alignment_failure(accession: &str, reason: impl Into<String>) -> Self {
        IndelError::AlignmentFailure {
            accession: accession.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(accession: &str, reason: impl Into<String>) -> Self {
        IndelError::MalformedAlignment {
            accession: accession.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndelError>;
