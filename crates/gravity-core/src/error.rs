use thiserror::Error;

#[derive(Debug, Error)]
pub enum GravityError {
    // ── Ledger errors ────────────────────────────────────────────────────────
    #[error("ledger transport error: {0}")]
    Transport(String),

    #[error("ledger decode error: {0}")]
    Decode(String),

    // ── Storage ──────────────────────────────────────────────────────────────
    #[error("storage error: {0}")]
    Store(String),

    #[error("not found: {0}")]
    NotFound(String),

    // ── General ──────────────────────────────────────────────────────────────
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl GravityError {
    /// True for failures reaching or decoding the ledger node.
    pub fn is_ledger(&self) -> bool {
        matches!(self, GravityError::Transport(_) | GravityError::Decode(_))
    }
}

impl From<sqlx::Error> for GravityError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => GravityError::NotFound("row".into()),
            other => GravityError::Store(other.to_string()),
        }
    }
}
