pub type SuitupResult<T> = Result<T, SuitupError>;

#[derive(thiserror::Error, Debug)]
pub enum SuitupError {
    /// Collinear triangle or singular quad transform. Callers skip the
    /// affected region for the frame instead of aborting.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SuitupError {
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateGeometry(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            SuitupError::degenerate("x")
                .to_string()
                .contains("degenerate geometry:")
        );
        assert!(
            SuitupError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(SuitupError::asset("x").to_string().contains("asset error:"));
    }

    #[test]
    fn degenerate_is_detectable() {
        assert!(SuitupError::degenerate("tri").is_degenerate());
        assert!(!SuitupError::validation("v").is_degenerate());
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = SuitupError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
