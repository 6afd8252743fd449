use thiserror::Error;

/// Provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key configured. Not a failure; the job is skipped.
    #[error("Sentiment provider is not configured")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider rejected the credentials")]
    Unauthorized,
    #[error("Provider rate limit hit")]
    RateLimited,
    #[error("Provider returned status {0}")]
    Status(u16),
    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Map a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ProviderError::Unauthorized,
            429 => ProviderError::RateLimited,
            code => ProviderError::Status(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(ProviderError::from_status(401), ProviderError::Unauthorized));
        assert!(matches!(ProviderError::from_status(403), ProviderError::Unauthorized));
        assert!(matches!(ProviderError::from_status(429), ProviderError::RateLimited));
        assert!(matches!(ProviderError::from_status(502), ProviderError::Status(502)));
    }
}
