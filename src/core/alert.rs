//! User-facing messages for failed lookups.

use std::fmt::Display;

/// Why a lookup did not update the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchAlert {
    /// The search answered but nothing usable could be extracted.
    InsufficientData,
    /// The upstream key was blocked after being found in public.
    CredentialLeaked,
    /// The upstream key is not configured.
    CredentialMissing,
    /// Any other transport or server failure.
    Unavailable,
}

impl FetchAlert {
    /// Classifies a hard failure by the wording of its error chain.
    ///
    /// This matches on upstream error text ("leaked", "API Key"), so a change in
    /// wording on the provider side silently moves errors into `Unavailable`.
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::from_message(&format!("{err:#}"))
    }

    pub fn from_message(message: &str) -> Self {
        if message.contains("leaked") {
            FetchAlert::CredentialLeaked
        } else if message.contains("API Key") {
            FetchAlert::CredentialMissing
        } else {
            FetchAlert::Unavailable
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FetchAlert::InsufficientData => {
                "Could not find sufficient data for this ticker. Please try again or enter details manually."
            }
            FetchAlert::CredentialLeaked => {
                "SECURITY ALERT: Your API Key has been blocked by Google because it was detected publicly. Please generate a NEW key at aistudio.google.com, update your environment variables, and restart."
            }
            FetchAlert::CredentialMissing => {
                "Configuration Error: API Key not found. Please check your environment variables."
            }
            FetchAlert::Unavailable => "Unable to fetch live data. Please enter values manually.",
        }
    }
}

impl Display for FetchAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn test_leaked_key() {
        let err = anyhow!("Your API key was reported as leaked. Please use another API key.");
        assert_eq!(FetchAlert::from_error(&err), FetchAlert::CredentialLeaked);
    }

    #[test]
    fn test_missing_key() {
        let err = anyhow!("API Key is missing. Please configure the API_KEY environment variable.");
        assert_eq!(FetchAlert::from_error(&err), FetchAlert::CredentialMissing);
    }

    #[test]
    fn test_leaked_wins_over_missing() {
        assert_eq!(
            FetchAlert::from_message("API Key reported as leaked"),
            FetchAlert::CredentialLeaked
        );
    }

    #[test]
    fn test_context_chain_is_searched() {
        let err: anyhow::Result<()> = Err(anyhow!("API Key is missing"));
        let err = err.context("Lookup failed for AAPL").unwrap_err();
        assert_eq!(FetchAlert::from_error(&err), FetchAlert::CredentialMissing);
    }

    #[test]
    fn test_generic_failure() {
        let err = anyhow!("Request failed with status 502");
        assert_eq!(FetchAlert::from_error(&err), FetchAlert::Unavailable);
        // Matching is case sensitive, as upstream wording is.
        assert_eq!(
            FetchAlert::from_message("api key invalid"),
            FetchAlert::Unavailable
        );
    }

    #[test]
    fn test_messages_are_distinct() {
        let all = [
            FetchAlert::InsufficientData,
            FetchAlert::CredentialLeaked,
            FetchAlert::CredentialMissing,
            FetchAlert::Unavailable,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
        }
        assert!(FetchAlert::InsufficientData.to_string().contains("sufficient data"));
    }
}
