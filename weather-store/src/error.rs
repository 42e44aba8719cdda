use thiserror::Error;

/// Message surfaced when the user refuses location access.
pub const PERMISSION_DENIED_MESSAGE: &str = "Permission to access location was denied";

/// Message surfaced for every network, provider or location lookup failure.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather data. Please check the city name.";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to weather provider failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("weather provider {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to parse weather provider {endpoint} response: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("no position fix available")]
    NoFix,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("refresh interval must be greater than zero")]
    ZeroInterval,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Permission to access location was denied")]
    PermissionDenied,

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl StoreError {
    /// The human-readable message stored in the error field of the store state.
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::PermissionDenied => PERMISSION_DENIED_MESSAGE,
            StoreError::Location(_) | StoreError::Provider(_) => FETCH_FAILED_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_map_to_two_strings() {
        assert_eq!(StoreError::PermissionDenied.user_message(), PERMISSION_DENIED_MESSAGE);
        assert_eq!(
            StoreError::Location(LocationError::NoFix).user_message(),
            FETCH_FAILED_MESSAGE
        );

        let status = StoreError::Provider(ProviderError::Status {
            endpoint: "forecast",
            status: 404,
            body: "city not found".to_string(),
        });
        assert_eq!(status.user_message(), FETCH_FAILED_MESSAGE);
        assert!(status.to_string().contains("404"));
    }
}
