//! Maps service-layer errors to `skycast_core::AppError` for consistent
//! user-facing messages.

use skycast_api::ApiError;
use skycast_core::{AppError, NetworkError, ReqwestErrorExt};
use skycast_session::SessionError;

pub fn api_error(e: ApiError) -> AppError {
    match e {
        ApiError::Http(e) => AppError::Network(e.into_network_error()),
        ApiError::Status { status, message } => {
            AppError::Network(NetworkError::ServerError { status, message })
        }
        other => AppError::Service(other.to_string()),
    }
}

pub fn session_error(e: SessionError) -> AppError {
    AppError::Session(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_maps_to_network_error() {
        let err = api_error(ApiError::Status {
            status: 503,
            message: "unavailable".into(),
        });
        assert!(matches!(
            err,
            AppError::Network(NetworkError::ServerError { status: 503, .. })
        ));
    }

    #[test]
    fn failed_envelope_maps_to_service_error() {
        let err = api_error(ApiError::Failed("FAILED".into()));
        assert!(matches!(err, AppError::Service(_)));
    }
}
