//! Classification of failed exchanges into `ApiProblem` kinds.

use crate::error::ApiProblem;
use crate::http::{Exchange, TransportErrorKind};

/// Classify an exchange. `None` means the exchange succeeded and its body
/// should be parsed.
///
/// Transport failures are checked before HTTP statuses: connectivity first,
/// then timeout, then body decoding.
pub fn classify(exchange: &Exchange) -> Option<ApiProblem> {
    match exchange {
        Exchange::Failed(error) => Some(match error.kind {
            TransportErrorKind::Connect => ApiProblem::CannotConnect,
            TransportErrorKind::Timeout => ApiProblem::Timeout,
            TransportErrorKind::Decode => ApiProblem::BadData,
            TransportErrorKind::Other => ApiProblem::Unknown,
        }),
        Exchange::Response(response) => classify_status(response.status),
    }
}

/// Classify a bare HTTP status.
pub fn classify_status(status: u16) -> Option<ApiProblem> {
    match status {
        200..=299 => None,
        401 => Some(ApiProblem::Unauthorized),
        403 => Some(ApiProblem::Forbidden),
        404 => Some(ApiProblem::NotFound),
        500..=599 => Some(ApiProblem::Server),
        _ => Some(ApiProblem::Unknown),
    }
}
