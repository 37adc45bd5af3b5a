use axum::http::StatusCode;

use super::ApiSuccess;

/// Tokens are self-contained, so there is nothing to revoke server-side.
/// The client discards its pair.
pub async fn logout() -> ApiSuccess<()> {
    ApiSuccess::new(StatusCode::OK, ())
}
