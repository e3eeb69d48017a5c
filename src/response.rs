use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use workout_tracker_api::{AppResponse as ApiResponse, StatusCode as ApiStatusCode};

/// Axum wrapper around `workout_tracker_api::AppResponse`, adding headers
/// (the refresh cookie lives there).
pub struct AppResponse<T> {
    inner: ApiResponse<T>,
    headers: Option<HeaderMap>,
}

impl<T> AppResponse<T>
where
    T: Serialize,
{
    pub fn new(inner: ApiResponse<T>) -> Self {
        Self {
            inner,
            headers: None,
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// 200 OK with data
    pub fn ok(data: T) -> Self {
        Self::new(ApiResponse::ok(data))
    }

    /// 201 Created with data
    pub fn created(data: T) -> Self {
        Self::new(ApiResponse::created(data))
    }
}

impl AppResponse<()> {
    /// 204 No Content
    pub fn no_content() -> Self {
        Self::new(ApiResponse::no_content())
    }
}

fn convert_status(api_status: ApiStatusCode) -> StatusCode {
    match api_status {
        ApiStatusCode::Ok => StatusCode::OK,
        ApiStatusCode::Created => StatusCode::CREATED,
        ApiStatusCode::NoContent => StatusCode::NO_CONTENT,
    }
}

impl<T> IntoResponse for AppResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status = convert_status(self.inner.status);

        let mut response = match self.inner.data {
            Some(data) => (status, Json(data)).into_response(),
            None => status.into_response(),
        };

        if let Some(headers) = self.headers {
            response.headers_mut().extend(headers);
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn no_content_has_empty_status_only() {
        let response = AppResponse::no_content().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn headers_are_copied_onto_response() {
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, "refresh_token=x".parse().unwrap());

        let response = AppResponse::created(serde_json::json!({ "userId": 1 }))
            .with_headers(headers)
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::SET_COOKIE).unwrap(),
            "refresh_token=x"
        );
    }

    #[test]
    fn status_conversion_matches_codes() {
        for status in [ApiStatusCode::Ok, ApiStatusCode::Created, ApiStatusCode::NoContent] {
            assert_eq!(convert_status(status).as_u16(), status.as_u16());
        }
    }
}
