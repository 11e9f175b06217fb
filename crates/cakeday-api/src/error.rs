use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,

    #[error("user may not perform that action")]
    Forbidden,

    #[error("no such record")]
    NotFound,

    #[error("such entity already exists")]
    Conflict,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("error in the request body")]
    UnprocessableEntity {
        errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
    },

    #[error("an internal server error occurred: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unprocessable_entity<K, V>(errors: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        let mut error_map = HashMap::new();

        for (key, val) in errors {
            error_map
                .entry(key.into())
                .or_insert_with(Vec::new)
                .push(val.into());
        }

        Self::UnprocessableEntity { errors: error_map }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Anyhow(ref e) = self {
            error!("internal error: {:?}", e);
        }

        let status = self.status_code();
        let body = match &self {
            Self::UnprocessableEntity { errors } => {
                serde_json::json!({ "errors": errors })
            }
            other => serde_json::json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprocessable_entity_groups_messages_by_field() {
        let err = ApiError::unprocessable_entity([
            ("first_name", "must not be blank"),
            ("first_name", "too long"),
            ("birthday", "cannot be in the future"),
        ]);

        match err {
            ApiError::UnprocessableEntity { errors } => {
                assert_eq!(errors["first_name"].len(), 2);
                assert_eq!(errors["birthday"].len(), 1);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
