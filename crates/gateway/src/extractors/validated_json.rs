//! JSON body extractor that enforces request shape before the service runs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use common::AppError;

/// Deserialize a JSON body and run its `validator` rules.
///
/// Malformed bodies and rule violations both become `AppError::Validation`,
/// so they render as 400 without reaching the user service.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Rejected request body: {}", e);
            AppError::validation(e.body_text())
        })?;

        value
            .validate()
            .map_err(|e| AppError::validation(describe(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// One message per offending field, in field-name order.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    let messages: Vec<String> = fields
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| match &err.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid value for {}", field),
            })
        })
        .collect();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name cannot be empty"))]
        name: String,
        #[validate(range(min = 0, message = "Age cannot be negative"))]
        age: i32,
    }

    #[test]
    fn test_describe_joins_messages_by_field() {
        let sample = Sample {
            name: String::new(),
            age: -1,
        };
        let errors = sample.validate().unwrap_err();
        assert_eq!(describe(&errors), "Age cannot be negative; Name cannot be empty");
    }
}
