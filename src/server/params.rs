/***************************************/
/*        3rd party libraries          */
/***************************************/
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    #[error("Request parameters cannot be undefined")]
    Undefined,
    #[error("Request parameters must be valid integers")]
    NotInteger,
}

/**
 * Raw request parameters, as they arrived in the query string or the body.
 *
 * Values stay untyped until a handler asks for them with `integers`, which does
 * the presence and integer checks before anything reaches the elevator service.
 */
#[derive(Debug, Default, Clone)]
pub struct Params(HashMap<String, String>);

impl Params {
    /// Flatten a JSON object. Strings keep their text, whole numbers are written without
    /// a fraction and `null` counts as missing.
    pub fn from_json(value: Value) -> Params {
        let fields = match value {
            Value::Object(fields) => fields,
            _ => return Params::default(),
        };

        Params(
            fields
                .into_iter()
                .filter_map(|(name, value)| match value {
                    Value::Null => None,
                    Value::String(text) => Some((name, text)),
                    Value::Number(number) => Some((name, number_text(&number))),
                    other => Some((name, other.to_string())),
                })
                .collect(),
        )
    }

    /// Read the named parameters as integers, in order.
    ///
    /// Missing parameters are reported before malformed ones.
    pub fn integers<const N: usize>(&self, names: [&str; N]) -> Result<[i32; N], ParamError> {
        if names.iter().any(|name| !self.0.contains_key(*name)) {
            return Err(ParamError::Undefined);
        }

        let mut values = [0; N];
        for (value, name) in values.iter_mut().zip(names) {
            let raw = self.0.get(name).ok_or(ParamError::Undefined)?;
            *value = parse_integer(raw)?;
        }
        Ok(values)
    }
}

impl From<HashMap<String, String>> for Params {
    fn from(fields: HashMap<String, String>) -> Self {
        Params(fields)
    }
}

/// `4.0` reads as `4`. Fractional and non-finite values keep their text and fail later.
fn number_text(number: &serde_json::Number) -> String {
    if let Some(integer) = number.as_i64() {
        return integer.to_string();
    }
    match number.as_f64() {
        Some(float) if float.is_finite() && float.fract() == 0.0 && float.abs() < 1e15 => {
            format!("{}", float as i64)
        }
        _ => number.to_string(),
    }
}

/// Accepts an optional minus sign followed by decimal digits.
pub fn parse_integer(raw: &str) -> Result<i32, ParamError> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ParamError::NotInteger);
    }
    raw.parse().map_err(|_| ParamError::NotInteger)
}

#[async_trait]
impl<S> FromRequest<S> for Params
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Params(fields));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        if body.is_empty() {
            return Ok(Params::default());
        }

        serde_json::from_slice::<Value>(&body)
            .map(Params::from_json)
            .map_err(|_| (StatusCode::BAD_REQUEST, "Request body must be valid JSON").into_response())
    }
}
