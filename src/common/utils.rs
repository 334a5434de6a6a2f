use std::str::FromStr;

use lambda_http::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use lambda_http::http::{HeaderValue, StatusCode};
use lambda_http::{Request, RequestExt, RequestPayloadExt, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{Error, Result, TodoError};

const EMPTY_PAYLOAD_ERROR: &str = "Request payload is empty";

pub fn extract_request<T: DeserializeOwned>(request: &Request) -> Result<T> {
    match request.payload::<T>() {
        Ok(Some(val)) => Ok(val),
        Ok(None) => Err(TodoError::Validation(EMPTY_PAYLOAD_ERROR.into())),
        Err(err) => Err(TodoError::Validation(err.to_string())),
    }
}

pub fn path_parameter(request: &Request, name: &str) -> Result<String> {
    request
        .path_parameters()
        .first(name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TodoError::Validation(format!("Missing path parameter: {name}")))
}

pub fn query_parameter<T: FromStr>(request: &Request, name: &str) -> Result<Option<T>> {
    match request.query_string_parameters().first(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| TodoError::Validation(format!("Invalid query parameter {name}: {raw}"))),
        None => Ok(None),
    }
}

pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> std::result::Result<Response<String>, Error> {
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(ACCESS_CONTROL_ALLOW_CREDENTIALS, "true")
        .body(serde_json::to_string(body)?)?;

    Ok(response)
}

pub fn error_response(status: StatusCode, message: &str) -> Response<String> {
    let body = serde_json::json!({ "error": message }).to_string();

    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );

    response
}
