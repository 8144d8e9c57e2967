//! Request dispatcher.
//!
//! Each request names an operation, optionally carries a session token, and
//! has a JSON body. Each response is a status code plus a JSON body; errors
//! are `{"error": message}`.
//!
//! | op | success body |
//! |---|---|
//! | `predict` | `{severity, recommendation, resources}` |
//! | `signup` | `{message}` |
//! | `login` | `{message, token}` |
//! | `logout` | `{message}` |
//! | `check_session` | `{isAuthenticated, username?}` |
//! | `results` | array of records, or a page when `limit` is given |
//! | `cleanup` | `{message, records_removed?}` |

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zeroize::Zeroizing;

use crate::application::{AccountService, PredictionService};
use crate::domain::Password;
use crate::ports::Storage;
use crate::AsthmaCareError;

/// One inbound request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiRequest {
    pub op: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub body: Value,
}

impl ApiRequest {
    #[must_use]
    pub fn new(op: impl Into<String>, token: Option<&str>, body: Value) -> Self {
        Self {
            op: op.into(),
            token: token.map(str::to_string),
            body,
        }
    }
}

/// One outbound response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::ok(json!({ "message": text.into() }))
    }

    #[must_use]
    pub fn error(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": text.into() }),
        }
    }
}

impl From<AsthmaCareError> for ApiResponse {
    fn from(e: AsthmaCareError) -> Self {
        let status = e.status();
        if e.is_client_error() {
            tracing::debug!("Request rejected ({}): {}", status, e);
        } else {
            tracing::error!("Request failed: {}", e);
        }
        Self::error(status, e.to_string())
    }
}

/// Routes requests to the services.
pub struct Api<S>
where
    S: Storage,
{
    predictions: PredictionService<S>,
    accounts: AccountService<S>,
}

impl<S> Api<S>
where
    S: Storage,
    S::Error: Into<crate::adapters::StorageError>,
{
    pub fn new(predictions: PredictionService<S>, accounts: AccountService<S>) -> Self {
        Self {
            predictions,
            accounts,
        }
    }

    /// Handle one request. Never panics; failures become error responses.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        tracing::debug!("Handling op={}", request.op);
        let token = request.token.as_deref();
        let body = &request.body;

        let result = match request.op.as_str() {
            "predict" => Ok(self.predict(token, body)),
            "signup" => self.signup(body),
            "login" => self.login(body),
            "logout" => {
                self.accounts.logout(token);
                Ok(ApiResponse::message("Logged out successfully!"))
            }
            "check_session" => to_json(&self.accounts.check_session(token)).map(ApiResponse::ok),
            "results" => self.results(token, body),
            "cleanup" => self.cleanup(token),
            other => return ApiResponse::error(404, format!("Unknown operation: {other}")),
        };

        result.unwrap_or_else(ApiResponse::from)
    }

    /// Serve JSON-lines requests from `input` until EOF, one response line
    /// per non-blank request line.
    ///
    /// # Returns
    /// Number of requests handled.
    ///
    /// # Errors
    /// Returns error if reading or writing fails.
    pub fn serve<R, W>(&self, input: R, mut output: W) -> Result<usize, AsthmaCareError>
    where
        R: std::io::BufRead,
        W: std::io::Write,
    {
        let mut handled = 0;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<ApiRequest>(&line) {
                Ok(request) => self.handle(&request),
                Err(e) => {
                    tracing::debug!("Malformed request line: {}", e);
                    ApiResponse::error(400, format!("Malformed request: {e}"))
                }
            };

            serde_json::to_writer(&mut output, &response)?;
            output.write_all(b"\n")?;
            output.flush()?;
            handled += 1;
        }
        Ok(handled)
    }

    fn predict(&self, token: Option<&str>, body: &Value) -> ApiResponse {
        // Anonymous predictions are accepted and stored without an owner.
        let owner = self.accounts.authenticate(token).ok();
        let outcome = self.predictions.predict_json(body, owner.as_deref());
        match to_json(&outcome.response) {
            Ok(value) => ApiResponse::ok(value),
            Err(e) => e.into(),
        }
    }

    fn signup(&self, body: &Value) -> Result<ApiResponse, AsthmaCareError> {
        let username = required_str(body, "username")?;
        let password = required_password(body, "password")?;
        let confirm = required_password(body, "confirm_password")?;

        self.accounts.signup(username, &password, &confirm)?;
        Ok(ApiResponse::message("Signup successful!"))
    }

    fn login(&self, body: &Value) -> Result<ApiResponse, AsthmaCareError> {
        let username = required_str(body, "username")?;
        let password = required_password(body, "password")?;

        let token = self.accounts.login(username, &password)?;
        Ok(ApiResponse::ok(json!({
            "message": "Login successful!",
            "token": token,
        })))
    }

    fn results(&self, token: Option<&str>, body: &Value) -> Result<ApiResponse, AsthmaCareError> {
        let Some(limit) = page_param(body, "limit")? else {
            let records = self.accounts.results(token)?;
            return Ok(ApiResponse::ok(to_json(&records)?));
        };

        let offset = page_param(body, "offset")?.unwrap_or(0);
        let page = self.accounts.results_page(token, offset, limit)?;
        Ok(ApiResponse::ok(json!({
            "items": to_json(&page.items)?,
            "total_count": page.total_count,
            "offset": page.offset,
            "limit": page.limit,
            "has_more": page.has_more,
        })))
    }

    fn cleanup(&self, token: Option<&str>) -> Result<ApiResponse, AsthmaCareError> {
        let report = self.accounts.cleanup(token)?;
        if report.records_removed == 0 {
            return Ok(ApiResponse::message(report.message()));
        }
        Ok(ApiResponse::ok(json!({
            "message": report.message(),
            "records_removed": report.records_removed,
        })))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, AsthmaCareError> {
    Ok(serde_json::to_value(value)?)
}

/// A paging field: absent or null is `None`; otherwise a non-negative
/// integer that fits a SQLite integer.
fn page_param(body: &Value, field: &str) -> Result<Option<usize>, AsthmaCareError> {
    let value = match body.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    value
        .as_u64()
        .filter(|&n| i64::try_from(n).is_ok())
        .and_then(|n| usize::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| AsthmaCareError::Validation(format!("Invalid {field}: {value}")))
}

fn required_str<'a>(body: &'a Value, field: &str) -> Result<&'a str, AsthmaCareError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AsthmaCareError::Validation(format!("Missing field: {field}")))
}

fn required_password(body: &Value, field: &str) -> Result<Password, AsthmaCareError> {
    required_str(body, field).map(|s| Zeroizing::new(s.to_string()))
}
