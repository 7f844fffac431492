use std::fmt;

/// Failures of a single backend round trip.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, timeout).
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// No route is configured for this verb on this resource.
    #[error("{resource} does not support {operation}")]
    Unsupported {
        resource: &'static str,
        operation: Operation,
    },
}

impl ApiError {
    /// Builds a server error from a status and raw body, preferring the
    /// `message` or `error` field of a JSON body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "error"]
                    .iter()
                    .find_map(|key| value.get(*key).and_then(|m| m.as_str()).map(str::to_string))
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "no details".to_string()
                } else {
                    trimmed.to_string()
                }
            });
        ApiError::Server { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Server {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(verb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_comes_from_json_body() {
        let err = ApiError::from_response(422, r#"{"message":"amount must be positive"}"#);
        assert_eq!(
            err,
            ApiError::Server {
                status: 422,
                message: "amount must be positive".into()
            }
        );

        let err = ApiError::from_response(404, r#"{"error":"not found"}"#);
        assert_eq!(err.to_string(), "server error (404): not found");
    }

    #[test]
    fn server_message_falls_back_to_text() {
        assert_eq!(
            ApiError::from_response(500, "  boom \n").to_string(),
            "server error (500): boom"
        );
        assert_eq!(
            ApiError::from_response(502, "").to_string(),
            "server error (502): no details"
        );
    }
}
