use serde::Serialize;

/// Structured reply handed back to whatever invoked a flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    /// JSON text.
    pub body: String,
}

impl InvocationResponse {
    pub fn json<T: Serialize + ?Sized>(status_code: u16, body: &T) -> Self {
        let body = serde_json::to_string(body).unwrap_or_else(|_| "null".to_string());
        Self { status_code, body }
    }

    pub fn ok<T: Serialize + ?Sized>(body: &T) -> Self {
        Self::json(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Success and failure both carry a response; the split only records which
/// one happened.
pub type Invocation = std::result::Result<InvocationResponse, InvocationResponse>;

pub fn into_response(invocation: Invocation) -> InvocationResponse {
    match invocation {
        Ok(response) | Err(response) => response,
    }
}
