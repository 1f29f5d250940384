//! Request and response bodies for the backend REST API.

use serde::{Deserialize, Serialize};

use cinecart_core::OrderId;

use crate::cart::CartLine;

/// `POST /api/orders` body.
#[derive(Debug, Serialize)]
pub struct OrderRequest<'a> {
    /// Lines being purchased.
    pub items: &'a [CartLine],
}

/// `POST /api/orders` success body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderConfirmation {
    /// Backend-assigned order ID.
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
}

/// `POST /api/chat/ai` body.
#[derive(Debug, Serialize)]
pub struct AiRequest<'a> {
    /// What the user typed.
    pub message: &'a str,
}

/// `POST /api/chat/ai` success body.
///
/// `text` is optional on the wire; a reply without it is treated as a failure
/// by the chat session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AiReply {
    /// Assistant answer.
    #[serde(default)]
    pub text: Option<String>,
}

/// `POST /api/auth/login` body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    /// Trimmed email.
    pub email: &'a str,
    /// Password, sent under the backend's field name.
    #[serde(rename = "senha")]
    pub password: &'a str,
}

/// `POST /api/auth/login` success body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    /// Bearer token. A response without one is a failed login.
    #[serde(default)]
    pub token: Option<String>,
}

/// `POST /api/auth/register` body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    /// Full name.
    #[serde(rename = "nomeCompleto")]
    pub full_name: &'a str,
    /// National document number, digits only.
    #[serde(rename = "cpf")]
    pub document: &'a str,
    /// Trimmed email.
    pub email: &'a str,
    /// Password.
    #[serde(rename = "senha")]
    pub password: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_wire_names() {
        let body = serde_json::to_value(LoginRequest {
            email: "a@b.c",
            password: "pw",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@b.c", "senha": "pw"}));
    }

    #[test]
    fn test_register_request_wire_names() {
        let body = serde_json::to_value(RegisterRequest {
            full_name: "Ana Souza",
            document: "12345678909",
            email: "a@b.c",
            password: "secret1",
        })
        .unwrap();
        assert_eq!(body["nomeCompleto"], "Ana Souza");
        assert_eq!(body["cpf"], "12345678909");
        assert_eq!(body["senha"], "secret1");
    }

    #[test]
    fn test_order_confirmation_numeric_id() {
        let confirmation: OrderConfirmation = serde_json::from_str(r#"{"orderId":17}"#).unwrap();
        assert_eq!(confirmation.order_id.as_str(), "17");
    }

    #[test]
    fn test_ai_reply_without_text() {
        let reply: AiReply = serde_json::from_str("{}").unwrap();
        assert!(reply.text.is_none());
    }
}
