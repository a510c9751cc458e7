//! Contact form parsing and validation.

use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::mail::{MailError, Message};
use crate::request::Request;

const DEFAULT_SUBJECT: &str = "New message from the website";

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Malformed contact form")]
    Malformed,

    #[error("Invalid field: {0}")]
    Invalid(&'static str),

    #[error("Failed to send message")]
    Delivery(#[source] MailError),
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Malformed => StatusCode::BAD_REQUEST,
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: Option<String>,
}

impl ContactForm {
    /// Reads the body as `application/x-www-form-urlencoded` when the request
    /// says so, as JSON otherwise.
    pub fn from_request(req: &Request) -> Result<Self, ContactError> {
        match req.content_type().as_deref() {
            Some("application/x-www-form-urlencoded") => Ok(Self::from_urlencoded(req.body())),
            _ => serde_json::from_slice(req.body()).map_err(|_| ContactError::Malformed),
        }
    }

    fn from_urlencoded(body: &[u8]) -> Self {
        let mut form = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "name" => form.name = value.into_owned(),
                "email" => form.email = value.into_owned(),
                "message" => form.message = value.into_owned(),
                "subject" => form.subject = Some(value.into_owned()),
                _ => {}
            }
        }
        form
    }

    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.trim().is_empty() {
            return Err(ContactError::Invalid("name"));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') || email.contains(char::is_whitespace) {
            return Err(ContactError::Invalid("email"));
        }
        if self.message.trim().is_empty() {
            return Err(ContactError::Invalid("message"));
        }
        Ok(())
    }

    pub fn into_message(self, to: &str) -> Message {
        let subject = self.subject
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_owned());
        let name = self.name.trim();
        let email = self.email.trim();

        Message {
            to: to.to_owned(),
            reply_to: email.to_owned(),
            subject,
            text: format!("From: {name} <{email}>\n\n{}", self.message.trim()),
        }
    }
}
