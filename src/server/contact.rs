//! `POST /api/contact`: checks the submission and hands the resulting mail
//! to a [`Mailer`].

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};

use super::AppState;
use crate::contact::{relay_email_valid, ContactForm, ContactResponse};

pub const MISSING_FIELDS: &str = "All fields are required";
pub const INVALID_EMAIL: &str = "Invalid email format";
pub const DEMO_ACCEPTED: &str =
    "Message received successfully! (Demo mode - email not actually sent)";
pub const SENT: &str = "Message sent successfully! We will get back to you soon.";
pub const SEND_FAILED: &str = "Failed to send message. Please try again later.";

const SUMMARY_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivers composed mail. Implementations may block; the handler calls
/// them off the async runtime.
pub trait Mailer: Send + Sync + 'static {
    fn send(&self, email: &OutboundEmail) -> anyhow::Result<()>;
}

/// Logs outbound mail instead of delivering it.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &OutboundEmail) -> anyhow::Result<()> {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            bytes = email.html.len(),
            "outbound mail"
        );
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Notification for the site owner.
pub fn admin_notification(
    form: &ContactForm,
    from: &str,
    to: &str,
    received: DateTime<Utc>,
) -> OutboundEmail {
    let body = escape_html(&form.message).replace('\n', "<br>");
    OutboundEmail {
        from: from.to_string(),
        to: to.to_string(),
        subject: format!("New Contact Form Submission: {}", form.subject),
        html: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<h2 style="color: #44ffcc;">New Contact Form Submission</h2>
<p><strong>Name:</strong> {name}</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Subject:</strong> {subject}</p>
<h3>Message:</h3>
<p style="line-height: 1.6;">{body}</p>
<p style="color: #666; font-size: 12px;">Sent from the Terrigraphic contact form at {received}.</p>
</div>"#,
            name = escape_html(&form.full_name),
            email = escape_html(&form.email),
            subject = escape_html(&form.subject),
            received = received.to_rfc2822(),
        ),
    }
}

/// Auto-reply to the sender with a short summary of their message.
pub fn auto_reply(form: &ContactForm, from: &str) -> OutboundEmail {
    let mut summary: String = form.message.chars().take(SUMMARY_CHARS).collect();
    if form.message.chars().count() > SUMMARY_CHARS {
        summary.push_str("...");
    }
    OutboundEmail {
        from: from.to_string(),
        to: form.email.clone(),
        subject: "Thank you for contacting Terrigraphic!".to_string(),
        html: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<h2 style="color: #44ffcc;">Thank You for Your Message!</h2>
<p>Dear {name},</p>
<p>Thank you for reaching out to Terrigraphic! We have received your message and will get back to you within 24 hours.</p>
<h3>Your Message Summary:</h3>
<p><strong>Subject:</strong> {subject}</p>
<p><strong>Message:</strong> {summary}</p>
<p>Terrigraphic · Futuristic 3D Art &amp; Digital Design</p>
<p style="color: #666; font-size: 12px;">This is an automated response. Please do not reply to this email.</p>
</div>"#,
            name = escape_html(&form.full_name),
            subject = escape_html(&form.subject),
            summary = escape_html(&summary),
        ),
    }
}

fn reply(status: StatusCode, body: ContactResponse) -> (StatusCode, Json<ContactResponse>) {
    (status, Json(body))
}

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> (StatusCode, Json<ContactResponse>) {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable contact submission");
            return reply(StatusCode::BAD_REQUEST, ContactResponse::failed(MISSING_FIELDS));
        }
    };

    if form.has_missing_field() {
        return reply(StatusCode::BAD_REQUEST, ContactResponse::failed(MISSING_FIELDS));
    }
    if !relay_email_valid(&form.email) {
        return reply(StatusCode::BAD_REQUEST, ContactResponse::failed(INVALID_EMAIL));
    }

    let mail = &state.config().mail;
    let (Some(user), Some(admin), false) = (mail.user.clone(), mail.admin_address(), mail.demo_mode())
    else {
        tracing::info!(
            name = %form.full_name,
            email = %form.email,
            subject = %form.subject,
            message = %form.message,
            "demo mode, message would be sent"
        );
        return reply(StatusCode::OK, ContactResponse::ok(DEMO_ACCEPTED));
    };

    let notification = admin_notification(&form, &user, admin, Utc::now());
    let confirmation = auto_reply(&form, &user);
    let mailer = state.mailer();
    let sent = tokio::task::spawn_blocking(move || {
        mailer.send(&notification)?;
        mailer.send(&confirmation)
    })
    .await;

    match sent {
        Ok(Ok(())) => {
            tracing::info!(subject = %form.subject, "contact message sent");
            reply(StatusCode::OK, ContactResponse::ok(SENT))
        }
        Ok(Err(err)) => {
            tracing::error!(error = %err, "failed to send contact mail");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ContactResponse::failed(SEND_FAILED),
            )
        }
        Err(err) => {
            tracing::error!(error = %err, "mail task panicked");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ContactResponse::failed(SEND_FAILED),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(message: &str) -> ContactForm {
        ContactForm {
            full_name: "Ada <Lovelace>".into(),
            email: "ada@example.com".into(),
            subject: "Commission".into(),
            message: message.into(),
        }
    }

    #[test]
    fn admin_mail_escapes_and_breaks_lines() {
        let mail = admin_notification(&form("line one\nline two"), "site@x.io", "me@x.io", Utc::now());
        assert_eq!(mail.subject, "New Contact Form Submission: Commission");
        assert!(mail.html.contains("Ada &lt;Lovelace&gt;"));
        assert!(mail.html.contains("line one<br>line two"));
    }

    #[test]
    fn auto_reply_truncates_summary() {
        let long = "x".repeat(150);
        let mail = auto_reply(&form(&long), "site@x.io");
        assert_eq!(mail.to, "ada@example.com");
        assert!(mail.html.contains(&format!("{}...", "x".repeat(100))));
        assert!(!mail.html.contains(&"x".repeat(101)));
    }
}
