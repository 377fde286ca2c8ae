//! Browser chat page — a form plus the stored history.

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use lawbot_core::models::ChatMessage;

use crate::AppState;
use crate::error::AppError;
use crate::models::ChatForm;
use crate::services::chat;

/// `GET /` — render the chat page.
pub async fn chat_page(State(state): State<AppState>) -> Response {
    match state.history.list().await {
        Ok(records) => Html(render_page(&records, None)).into_response(),
        Err(e) => error_page(&state, AppError::from(e)).await,
    }
}

/// `POST /` — run an exchange from the form.
///
/// Success redirects back to `GET /` (303) so a browser refresh does not
/// resubmit the message. Failures render the page with a notice.
pub async fn submit_chat_form(
    State(state): State<AppState>,
    Form(form): Form<ChatForm>,
) -> Response {
    match chat::exchange(&state, &form.message).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => error_page(&state, e).await,
    }
}

/// Page with a notice, served with the error's status code.
async fn error_page(state: &AppState, err: AppError) -> Response {
    let (status, _, message) = err.parts();
    let message = message.to_string();
    if let AppError::Internal(detail) = &err {
        tracing::error!(%detail, "page request failed");
    }

    // History may itself be what failed; render without it in that case.
    let records = if status == StatusCode::INTERNAL_SERVER_ERROR {
        Vec::new()
    } else {
        state.history.list().await.unwrap_or_default()
    };
    (status, Html(render_page(&records, Some(&message)))).into_response()
}

/// Render the full page. `notice` is shown above the form.
pub fn render_page(records: &[ChatMessage], notice: Option<&str>) -> String {
    let mut html = String::with_capacity(2048 + records.len() * 256);
    html.push_str(PAGE_HEAD);

    html.push_str("<main>\n<section id=\"history\">\n");
    if records.is_empty() {
        html.push_str("<p class=\"empty\">No messages yet. Ask a legal question below.</p>\n");
    }
    for record in records {
        html.push_str(&format!(
            "<article class=\"exchange\" id=\"m-{id}\">\n\
             <div class=\"user\">{message}</div>\n\
             <div class=\"assistant\">{reply}</div>\n\
             <time datetime=\"{ts}\">{display}</time>\n\
             </article>\n",
            id = record.id,
            message = escape_html(&record.message),
            reply = escape_html(&record.reply),
            ts = record.created_at.to_rfc3339(),
            display = record.created_at.format("%Y-%m-%d %H:%M UTC"),
        ));
    }
    html.push_str("</section>\n");

    if let Some(notice) = notice {
        html.push_str(&format!(
            "<p class=\"notice\" role=\"alert\">{}</p>\n",
            escape_html(notice)
        ));
    }

    html.push_str(PAGE_FORM);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// Escape text for an HTML element body or quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>LawBot</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
.exchange { border-bottom: 1px solid #e5e7eb; padding: 0.75rem 0; }
.user { font-weight: 600; color: #4338ca; white-space: pre-wrap; }
.assistant { margin-top: 0.5rem; white-space: pre-wrap; }
time { font-size: 0.75rem; color: #6b7280; }
.notice { background: #fee2e2; color: #991b1b; padding: 0.5rem 0.75rem; border-radius: 0.5rem; }
.empty { color: #6b7280; }
form { display: flex; gap: 0.5rem; margin-top: 1rem; }
textarea { flex: 1; min-height: 3rem; }
</style>
</head>
<body>
<h1>LawBot</h1>
<p>General legal information. This is not legal advice.</p>
"#;

const PAGE_FORM: &str = r#"<form method="post" action="/">
<textarea name="message" maxlength="1000" required placeholder="Ask a legal question"></textarea>
<button type="submit">Send</button>
</form>
"#;
