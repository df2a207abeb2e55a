//! The "summary ready" email.

pub const SUMMARY_READY_SUBJECT: &str = "Your Document Summary is Ready! - SmartDoc AI";

/// Characters of the summary included in the email body.
const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct SummaryNotification {
    pub subject: String,
    pub html_body: String,
}

impl SummaryNotification {
    pub fn new(document_name: &str, summary_text: &str) -> Self {
        let preview = preview(summary_text);
        let html_body = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #2c3e50;">Your Document Summary is Ready!</h2>
    <p>Hello!</p>
    <p>We've analyzed your document and generated a summary.</p>
    <div style="background-color: #f8f9fa; padding: 15px; border-left: 4px solid #3498db; margin: 20px 0;">
        <h3 style="margin-top: 0; color: #2c3e50;">Document: {document}</h3>
    </div>
    <div style="background-color: #ffffff; padding: 20px; border: 1px solid #dee2e6; border-radius: 5px; margin: 20px 0;">
        <h4 style="color: #495057;">Summary:</h4>
        <p style="line-height: 1.6; color: #6c757d;">{summary}</p>
    </div>
    <p>Log in to your SmartDoc AI account to view the complete summary and manage your documents.</p>
    <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #dee2e6;">
        <p style="color: #6c757d; font-size: 12px;">
            This is an automated notification from SmartDoc AI.<br>
            You can disable these notifications in your account settings.
        </p>
    </div>
</div>"#,
            document = escape_html(document_name),
            summary = escape_html(&preview),
        );

        Self {
            subject: SUMMARY_READY_SUBJECT.to_string(),
            html_body,
        }
    }
}

fn preview(summary_text: &str) -> String {
    if summary_text.chars().count() > PREVIEW_CHARS {
        let mut truncated: String = summary_text.chars().take(PREVIEW_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        summary_text.to_string()
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
