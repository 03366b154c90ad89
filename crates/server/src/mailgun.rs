use tracing;

// --- Environment helpers ---

fn mailgun_api_key() -> Result<String, String> {
    std::env::var("MAILGUN_API_KEY").map_err(|_| "MAILGUN_API_KEY is not configured".to_string())
}

fn mailgun_domain() -> Result<String, String> {
    std::env::var("MAILGUN_DOMAIN").map_err(|_| "MAILGUN_DOMAIN is not configured".to_string())
}

fn mailgun_from() -> Result<String, String> {
    match std::env::var("MAILGUN_FROM") {
        Ok(v) => Ok(v),
        Err(_) => Ok(format!("{} <noreply@{}>", app_name(), mailgun_domain()?)),
    }
}

fn app_base_url() -> String {
    std::env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

fn app_name() -> String {
    std::env::var("APP_NAME").unwrap_or_else(|_| "Deedflow".to_string())
}

// --- Core email sending ---

#[tracing::instrument(skip(html_body))]
pub async fn send_email(to: &str, subject: &str, html_body: &str) -> Result<(), String> {
    let domain = mailgun_domain()?;
    let url = format!("https://api.mailgun.net/v3/{}/messages", domain);

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .basic_auth("api", Some(mailgun_api_key()?))
        .form(&[
            ("from", mailgun_from()?),
            ("to", to.to_string()),
            ("subject", subject.to_string()),
            ("html", html_body.to_string()),
        ])
        .send()
        .await
        .map_err(|e| format!("Mailgun request failed: {}", e))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Mailgun API error ({}): {}", status, body));
    }

    tracing::info!(to = to, subject = subject, "Email sent successfully");
    Ok(())
}

// --- Higher-level helpers ---

/// Email the client their one-time invitation link for a newly created case.
/// Errors are logged, not propagated — case creation must not fail on email.
pub async fn send_invitation_email(to: &str, case_reference: &str, invitation_token: &str) {
    let html = templates::invitation_html(case_reference, invitation_token, &app_base_url());
    let subject = format!("Your {} conveyancing portal invitation", app_name());
    if let Err(e) = send_email(to, &subject, &html).await {
        tracing::error!(error = %e, to = to, "Failed to send invitation email");
    }
}

pub async fn send_welcome_email(to: &str, display_name: &str) {
    let html = templates::welcome_html(display_name, &app_name());
    if let Err(e) = send_email(to, &format!("Welcome to {}", app_name()), &html).await {
        tracing::error!(error = %e, to = to, "Failed to send welcome email");
    }
}

mod templates {
    pub fn invitation_html(case_reference: &str, token: &str, base_url: &str) -> String {
        format!(
            r#"<div style="font-family: sans-serif; max-width: 600px;">
  <h2>Your conveyancing case is ready</h2>
  <p>Your case <strong>{case_reference}</strong> has been opened.
     Create your account to track progress, upload documents and message your conveyancer.</p>
  <p><a href="{base_url}/signup?invite={token}"
        style="display:inline-block;padding:12px 24px;background:#b08d44;color:#fff;text-decoration:none;border-radius:4px;">
     Activate your portal account</a></p>
  <p>If the button does not work, copy this link into your browser:<br>
     {base_url}/signup?invite={token}</p>
</div>"#
        )
    }

    pub fn welcome_html(display_name: &str, app_name: &str) -> String {
        format!(
            r#"<div style="font-family: sans-serif; max-width: 600px;">
  <h2>Welcome to {app_name}, {display_name}</h2>
  <p>Your account is active. Sign in any time to see the current stage of
     your case, outstanding tasks and key dates.</p>
</div>"#
        )
    }

}
