//! Account commands.

use tracing::info;

use cinecart_client::{AuthSession, ClientConfig, Registration};

/// Report a successful login.
#[allow(clippy::print_stdout)]
pub fn report_login(session: &AuthSession) {
    if session.is_authenticated() {
        println!("Logged in.");
    }
}

/// Create an account.
///
/// # Errors
///
/// Returns an error if the form is invalid or the backend rejects it.
#[allow(clippy::print_stdout)]
pub async fn register(
    config: &ClientConfig,
    name: &str,
    document: &str,
    email: Option<String>,
    password: Option<String>,
    confirm: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = email.unwrap_or_default();
    let password = password.unwrap_or_default();
    let confirm = confirm.unwrap_or_else(|| password.clone());

    let registration = Registration::new(name, document, &email, &password, &confirm)?;
    let session = super::anonymous_session(config)?;
    session.register(&registration).await?;

    info!(email = %registration.email(), "Registered");
    println!("Account created. You can now log in.");
    Ok(())
}
