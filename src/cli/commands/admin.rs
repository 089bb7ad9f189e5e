use clap::Subcommand;
use serde_json::json;

use crate::auth::TokenService;
use crate::cli::utils::{connect_database, output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::{AdminConfig, AppConfig};
use crate::database::models::User;
use crate::database::service::{create_admin, ensure_user_schema, find_admin, verify_password};

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Seed the users table with the administrator from ADMIN_* settings")]
    Setup,

    #[command(about = "Print a bearer token for the configured administrator")]
    Token,
}

pub async fn handle(cmd: AdminCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Setup => setup(config, output_format).await,
        AdminCommands::Token => token(config, output_format),
    }
}

async fn setup(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let admin = &config.admin;
    if !admin.is_configured() {
        anyhow::bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set");
    }

    let database = connect_database(config).await?;
    let pool = database.pool();
    ensure_user_schema(pool).await?;

    let result = match find_admin(pool).await? {
        Some(existing) => match check_existing_admin(&existing, admin) {
            Ok(()) => output_success(
                output_format,
                &format!("Administrator {} already exists", existing.email),
                Some(json!({ "id": existing.id, "email": existing.email })),
            ),
            Err(e) => {
                if output_format == OutputFormat::Json {
                    output_error(output_format, &e.to_string(), Some("ADMIN_MISMATCH"))?;
                }
                Err(e)
            }
        },
        None => {
            let user = create_admin(pool, &admin.name, &admin.email, &admin.password).await?;
            tracing::info!("Seeded administrator {}", user.email);
            output_success(
                output_format,
                &format!("Created administrator {}", user.email),
                Some(json!({ "id": user.id, "email": user.email, "role": user.role })),
            )
        }
    };

    database.close().await;
    result
}

/// A seeded administrator must match the `ADMIN_*` settings the server logs in with.
fn check_existing_admin(existing: &User, admin: &AdminConfig) -> anyhow::Result<()> {
    let in_sync = existing.email == admin.email.trim().to_lowercase()
        && verify_password(&admin.password, &existing.password_hash);
    if !in_sync {
        anyhow::bail!(
            "Administrator {} already exists and differs from ADMIN_EMAIL / ADMIN_PASSWORD",
            existing.email
        );
    }
    Ok(())
}

fn token(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.admin.email.is_empty() {
        anyhow::bail!("ADMIN_EMAIL must be set");
    }

    let tokens = TokenService::new(&config.security, &config.admin);
    let token = tokens.issue()?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Issued administrator token",
            Some(json!({
                "token": token,
                "expires_in_days": config.security.jwt_expiry_days,
            })),
        ),
        // Bare token so it can be used in `$(folio admin token)`
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::service::hash_password;
    use uuid::Uuid;

    fn seeded(email: &str, password: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Admin".to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            role: "admin".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    fn settings(email: &str, password: &str) -> AdminConfig {
        AdminConfig {
            name: "Admin".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn matching_admin_is_accepted() {
        let existing = seeded("admin@example.com", "s3cret-pass");
        assert!(check_existing_admin(&existing, &settings("Admin@Example.com", "s3cret-pass")).is_ok());
    }

    #[test]
    fn differing_admin_is_an_error() {
        let existing = seeded("admin@example.com", "s3cret-pass");

        let wrong_password = check_existing_admin(&existing, &settings("admin@example.com", "other-pass"));
        assert!(wrong_password.unwrap_err().to_string().contains("differs from ADMIN_EMAIL"));

        assert!(check_existing_admin(&existing, &settings("someone@example.com", "s3cret-pass")).is_err());
    }
}
