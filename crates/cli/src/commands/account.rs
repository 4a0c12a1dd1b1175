//! Sign-in, registration and password management.

use anyhow::Context as _;
use chrono::Utc;
use sentinel_core::access::Access;
use sentinel_core::auth::{ChangePasswordRequest, LoginResponse, RegisterUserRequest};
use sentinel_core::roles::ROLE_WORKER;
use sentinel_core::session::Session;

use crate::cli::RegisterArgs;
use crate::context::AppContext;

pub async fn login(ctx: &AppContext, email: &str, password: &str) -> anyhow::Result<()> {
    ctx.require(Access::Public)?;

    let grant = ctx.auth().login(email, password).await?;
    let session = establish(ctx, &grant, email).await?;

    match session.role.as_deref() {
        Some(role) => println!("Signed in as {email} ({role})"),
        None => println!("Signed in as {email}"),
    }
    Ok(())
}

pub fn logout(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.tokens.clear().context("could not remove the stored session")?;
    println!("Signed out");
    Ok(())
}

pub async fn register(ctx: &AppContext, args: RegisterArgs) -> anyhow::Result<()> {
    ctx.require(Access::Public)?;

    let payload = RegisterUserRequest {
        nombre: args.nombre,
        apellido: args.apellido,
        email: args.email.clone(),
        password: args.password,
        rol: ROLE_WORKER.to_string(),
        phone: args.phone,
    };
    let grant = ctx.auth().register(&payload).await?;
    establish(ctx, &grant, &args.email).await?;

    println!("Registered and signed in as {}", args.email);
    Ok(())
}

pub async fn change_password(
    ctx: &AppContext,
    email: String,
    current_password: String,
    new_password: String,
) -> anyhow::Result<()> {
    let payload = ChangePasswordRequest {
        email,
        current_password,
        new_password,
    };
    ctx.auth().change_password(&payload).await?;
    println!("Password updated");
    Ok(())
}

pub async fn reset_token(ctx: &AppContext, token: &str) -> anyhow::Result<()> {
    if ctx.auth().validate_reset_token(token).await {
        println!("Reset token is valid");
        Ok(())
    } else {
        anyhow::bail!("reset token is invalid or expired")
    }
}

/// Store the granted session, then resolve the account's role.
///
/// The token is written before the lookup so the lookup is
/// authenticated. A failed lookup leaves a session without a role.
async fn establish(ctx: &AppContext, grant: &LoginResponse, email: &str) -> anyhow::Result<Session> {
    let session = Session::from_login(grant, Utc::now());
    ctx.tokens.write(&session).context("could not store the session")?;

    let role = match ctx.auth().user_by_email(email).await {
        Ok(Some(user)) => Some(user.rol),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(email, error = %e, "Could not resolve user role");
            None
        }
    };

    let session = session.with_identity(email, role);
    ctx.tokens.write(&session).context("could not store the session")?;
    tracing::info!(email, admin = session.is_admin(), "Session stored");
    Ok(session)
}
