//! Account command handlers.

use anyhow::Result;
use courier_core::api::types::{LoginRequest, RegisterRequest};
use courier_core::api::{ApiClient, mask_token};
use courier_core::session::SessionController;

use super::{already_signed_in, format_timestamp, require_session, resolve_arg};

pub async fn register(
    api: &ApiClient,
    controller: &mut SessionController,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    if let Some(notice) = already_signed_in(controller) {
        println!("{notice}");
        return Ok(());
    }

    let name = resolve_arg(name, "Name")?;
    let email = resolve_arg(email, "Email")?;
    let password = resolve_arg(password, "Password")?;

    let resp = api
        .register(&RegisterRequest {
            name,
            email,
            password,
        })
        .await?;

    controller.login(resp.token.clone(), resp.user.clone());

    println!();
    println!(
        "✓ Account created for {} <{}> (token: {})",
        resp.user.name,
        resp.user.email,
        mask_token(&resp.token)
    );
    println!("  Session saved to: {}", controller.store().path().display());

    Ok(())
}

pub async fn login(
    api: &ApiClient,
    controller: &mut SessionController,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    if let Some(notice) = already_signed_in(controller) {
        println!("{notice}");
        return Ok(());
    }

    let email = resolve_arg(email, "Email")?;
    let password = resolve_arg(password, "Password")?;

    let resp = api.login(&LoginRequest { email, password }).await?;

    controller.login(resp.token.clone(), resp.user.clone());

    println!();
    println!(
        "✓ Signed in as {} <{}> (token: {})",
        resp.user.name,
        resp.user.email,
        mask_token(&resp.token)
    );
    println!("  Session saved to: {}", controller.store().path().display());

    Ok(())
}

pub fn logout(controller: &mut SessionController) -> Result<()> {
    let session_path = controller.store().path().display().to_string();

    if controller.logout() {
        println!("✓ Signed out");
        println!("  Session removed from: {session_path}");
    } else {
        println!("Not signed in (no session found).");
    }

    Ok(())
}

pub async fn whoami(api: &ApiClient, controller: &SessionController) -> Result<()> {
    require_session(controller)?;
    let Some(token) = controller.token() else {
        anyhow::bail!("Not signed in. Run `courier login` (or `courier register`) first.");
    };

    let profile = api.with_bearer(token).get_profile().await?.user;

    println!("{} <{}>", profile.name, profile.email);
    println!("  id: {}", profile.id);
    if !profile.created_at.is_empty() {
        println!("  member since: {}", format_timestamp(&profile.created_at));
    }

    Ok(())
}
