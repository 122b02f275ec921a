use crate::commands::icon::{Icon, glyph};
use crate::commands::{AppContext, CommandResult};
use crate::forms::login::LoginForm;
use crate::services::ServiceError;

pub fn login(ctx: &AppContext, email: String, password: Option<String>) -> CommandResult<()> {
    let password = match password {
        Some(password) => password,
        None => std::env::var("APP_PASSWORD").map_err(|_| {
            ServiceError::Form("password is required (--password or APP_PASSWORD)".to_string())
        })?,
    };
    let credentials = LoginForm { email, password }
        .to_credentials()
        .map_err(ServiceError::from)?;

    let user = ctx.session.login(&ctx.repo, &credentials)?;
    ctx.cache.clear();
    println!("{} Logged in as {} <{}>", glyph(&Icon::User), user.name, user.email);
    Ok(())
}

pub fn logout(ctx: &AppContext) -> CommandResult<()> {
    ctx.session.logout()?;
    ctx.cache.clear();
    println!("Logged out.");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> CommandResult<()> {
    match ctx.session.revalidate(&ctx.repo)? {
        Some(user) => {
            println!("{} {} <{}>", glyph(&Icon::User), user.name, user.email);
            if !user.roles.is_empty() {
                println!("Roles: {}", user.roles.join(", "));
            }
            if let Some(customer_id) = user.customer_id {
                println!("Customer: #{customer_id}");
            }
            Ok(())
        }
        None => Err(ServiceError::Unauthorized.into()),
    }
}
