use anyhow::Context;
use chrono::{TimeZone, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::auth::TokenService;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    #[command(about = "Sign a token for a username without checking the account store")]
    Issue {
        #[arg(help = "Token subject")]
        username: String,
        #[arg(long, help = "Use the remember-me lifetime")]
        remember_me: bool,
    },

    #[command(about = "Validate a token and print its claims")]
    Verify {
        #[arg(help = "JWT to validate")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let tokens = TokenService::new(&config.security)?;

    match cmd {
        TokenCommands::Issue { username, remember_me } => {
            let issued = tokens.issue(&username, remember_me)?;
            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    json!({ "token": issued.token, "expiresIn": issued.expires_in, "expiresAt": issued.expires_at })
                ),
                OutputFormat::Text => println!("{}", issued.token),
            }
        }
        TokenCommands::Verify { token } => {
            let claims = tokens.validate(&token)?;
            let expires_at = Utc.timestamp_opt(claims.exp, 0).single();
            match output_format {
                OutputFormat::Json => println!("{}", json!({ "valid": true, "sub": claims.sub, "iat": claims.iat, "exp": claims.exp })),
                OutputFormat::Text => match expires_at {
                    Some(at) => println!("valid: sub={} expires={}", claims.sub, at),
                    None => println!("valid: sub={} exp={}", claims.sub, claims.exp),
                },
            }
        }
    }
    Ok(())
}
