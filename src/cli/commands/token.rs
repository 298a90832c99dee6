//! Verify token command handler

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::services::{JwtTokenIssuer, TokenIssuer};

pub fn cmd_verify_token(config: &Config, token: &str) -> anyhow::Result<()> {
    let issuer = JwtTokenIssuer::from_config(&config.security)?;

    match issuer.verify(token) {
        Ok(claims) => {
            let expires = DateTime::<Utc>::from_timestamp(claims.exp, 0)
                .map_or_else(|| claims.exp.to_string(), |t| t.to_rfc3339());
            println!("✓ Valid token");
            println!("  Username: {}", claims.username);
            println!("  Expires:  {expires}");
            Ok(())
        }
        Err(e) => anyhow::bail!("Token rejected: {e}"),
    }
}
