//! college-token: Command-line tool for minting and inspecting bearer tokens.
//!
//! Tokens are signed with the same `JWT_SECRET` the API server verifies
//! against, so operators can call admin endpoints such as `GET /logs`.

use std::process::ExitCode;

use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use college_core::{Claims, Role, TokenVerifier};

#[derive(Parser)]
#[command(name = "college-token")]
#[command(author, version, about = "Bearer token tool for the college management API")]
#[command(propagate_version = true)]
struct Cli {
    /// Signing secret (falls back to the JWT_SECRET environment variable)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a signed token
    Issue {
        /// User id placed in the `sub` claim
        #[arg(short, long)]
        user: String,

        /// Role: admin, faculty, or student
        #[arg(short, long, default_value = "admin")]
        role: Role,

        /// Lifetime in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,

        /// Optional display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Verify a token and print its claims
    Verify {
        /// Token to verify
        token: String,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let verifier = TokenVerifier::new(&cli.secret)?;

    match cli.command {
        Commands::Issue {
            user,
            role,
            hours,
            name,
        } => {
            let now = Utc::now();
            let claims = Claims {
                sub: user,
                role,
                exp: expiry_after(now, hours)?.timestamp(),
                iat: Some(now.timestamp()),
                name,
            };
            println!("{}", verifier.issue(&claims)?);
        }
        Commands::Verify { token } => {
            let claims = verifier.verify(token.trim())?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
    }

    Ok(())
}

/// Expiry `hours` after `now`; rejects non-positive or out-of-range values.
fn expiry_after(now: DateTime<Utc>, hours: i64) -> anyhow::Result<DateTime<Utc>> {
    if hours <= 0 {
        anyhow::bail!("--hours must be positive");
    }
    Duration::try_hours(hours)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| anyhow::anyhow!("--hours {} is out of range", hours))
}
