use anyhow::{bail, Context, Result};
use campusctl::{
    api::DEFAULT_BASE_URL,
    session::{decode_claims, SessionStore, StoredSession},
    ApiClient, ClientConfig, Credentials, ErrorMode,
};
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{Input, Password};
use std::io;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Log in to the campus API and inspect your account
#[derive(Parser)]
#[command(name = "campusctl", version)]
struct Cli {
    /// Root URL of the API.
    #[arg(long, env = "CAMPUSCTL_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// How failed requests are reported.
    #[arg(long, value_enum, default_value_t = ErrorModeArg::Passthrough, global = true)]
    error_mode: ErrorModeArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange a username and password for an access token
    Login {
        /// Username; prompted for when omitted
        #[arg(long)]
        username: Option<String>,
        /// Print the session without storing it in the keyring
        #[arg(long)]
        no_store: bool,
    },
    /// Show the profile of the logged-in user
    Me {
        /// Access token; defaults to the stored session
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the stored session
    Logout,
}

#[derive(Clone, Copy, ValueEnum)]
enum ErrorModeArg {
    Passthrough,
    Classified,
}

impl From<ErrorModeArg> for ErrorMode {
    fn from(arg: ErrorModeArg) -> Self {
        match arg {
            ErrorModeArg::Passthrough => ErrorMode::Passthrough,
            ErrorModeArg::Classified => ErrorMode::Classified,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pipeable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::new(cli.base_url).with_error_mode(cli.error_mode.into());
    let client = ApiClient::new(config).context("invalid API configuration")?;

    match cli.command {
        Commands::Login { username, no_store } => login(&client, username, no_store).await,
        Commands::Me { token } => me(&client, token).await,
        Commands::Logout => {
            SessionStore::open()?.clear()?;
            println!("Stored session removed.");
            Ok(())
        }
    }
}

async fn login(client: &ApiClient, username: Option<String>, no_store: bool) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text()
            .context("unable to read username")?,
    };
    // Typed without echo.
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .context("unable to read password")?;

    let session = client
        .login(&Credentials::new(username, password))
        .await
        .context("login failed")?;

    if !no_store {
        let stored = StoredSession::new(client.base_url().as_str(), &session);
        SessionStore::open()?
            .save(&stored)
            .context("unable to store session in keyring")?;
    }

    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

async fn me(client: &ApiClient, token: Option<String>) -> Result<()> {
    let access_token = match token {
        Some(token) => token,
        None => {
            let Some(stored) = SessionStore::open()?.load()? else {
                bail!("no stored session; run `campusctl login` first");
            };
            usable_access_token(stored, client.base_url())?
        }
    };

    let profile = client
        .current_user(&access_token)
        .await
        .context("unable to fetch current user")?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

/// Checks a stored session is meant for this server and hasn't expired.
fn usable_access_token(stored: StoredSession, base_url: &Url) -> Result<String> {
    if stored.base_url != base_url.as_str() {
        bail!(
            "stored session belongs to {}; log in again or pass --token",
            stored.base_url
        );
    }

    // Opaque tokens are fine too; the server gets the final say.
    match decode_claims(&stored.access) {
        Ok(claims) if claims.is_expired() => {
            bail!("stored session has expired; run `campusctl login` again")
        }
        Ok(_) => {}
        Err(error) => tracing::debug!(%error, "stored access token is not a JWT"),
    }

    Ok(stored.access)
}
