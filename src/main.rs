// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use buyhigh::session::SessionManager;
use buyhigh::token;
use buyhigh::utils::mask_credential;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes following sysexits.h conventions
/// These provide meaningful exit status to calling processes and scripts
mod exit_codes {
    /// Success - operation completed successfully
    pub const SUCCESS: i32 = 0;
    /// General error - unspecified error
    pub const ERROR: i32 = 1;
    /// Permission denied - sign-in rejected or required
    pub const NO_PERM: i32 = 77;
}

use exit_codes::*;

/// Spinner helpers for consistent progress indicators
mod spinner {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;

    /// Create a spinner with consistent styling
    pub fn create(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("\u{28FB}\u{28F9}\u{28FC}\u{28F8}\u{28FE}\u{28F6}\u{28F7}\u{28E7}\u{28CF}\u{28DF} ")
                .template("{spinner:.cyan} {msg}")
                .unwrap()
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    /// Finish spinner with success message
    pub fn finish_success(spinner: &ProgressBar, message: &str) {
        spinner.finish_and_clear();
        println!("\x1b[32m[OK]\x1b[0m {}", message);
    }

    /// Finish spinner with error message
    pub fn finish_error(spinner: &ProgressBar, message: &str) {
        spinner.finish_and_clear();
        println!("\x1b[31m[X]\x1b[0m {}", message);
    }
}

#[derive(Parser)]
#[command(name = "buyhigh", version = VERSION, about = "BuyHigh.io client. Buy high, sell low, automate the regret.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose mode: detailed output for debugging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    ///
    /// Examples:
    ///   buyhigh login
    ///   buyhigh login --email trader@buyhigh.io
    Login {
        /// Email address (prompted interactively when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Sign in by exchanging a Google-issued identity token
    ///
    /// Examples:
    ///   buyhigh google-login eyJhbGciOi...
    GoogleLogin {
        /// The Google identity token to exchange
        token: String,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the current session
    ///
    /// Examples:
    ///   buyhigh status
    ///   buyhigh s
    #[command(alias = "s")]
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    runtime.block_on(run(cli.command))
}

async fn run(command: Commands) -> Result<()> {
    let mut manager = SessionManager::new()?;
    manager.restore();

    match command {
        Commands::Login { email } => {
            let email = match email {
                Some(email) => email,
                None => inquire::Text::new("Email:").prompt()?,
            };
            let password = inquire::Password::new("Password:")
                .without_confirmation()
                .prompt()?;

            let spinner = spinner::create("Signing in...");
            let ok = manager.login(&email, &password).await;

            if ok {
                let session = manager.session();
                let who = session
                    .user
                    .as_ref()
                    .map(|u| u.email.clone())
                    .unwrap_or_else(|| email.clone());
                spinner::finish_success(&spinner, &format!("Signed in as {}", who.bold()));
                if session.credential.is_none() {
                    println!(
                        "{} The backend issued no session token; some calls may require signing in again.",
                        "[!]".yellow()
                    );
                }
            } else {
                spinner::finish_error(&spinner, "Sign-in failed. Check your email and password.");
                std::process::exit(NO_PERM);
            }
        }

        Commands::GoogleLogin { token } => {
            let spinner = spinner::create("Exchanging Google token...");
            let ok = manager.login_with_google(&token).await;

            if ok {
                let who = manager
                    .session()
                    .user
                    .as_ref()
                    .map(|u| u.email.clone())
                    .unwrap_or_default();
                spinner::finish_success(&spinner, &format!("Signed in as {}", who.bold()));
            } else {
                spinner::finish_error(&spinner, "Google sign-in failed.");
                std::process::exit(NO_PERM);
            }
        }

        Commands::Logout => {
            let spinner = spinner::create("Signing out...");
            manager.logout().await;
            spinner::finish_success(&spinner, "Signed out.");
        }

        Commands::Status => {
            show_status(&manager);
            if !manager.session().is_authenticated() {
                std::process::exit(ERROR);
            }
        }
    }

    std::process::exit(SUCCESS);
}

fn show_status(manager: &SessionManager) {
    let session = manager.session();

    let Some(user) = session.user.as_ref() else {
        println!("{} Not signed in.", "[!]".yellow());
        println!("    Run {} to sign in.", "buyhigh login".cyan());
        return;
    };

    println!(
        "{} Signed in as {} (user {})",
        "[OK]".green(),
        user.email.bold(),
        user.id
    );
    if let Some(uid) = user.firebase_uid.as_deref() {
        println!("    firebase uid: {}", uid);
    }

    match session.credential.as_deref() {
        Some(credential) => {
            print!("    credential:   {}", mask_credential(credential));
            let expiry = token::decode_claims(credential).and_then(|c| c.expires_at());
            match expiry {
                Some(exp) => println!(" (expires {})", exp.format("%Y-%m-%d %H:%M UTC")),
                None => println!(),
            }
        }
        None => {
            println!("    credential:   {} (degraded session)", "none".yellow());
        }
    }
    println!("    backend:      {}", manager.client().base_url());
}
