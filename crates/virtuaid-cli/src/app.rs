//! Application state for the VirtuAid admin CLI.
//!
//! `App` owns the configuration and the auth `Session` for one run, and maps
//! each command onto the session operations.

use std::io::{self, Write};

use anyhow::Result;
use tracing::{debug, warn};

use virtuaid_core::{Access, Config, Credential, GuardState, Session};

pub struct App {
    config: Config,
    session: Session,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(base_url = %config.api_base_url, "Config loaded");

        let session = Session::from_config(&config)?;
        Ok(Self { config, session })
    }

    pub async fn login(&mut self, email: Option<String>, keep: Option<bool>) -> Result<()> {
        if let Some(keep) = keep {
            self.session.set_persist(keep);
        }

        let email = match email {
            Some(email) => email,
            None => self.prompt_email()?,
        };
        let password = rpassword::prompt_password("Password: ")?;

        println!("\nLogging in...");
        match self.session.login(&email, &password).await {
            Ok(credential) => {
                self.config.last_email = credential.email.clone();
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                println!("Signed in as {}", describe(&credential));
                if !self.session.persist() {
                    println!("Keep me logged in is off; the next run will ask again.");
                }
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("{}", e)),
        }
    }

    fn prompt_email(&self) -> Result<String> {
        match self.config.last_email {
            Some(ref last) => print!("Email [{}]: ", last),
            None => print!("Email: "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        Ok(match (input.is_empty(), self.config.last_email.as_ref()) {
            (true, Some(last)) => last.clone(),
            _ => input.to_string(),
        })
    }

    /// Run the route guard for `path` and report the outcome.
    pub async fn open(&self, path: &str) -> Result<()> {
        let mut guard = self.session.guard(path);
        if guard.state() == GuardState::Checking {
            println!("Restoring session...");
        }
        guard.settle().await;

        match guard.access() {
            Access::Granted => {
                println!("{}: signed in as {}", path, describe(&self.session.current()));
                Ok(())
            }
            Access::Redirect(redirect) => {
                println!(
                    "Not signed in. Redirecting to {} (then back to {}).",
                    redirect.login_path,
                    redirect.destination()
                );
                Ok(())
            }
            Access::Pending => Err(anyhow::anyhow!("Session check did not settle")),
        }
    }

    pub async fn get(&self, path: &str) -> Result<()> {
        let mut guard = self.session.guard(path);
        if guard.settle().await != GuardState::Authenticated {
            return Err(anyhow::anyhow!("Not signed in. Run `virtuaid login` first."));
        }

        let value = self.session.get_json(path).await?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        // Restore first so the server can revoke the marker with a valid token
        let mut guard = self.session.guard("/dashboard");
        guard.settle().await;
        guard.logout().await;
        println!("Signed out.");
        Ok(())
    }

    pub fn show_persist(&self) {
        println!(
            "Keep me logged in: {}",
            if self.session.persist() { "on" } else { "off" }
        );
    }

    pub fn set_persist(&self, persist: bool) {
        self.session.set_persist(persist);
        self.show_persist();
    }
}

fn describe(credential: &Credential) -> String {
    format!(
        "{} <{}> ({})",
        credential.name.as_deref().unwrap_or("unknown"),
        credential.email.as_deref().unwrap_or("no email"),
        credential.role.display_name()
    )
}
