//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::output::Row;
use crate::cli::GlobalOpts;
use crate::core::identity::short_id;
use crate::core::{
    Bid, Config, Decision, Employee, Feedback, Organization, ServiceError, Tender, TenderService,
};

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Load configuration with the command-line overrides applied
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    let mut config = Config::try_load(global.config.as_deref()).into_diagnostic()?;
    if let Some(db) = &global.db {
        config.database.path = db.clone();
    }
    Ok(config)
}

/// Open the service on the configured database
pub fn open_service(global: &GlobalOpts) -> Result<TenderService> {
    let config = load_config(global)?;
    TenderService::open(&config).map_err(service_error)
}

/// The acting employee from `--user` / `TDESK_USER`
pub fn acting_user(global: &GlobalOpts) -> Result<&str> {
    global.user.as_deref().ok_or_else(|| {
        miette::miette!(
            code = "tdesk::no_user",
            help = "pass --user <username> or set TDESK_USER",
            "No acting employee given"
        )
    })
}

/// Turn a service error into a diagnostic with a stable code
pub fn service_error(err: ServiceError) -> miette::Report {
    let help = match &err {
        ServiceError::NoSuchUser => "register the employee with `tdesk employee new <username>`",
        ServiceError::NoSuchOrganization => "create it with `tdesk org new <name>`",
        ServiceError::InsufficientRights => {
            "only members of the owning organization may do this"
        }
        ServiceError::NoSuchVersion => "list earlier versions with the `history` command",
        ServiceError::NoSuchReviews => "the requester has not bid on this tender",
        ServiceError::InvalidTransition { .. } => {
            "workflow.enforce_transitions is on; move through the lifecycle one step at a time"
        }
        ServiceError::InvalidPage(_) => "see listing.max_limit in the config",
        err if err.is_internal() => "check that database.path points at a writable SQLite file",
        _ => "",
    };
    let code = format!("tdesk::{}", err.kind());
    if help.is_empty() {
        miette::miette!(code = code, "{}", err)
    } else {
        miette::miette!(code = code, help = help, "{}", err)
    }
}

/// Print the confirmation line shown after a write
pub fn print_done(action: &str, what: &str, id: &str, version: Option<i64>) {
    match version {
        Some(v) => println!(
            "{} {} {} {} (v{})",
            style("✓").green(),
            action,
            what,
            style(short_id(id)).cyan(),
            v
        ),
        None => println!(
            "{} {} {} {}",
            style("✓").green(),
            action,
            what,
            style(short_id(id)).cyan()
        ),
    }
}

fn date(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

impl Row for Tender {
    const HEADERS: &'static [&'static str] =
        &["ID", "NAME", "SERVICE", "STATUS", "VERSION", "CREATED"];

    fn id(&self) -> &str {
        &self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            truncate_str(&self.name, 40),
            self.service_type.to_string(),
            self.status.to_string(),
            self.version.to_string(),
            date(&self.created_at),
        ]
    }
}

impl Row for Bid {
    const HEADERS: &'static [&'static str] =
        &["ID", "NAME", "TENDER", "STATUS", "AUTHOR", "VERSION", "CREATED"];

    fn id(&self) -> &str {
        &self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            truncate_str(&self.name, 40),
            short_id(&self.tender_id).to_string(),
            self.status.to_string(),
            self.author_type.to_string(),
            self.version.to_string(),
            date(&self.created_at),
        ]
    }
}

impl Row for Employee {
    const HEADERS: &'static [&'static str] = &["ID", "USERNAME", "NAME"];

    fn id(&self) -> &str {
        &self.id
    }

    fn cells(&self) -> Vec<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        vec![self.id.clone(), self.username.clone(), name]
    }
}

impl Row for Organization {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "TYPE"];

    fn id(&self) -> &str {
        &self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            truncate_str(&self.name, 40),
            self.org_type.to_string(),
        ]
    }
}

impl Row for Feedback {
    const HEADERS: &'static [&'static str] = &["ID", "REVIEW", "CREATED"];

    fn id(&self) -> &str {
        &self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            truncate_str(&self.description, 60),
            date(&self.created_at),
        ]
    }
}

impl Row for Decision {
    const HEADERS: &'static [&'static str] = &["ID", "DECISION", "BY", "CREATED"];

    fn id(&self) -> &str {
        &self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.decision.to_string(),
            self.created_by.clone(),
            date(&self.created_at),
        ]
    }
}
