//! `tdesk ping` command - database health check

use console::style;
use miette::Result;

use crate::cli::helpers::{open_service, service_error};
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    service.ping().map_err(service_error)?;

    let path = service
        .store()
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());
    println!("{} ok {}", style("✓").green(), style(path).dim());

    service.close().map_err(service_error)
}
