//! `tdesk org` command - Organizations and membership

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_service, print_done, service_error};
use crate::cli::output::{print_list, print_one};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::OrganizationType;

#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// Register an organization
    New(NewArgs),

    /// Make an employee responsible for an organization
    AddMember(MemberArgs),

    /// Revoke an employee's membership
    RemoveMember(MemberArgs),

    /// List an organization's members
    Members(MembersArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Organization name
    pub name: String,

    /// Free-text description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Legal form: IE, LLC or JSC
    #[arg(long = "type", short = 't', default_value = "LLC")]
    pub org_type: OrganizationType,
}

#[derive(clap::Args, Debug)]
pub struct MemberArgs {
    /// Organization id
    pub org: String,

    /// Employee username
    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct MembersArgs {
    /// Organization id
    pub org: String,
}

pub fn run(cmd: OrgCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OrgCommands::New(args) => run_new(args, global),
        OrgCommands::AddMember(args) => run_add_member(args, global),
        OrgCommands::RemoveMember(args) => run_remove_member(args, global),
        OrgCommands::Members(args) => run_members(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut service = open_service(global)?;
    let org = service
        .directory()
        .add_organization(&args.name, args.description.as_deref(), args.org_type)
        .map_err(service_error)?;

    match global.format {
        OutputFormat::Auto => {
            print_done("Created", "organization", &org.id, None);
            println!("   {}", style(&org.id).dim());
        }
        format => print_one(&org, format)?,
    }
    Ok(())
}

fn run_add_member(args: MemberArgs, global: &GlobalOpts) -> Result<()> {
    let mut service = open_service(global)?;
    service
        .directory()
        .add_member(&args.org, &args.username)
        .map_err(service_error)?;
    println!(
        "{} {} is responsible for {}",
        style("✓").green(),
        style(&args.username).yellow(),
        style(&args.org).cyan()
    );
    Ok(())
}

fn run_remove_member(args: MemberArgs, global: &GlobalOpts) -> Result<()> {
    let mut service = open_service(global)?;
    let removed = service
        .directory()
        .remove_member(&args.org, &args.username)
        .map_err(service_error)?;
    if removed {
        println!(
            "{} {} removed from {}",
            style("✓").green(),
            style(&args.username).yellow(),
            style(&args.org).cyan()
        );
    } else {
        println!("{} was not a member", args.username);
    }
    Ok(())
}

fn run_members(args: MembersArgs, global: &GlobalOpts) -> Result<()> {
    let mut service = open_service(global)?;
    let members = service
        .directory()
        .list_members(&args.org)
        .map_err(service_error)?;
    print_list(&members, global.format)
}
