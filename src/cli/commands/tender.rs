//! `tdesk tender` command - Tender management

use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::{acting_user, open_service, print_done, service_error};
use crate::cli::output::{print_list, print_one};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{NewTender, ServiceType, Tender, TenderPatch, TenderStatus};

#[derive(Subcommand, Debug)]
pub enum TenderCommands {
    /// Create a tender for an organization you belong to
    New(NewArgs),

    /// List published tenders
    List(ListArgs),

    /// List tenders of your organizations
    My(PageArgs),

    /// Show a tender
    Show(IdArgs),

    /// Print a tender's status
    Status(IdArgs),

    /// Change a tender's status
    SetStatus(SetStatusArgs),

    /// Change a tender's fields; empty values are ignored
    Edit(EditArgs),

    /// Restore the fields of an earlier version as a new version
    Rollback(RollbackArgs),

    /// List earlier versions
    History(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Tender name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: String,

    /// Construction, Delivery or Manufacture
    #[arg(long, short = 's')]
    pub service_type: ServiceType,

    /// Owning organization id
    #[arg(long, short = 'o')]
    pub org: String,
}

#[derive(clap::Args, Debug)]
pub struct PageArgs {
    /// Page size
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Rows to skip
    #[arg(long)]
    pub offset: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Only these service types (repeatable or comma separated)
    #[arg(long, short = 's', value_delimiter = ',')]
    pub service_type: Vec<ServiceType>,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Tender id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetStatusArgs {
    /// Tender id
    pub id: String,

    /// Created, Published or Closed
    pub status: TenderStatus,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Tender id
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub service_type: Option<ServiceType>,

    #[arg(long)]
    pub status: Option<TenderStatus>,
}

#[derive(clap::Args, Debug)]
pub struct RollbackArgs {
    /// Tender id
    pub id: String,

    /// Version to restore
    #[arg(value_name = "VERSION")]
    pub target: i64,
}

pub fn run(cmd: TenderCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TenderCommands::New(args) => run_new(args, global),
        TenderCommands::List(args) => run_list(args, global),
        TenderCommands::My(args) => run_my(args, global),
        TenderCommands::Show(args) => run_show(args, global),
        TenderCommands::Status(args) => run_status(args, global),
        TenderCommands::SetStatus(args) => run_set_status(args, global),
        TenderCommands::Edit(args) => run_edit(args, global),
        TenderCommands::Rollback(args) => run_rollback(args, global),
        TenderCommands::History(args) => run_history(args, global),
    }
}

fn print_written(action: &str, tender: &Tender, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Auto => {
            print_done(action, "tender", &tender.id, Some(tender.version));
            Ok(())
        }
        format => print_one(tender, format),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let mut service = open_service(global)?;
    let tender = service
        .create_tender(
            NewTender {
                name: args.name,
                description: args.description,
                service_type: args.service_type,
                organization_id: args.org,
            },
            user,
        )
        .map_err(service_error)?;
    print_written("Created", &tender, global)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let page = service
        .page(args.page.limit, args.page.offset)
        .map_err(service_error)?;
    let tenders = service
        .list_published(page, &args.service_type)
        .map_err(service_error)?;
    print_list(&tenders, global.format)
}

fn run_my(args: PageArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let page = service.page(args.limit, args.offset).map_err(service_error)?;
    let user = global.user.as_deref().unwrap_or_default();
    let tenders = service.list_my_tenders(page, user).map_err(service_error)?;
    print_list(&tenders, global.format)
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let service = open_service(global)?;
    let tender = service.get_tender(&args.id, user).map_err(service_error)?;
    print_one(&tender, global.format)
}

fn run_status(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let service = open_service(global)?;
    let status = service
        .get_tender_status(&args.id, user)
        .map_err(service_error)?;
    println!("{}", status);
    Ok(())
}

fn run_set_status(args: SetStatusArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let mut service = open_service(global)?;
    let tender = service
        .update_tender_status(&args.id, args.status, user)
        .map_err(service_error)?;
    print_written("Updated", &tender, global)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let mut service = open_service(global)?;
    let patch = TenderPatch {
        name: args.name,
        description: args.description,
        service_type: args.service_type,
        status: args.status,
    };
    let tender = service
        .edit_tender(&args.id, &patch, user)
        .map_err(service_error)?;
    print_written("Edited", &tender, global)
}

fn run_rollback(args: RollbackArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let mut service = open_service(global)?;
    let tender = service
        .rollback_tender(&args.id, args.target, user)
        .map_err(service_error)?;
    print_written("Rolled back", &tender, global)
}

fn run_history(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let service = open_service(global)?;
    let versions = service
        .tender_history(&args.id, user)
        .map_err(service_error)?;
    print_list(&versions, global.format)
}
