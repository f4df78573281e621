//! `tdesk employee` command - Employee registration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_service, print_done, service_error};
use crate::cli::output::print_one;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum EmployeeCommands {
    /// Register an employee
    New(NewArgs),

    /// Show an employee by username
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Unique username
    pub username: String,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    pub username: String,
}

pub fn run(cmd: EmployeeCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EmployeeCommands::New(args) => run_new(args, global),
        EmployeeCommands::Show(args) => run_show(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut service = open_service(global)?;
    let employee = service
        .directory()
        .add_employee(
            &args.username,
            args.first_name.as_deref(),
            args.last_name.as_deref(),
        )
        .map_err(service_error)?;

    match global.format {
        OutputFormat::Auto => {
            print_done("Registered", "employee", &employee.id, None);
            println!("   {}", style(&employee.username).yellow());
        }
        format => print_one(&employee, format)?,
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut service = open_service(global)?;
    let employee = service
        .directory()
        .employee_by_username(&args.username)
        .map_err(service_error)?;
    print_one(&employee, global.format)
}
