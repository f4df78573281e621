//! `tdesk bid` command - Bids, decisions and reviews

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::tender::PageArgs;
use crate::cli::helpers::{acting_user, open_service, print_done, service_error};
use crate::cli::output::{print_list, print_one};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{AuthorType, Bid, BidPatch, BidStatus, NewBid, Verdict};

#[derive(Subcommand, Debug)]
pub enum BidCommands {
    /// Submit a bid on a tender
    New(NewArgs),

    /// List bids you authored
    My(PageArgs),

    /// List the bids on a tender that you may see
    List(ListArgs),

    /// Show a bid
    Show(IdArgs),

    /// Print a bid's status
    Status(IdArgs),

    /// Change a bid's status
    SetStatus(SetStatusArgs),

    /// Change a bid's fields; empty values are ignored
    Edit(EditArgs),

    /// Restore the fields of an earlier version as a new version
    Rollback(RollbackArgs),

    /// Approve or reject a bid on your organization's tender
    Decision(DecisionArgs),

    /// List the verdicts recorded on a bid
    Decisions(IdArgs),

    /// Leave a review on a bid
    Feedback(FeedbackArgs),

    /// Read the reviews left on a bidder's bids
    Reviews(ReviewsArgs),

    /// List earlier versions
    History(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Bid name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: String,

    /// Tender id
    #[arg(long, short = 't')]
    pub tender: String,

    /// Organization or User
    #[arg(long, default_value = "Organization")]
    pub author_type: AuthorType,

    /// Author username (defaults to the acting user)
    #[arg(long, short = 'a')]
    pub author: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Tender id
    pub tender: String,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Bid id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetStatusArgs {
    /// Bid id
    pub id: String,

    /// Created, Published, Canceled, Approved or Rejected
    pub status: BidStatus,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Bid id
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub status: Option<BidStatus>,
}

#[derive(clap::Args, Debug)]
pub struct RollbackArgs {
    /// Bid id
    pub id: String,

    /// Version to restore
    #[arg(value_name = "VERSION")]
    pub target: i64,
}

#[derive(clap::Args, Debug)]
pub struct DecisionArgs {
    /// Bid id
    pub id: String,

    /// Approved or Rejected
    pub decision: Verdict,
}

#[derive(clap::Args, Debug)]
pub struct FeedbackArgs {
    /// Bid id
    pub id: String,

    /// Review text
    pub review: String,
}

#[derive(clap::Args, Debug)]
pub struct ReviewsArgs {
    /// Tender id
    pub tender: String,

    /// Bidder whose reviews to read
    #[arg(long, short = 'r')]
    pub requester: String,

    #[command(flatten)]
    pub page: PageArgs,
}

pub fn run(cmd: BidCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BidCommands::New(args) => run_new(args, global),
        BidCommands::My(args) => run_my(args, global),
        BidCommands::List(args) => run_list(args, global),
        BidCommands::Show(args) => run_show(args, global),
        BidCommands::Status(args) => run_status(args, global),
        BidCommands::SetStatus(args) => run_set_status(args, global),
        BidCommands::Edit(args) => run_edit(args, global),
        BidCommands::Rollback(args) => run_rollback(args, global),
        BidCommands::Decision(args) => run_decision(args, global),
        BidCommands::Decisions(args) => run_decisions(args, global),
        BidCommands::Feedback(args) => run_feedback(args, global),
        BidCommands::Reviews(args) => run_reviews(args, global),
        BidCommands::History(args) => run_history(args, global),
    }
}

fn print_written(action: &str, bid: &Bid, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Auto => {
            print_done(action, "bid", &bid.id, Some(bid.version));
            Ok(())
        }
        format => print_one(bid, format),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let author = match args.author.as_deref() {
        Some(author) => author,
        None => acting_user(global)?,
    };
    let mut service = open_service(global)?;
    let author_id = service
        .directory()
        .employee_by_username(author)
        .map_err(service_error)?
        .id;
    let bid = service
        .create_bid(NewBid {
            name: args.name,
            description: args.description,
            tender_id: args.tender,
            author_type: args.author_type,
            author_id,
        })
        .map_err(service_error)?;
    print_written("Created", &bid, global)
}

fn run_my(args: PageArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let page = service.page(args.limit, args.offset).map_err(service_error)?;
    let user = global.user.as_deref().unwrap_or_default();
    let bids = service.list_my_bids(page, user).map_err(service_error)?;
    print_list(&bids, global.format)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let service = open_service(global)?;
    let page = service
        .page(args.page.limit, args.page.offset)
        .map_err(service_error)?;
    let bids = service
        .list_bids_for_tender(&args.tender, user, page)
        .map_err(service_error)?;
    print_list(&bids, global.format)
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let service = open_service(global)?;
    let bid = service.get_bid(&args.id, user).map_err(service_error)?;
    print_one(&bid, global.format)
}

fn run_status(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let service = open_service(global)?;
    let status = service
        .get_bid_status(&args.id, user)
        .map_err(service_error)?;
    println!("{}", status);
    Ok(())
}

fn run_set_status(args: SetStatusArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let mut service = open_service(global)?;
    let bid = service
        .update_bid_status(&args.id, args.status, user)
        .map_err(service_error)?;
    print_written("Updated", &bid, global)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let mut service = open_service(global)?;
    let patch = BidPatch {
        name: args.name,
        description: args.description,
        status: args.status,
    };
    let bid = service
        .edit_bid(&args.id, &patch, user)
        .map_err(service_error)?;
    print_written("Edited", &bid, global)
}

fn run_rollback(args: RollbackArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let mut service = open_service(global)?;
    let bid = service
        .rollback_bid(&args.id, args.target, user)
        .map_err(service_error)?;
    print_written("Rolled back", &bid, global)
}

fn run_decision(args: DecisionArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let mut service = open_service(global)?;
    let bid = service
        .submit_decision(&args.id, args.decision, user)
        .map_err(service_error)?;
    match global.format {
        OutputFormat::Auto => {
            print_done(&args.decision.to_string(), "bid", &bid.id, None);
            Ok(())
        }
        format => print_one(&bid, format),
    }
}

fn run_decisions(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let service = open_service(global)?;
    let decisions = service
        .bid_decisions(&args.id, user)
        .map_err(service_error)?;
    print_list(&decisions, global.format)
}

fn run_feedback(args: FeedbackArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let mut service = open_service(global)?;
    let bid = service
        .add_feedback(&args.id, &args.review, user)
        .map_err(service_error)?;
    match global.format {
        OutputFormat::Auto => {
            print_done("Reviewed", "bid", &bid.id, None);
            Ok(())
        }
        format => print_one(&bid, format),
    }
}

fn run_reviews(args: ReviewsArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let service = open_service(global)?;
    let page = service
        .page(args.page.limit, args.page.offset)
        .map_err(service_error)?;
    let reviews = service
        .get_feedback(&args.tender, user, &args.requester, page)
        .map_err(service_error)?;
    print_list(&reviews, global.format)
}

fn run_history(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let user = acting_user(global)?;
    let service = open_service(global)?;
    let versions = service.bid_history(&args.id, user).map_err(service_error)?;
    print_list(&versions, global.format)
}
