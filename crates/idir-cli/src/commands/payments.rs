use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use idir_cache::{PaymentStore, SortOrder, PAYMENTS_FILE};
use idir_data::{
    Delete, Insert, Payment, PaymentEntry, PaymentFilter, Query, Retrieve,
};

use crate::context::{Context, CACHE_CAPACITY};
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Payments {
    /// List payment rounds
    #[clap(name = "list")]
    List(ListRounds),
    /// Show a round and how many members have paid
    #[clap(name = "show")]
    Show(ShowRound),
    /// Open a new payment round
    #[clap(name = "add-round")]
    AddRound(AddRound),
    /// Record a member's contribution to a round
    #[clap(name = "add")]
    AddEntry(AddEntry),
    /// Remove a member's contribution from a round
    #[clap(name = "remove")]
    RemoveEntry(RemoveEntry),
    /// Members that have paid into a round
    #[clap(name = "paid")]
    Paid(PaidMembers),
    /// Active members that have not paid into a round
    #[clap(name = "unpaid")]
    Unpaid(UnpaidMembers),
    /// Delete a round and all its entries
    #[clap(name = "delete-round")]
    DeleteRound(DeleteRound),
    /// Refresh the offline round cache
    #[clap(name = "sync")]
    Sync(SyncRounds),
    /// Search the offline round cache
    #[clap(name = "search")]
    Search(SearchRounds),
}

impl Payments {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Payments::List(cmd) => cmd.run(ctx).await,
            Payments::Show(cmd) => cmd.run(ctx).await,
            Payments::AddRound(cmd) => cmd.run(ctx).await,
            Payments::AddEntry(cmd) => cmd.run(ctx).await,
            Payments::RemoveEntry(cmd) => cmd.run(ctx).await,
            Payments::Paid(cmd) => cmd.run(ctx).await,
            Payments::Unpaid(cmd) => cmd.run(ctx).await,
            Payments::DeleteRound(cmd) => cmd.run(ctx).await,
            Payments::Sync(cmd) => cmd.run(ctx).await,
            Payments::Search(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListRounds {
    #[clap(short, long)]
    pub number: Option<u32>,
}

impl ListRounds {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let filter = PaymentFilter {
            number: self.number,
        };
        let rounds: Vec<Payment> = ctx.db.query(&filter).await?;
        println!("{} rounds.", rounds.len());
        rounds.print_formatted(ctx.lang);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowRound {
    #[clap(short, long)]
    pub number: u32,
}

impl ShowRound {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let round: Payment = ctx.db.retrieve(self.number).await?;
        let paid = ctx.db.count_paid(round.number).await?;
        println!("Round:\t\t{}", round.number);
        println!("Opened:\t\t{}", round.created_at.format("%Y-%m-%d"));
        println!("Paid:\t\t{} members", paid);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddRound {
    #[clap(short, long)]
    pub number: u32,
}

impl AddRound {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let message = format!("Open payment round {}?", self.number);
        let confirm = Confirm::new(&message).with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let round = ctx
            .db
            .insert(Payment {
                number: self.number,
                created_at: chrono::Local::now().naive_local(),
            })
            .await?;
        println!("Round {} opened.", round.number);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddEntry {
    /// Member number, e.g. ED-0042
    #[clap(short, long)]
    pub member: String,
    /// Round number
    #[clap(short, long)]
    pub number: u32,
    /// Date the contribution was made
    #[clap(long)]
    pub paid_on: NaiveDate,
    #[clap(long, default_value = "")]
    pub place: String,
    #[clap(long, default_value = "cash")]
    pub method: String,
    #[clap(long, default_value = "")]
    pub receipt: String,
    #[clap(long, default_value = "")]
    pub remark: String,
}

impl AddEntry {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let entry = PaymentEntry {
            payment_number: self.number,
            member_id: self.member,
            paid_on: self.paid_on,
            place: self.place,
            method: self.method,
            receipt_no: self.receipt,
            remark: self.remark,
        };

        let message = format!(
            "Record payment of {} for round {}?",
            entry.member_id, entry.payment_number
        );
        let confirm = Confirm::new(&message).with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let entry = ctx.db.add_payment_entry(entry).await?;
        println!(
            "Recorded {} for round {}.",
            entry.member_id, entry.payment_number
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RemoveEntry {
    #[clap(short, long)]
    pub member: String,
    #[clap(short, long)]
    pub number: u32,
}

impl RemoveEntry {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let message = format!(
            "Remove payment of {} from round {}?",
            self.member, self.number
        );
        let confirm = Confirm::new(&message).with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        ctx.db.remove_payment_entry(&self.member, self.number).await?;
        println!("Entry removed.");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PaidMembers {
    #[clap(short, long)]
    pub number: u32,
}

impl PaidMembers {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let paid = ctx.db.paid_members(self.number).await?;
        println!("{} members paid into round {}.", paid.len(), self.number);
        paid.print_formatted(ctx.lang);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UnpaidMembers {
    #[clap(short, long)]
    pub number: u32,
}

impl UnpaidMembers {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let unpaid = ctx.db.unpaid_members(self.number).await?;
        println!(
            "{} active members have not paid into round {}.",
            unpaid.len(),
            self.number
        );
        unpaid.print_formatted(ctx.lang);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteRound {
    #[clap(short, long)]
    pub number: u32,
}

impl DeleteRound {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let round: Payment = ctx.db.retrieve(self.number).await?;
        let paid = ctx.db.count_paid(round.number).await?;
        println!("Round {} has {} entries.", round.number, paid);

        let confirm = Confirm::new("Delete round and all its entries?")
            .with_default(false);
        if !confirm.prompt()? {
            return Ok(());
        }

        ctx.db.delete(round).await?;
        println!("Round deleted.");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SyncRounds {}

impl SyncRounds {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let rounds: Vec<Payment> =
            ctx.db.query(&PaymentFilter::default()).await?;
        let mut store =
            PaymentStore::open(ctx.state_dir.join(PAYMENTS_FILE), CACHE_CAPACITY)?;
        store.set(rounds)?;
        println!("Cached {} rounds.", store.items().len());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SearchRounds {
    /// Digits matched against the round number
    pub query: String,
    #[clap(long, default_value = "asc")]
    pub order: String,
}

impl SearchRounds {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let mut store =
            PaymentStore::open(ctx.state_dir.join(PAYMENTS_FILE), CACHE_CAPACITY)?;
        if store.is_empty() {
            return Err(anyhow!(
                "The round cache is empty, run `idir payments sync` first."
            ));
        }

        store.search(&self.query);
        let order = match self.order.as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            other => return Err(anyhow!("unknown sort order: {}", other)),
        };
        store.sort(order);

        println!("{} matches.", store.items().len());
        store.items().to_vec().print_formatted(ctx.lang);
        Ok(())
    }
}
