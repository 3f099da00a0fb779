use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use idir_cache::{
    MemberSortField, MemberStore, SortOrder, ADDED_DATA_FILE, OLD_MEMBERS_FILE,
};
use idir_data::{
    Delete, Member, MemberFilter, MemberStatus, Query, Retrieve, Update,
};

use crate::context::{Context, CACHE_CAPACITY};
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Members {
    /// Show a member and their ledger entries
    #[clap(name = "show")]
    Show(ShowMember),
    /// List members
    #[clap(name = "list")]
    List(ListMembers),
    /// Add a member
    #[clap(name = "add")]
    Add(AddMember),
    /// Update a member
    #[clap(name = "set")]
    Update(UpdateMember),
    /// Change a member's status
    #[clap(name = "set-status")]
    SetStatus(SetMemberStatus),
    /// Delete a member
    #[clap(name = "delete")]
    Delete(DeleteMember),
    /// Refresh the offline roster cache
    #[clap(name = "sync")]
    Sync(SyncMembers),
    /// Search the offline roster cache
    #[clap(name = "search")]
    Search(SearchMembers),
}

impl Members {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Members::Show(cmd) => cmd.run(ctx).await,
            Members::List(cmd) => cmd.run(ctx).await,
            Members::Add(cmd) => cmd.run(ctx).await,
            Members::Update(cmd) => cmd.run(ctx).await,
            Members::SetStatus(cmd) => cmd.run(ctx).await,
            Members::Delete(cmd) => cmd.run(ctx).await,
            Members::Sync(cmd) => cmd.run(ctx).await,
            Members::Search(cmd) => cmd.run(ctx).await,
        }
    }
}

/// Remember a freshly added member in the added-data cache.
fn remember_added(ctx: &Context, member: &Member) -> Result<()> {
    let mut store =
        MemberStore::open(ctx.state_dir.join(ADDED_DATA_FILE), CACHE_CAPACITY)?;
    let mut items = store.items().to_vec();
    items.push(member.clone());
    store.set(items)?;
    Ok(())
}

#[derive(Args, Debug)]
pub struct ShowMember {
    #[clap(short, long)]
    pub id: String,
}

impl ShowMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let member: Member = ctx.db.retrieve(self.id).await?;
        println!();
        member.print_formatted(ctx.lang);
        println!();

        let entries = member.get_payments(&ctx.db).await?;
        if entries.is_empty() {
            println!("No ledger entries.");
        } else {
            println!("{} ledger entries.", entries.len());
            entries.print_formatted(ctx.lang);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListMembers {
    #[clap(short, long)]
    pub id: Option<String>,
    #[clap(short, long)]
    pub name: Option<String>,
    #[clap(short, long)]
    pub email: Option<String>,
    #[clap(short, long)]
    pub phone: Option<String>,
    #[clap(short, long)]
    pub status: Option<String>,
}

impl ListMembers {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let status = match self.status {
            Some(s) => Some(s.parse::<MemberStatus>()?),
            None => None,
        };
        let filter = MemberFilter {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            status,
        };

        let members: Vec<Member> = ctx.db.query(&filter).await?;
        println!("{} members.", members.len());
        members.print_formatted(ctx.lang);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddMember {
    /// Member number, e.g. ED-0042
    #[clap(long)]
    pub id: String,
    #[clap(long)]
    pub first_name: String,
    #[clap(long)]
    pub last_name: String,
    #[clap(long, default_value = "")]
    pub first_name_am: String,
    #[clap(long, default_value = "")]
    pub last_name_am: String,
    #[clap(long)]
    pub date_of_birth: Option<NaiveDate>,
    #[clap(long, default_value = "")]
    pub email: String,
    #[clap(long, default_value = "")]
    pub phone: String,
    #[clap(long, default_value = "")]
    pub city: String,
    #[clap(long, default_value = "")]
    pub street: String,
    /// Path to a member photo to upload
    #[clap(long)]
    pub photo: Option<PathBuf>,
    #[clap(long, default_value = "active")]
    pub status: String,
}

impl AddMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let status: MemberStatus = self.status.parse()?;

        let member = Member {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            first_name_am: self.first_name_am,
            last_name_am: self.last_name_am,
            date_of_birth: self.date_of_birth,
            email: self.email,
            phone: self.phone,
            city: self.city,
            street: self.street,
            photo_url: None,
            status,
            registered_at: chrono::Local::now().naive_local(),
        };

        println!();
        member.print_formatted(ctx.lang);
        println!();

        let confirm = Confirm::new("Add member?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        // The photo is only uploaded once the add is confirmed
        let photo = match &self.photo {
            Some(path) => {
                let data = tokio::fs::read(path).await?;
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| anyhow!("invalid photo path"))?;
                Some((name.to_string(), data))
            }
            None => None,
        };

        let member = ctx
            .add_member(
                member,
                photo.as_ref().map(|(name, data)| (name.as_str(), data.as_slice())),
            )
            .await?;
        remember_added(ctx, &member)?;
        println!("Member {} added.", member.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateMember {
    #[clap(long)]
    pub id: String,
    #[clap(long)]
    pub first_name: Option<String>,
    #[clap(long)]
    pub last_name: Option<String>,
    #[clap(long)]
    pub first_name_am: Option<String>,
    #[clap(long)]
    pub last_name_am: Option<String>,
    #[clap(long)]
    pub date_of_birth: Option<NaiveDate>,
    #[clap(long)]
    pub email: Option<String>,
    #[clap(long)]
    pub phone: Option<String>,
    #[clap(long)]
    pub city: Option<String>,
    #[clap(long)]
    pub street: Option<String>,
}

impl UpdateMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let member: Member = ctx.db.retrieve(self.id).await?;
        let mut update = member.clone();

        if let Some(first_name) = self.first_name {
            update.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            update.last_name = last_name;
        }
        if let Some(first_name_am) = self.first_name_am {
            update.first_name_am = first_name_am;
        }
        if let Some(last_name_am) = self.last_name_am {
            update.last_name_am = last_name_am;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            update.date_of_birth = Some(date_of_birth);
        }
        if let Some(email) = self.email {
            update.email = email;
        }
        if let Some(phone) = self.phone {
            update.phone = phone;
        }
        if let Some(city) = self.city {
            update.city = city;
        }
        if let Some(street) = self.street {
            update.street = street;
        }

        println!();
        (member, update.clone()).print_formatted(ctx.lang);
        println!();
        let confirm = Confirm::new("Update member?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        ctx.db.update(update).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SetMemberStatus {
    #[clap(long)]
    pub id: String,
    #[clap(long)]
    pub status: String,
}

impl SetMemberStatus {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let status: MemberStatus = self.status.parse()?;
        let member: Member = ctx.db.retrieve(self.id).await?;
        println!("{}: {} -> {}", member.id, member.status, status);

        let confirm = Confirm::new("Change status?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let mut update = member;
        update.status = status;
        ctx.db.update(update).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteMember {
    #[clap(short, long)]
    pub id: String,
}

impl DeleteMember {
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        let member: Member = ctx.db.retrieve(self.id.clone()).await?;
        println!();
        member.print_formatted(ctx.lang);
        println!();
        let confirm = Confirm::new("Delete member from database?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        if let Some(photo) = &member.photo_url {
            ctx.media.delete(photo).await?;
        }
        ctx.db.delete(member).await?;
        println!("Member deleted, ledger entries removed.");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SyncMembers {
    /// Page size used while fetching the roster
    #[clap(long, default_value_t = 100)]
    pub page_size: u32,
}

impl SyncMembers {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let members = ctx.db.fetch_all_members(self.page_size).await?;
        let mut store =
            MemberStore::open(ctx.state_dir.join(OLD_MEMBERS_FILE), CACHE_CAPACITY)?;
        store.set(members)?;
        println!("Cached {} members.", store.items().len());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SearchMembers {
    /// Substring matched against number, names, email, phone and address
    pub query: String,
    /// Sort by: id, name or registered
    #[clap(long)]
    pub sort: Option<String>,
    #[clap(long, default_value = "asc")]
    pub order: String,
}

impl SearchMembers {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let mut store =
            MemberStore::open(ctx.state_dir.join(OLD_MEMBERS_FILE), CACHE_CAPACITY)?;
        if store.is_empty() {
            return Err(anyhow!(
                "The roster cache is empty, run `idir members sync` first."
            ));
        }

        store.search(&self.query);
        if let Some(sort) = &self.sort {
            let field = match sort.as_str() {
                "id" => MemberSortField::Id,
                "name" => MemberSortField::Name,
                "registered" => MemberSortField::RegisteredAt,
                other => return Err(anyhow!("unknown sort field: {}", other)),
            };
            let order = match self.order.as_str() {
                "asc" => SortOrder::Asc,
                "desc" => SortOrder::Desc,
                other => return Err(anyhow!("unknown sort order: {}", other)),
            };
            store.sort(field, order);
        }

        println!("{} matches.", store.items().len());
        store.items().to_vec().print_formatted(ctx.lang);
        Ok(())
    }
}
