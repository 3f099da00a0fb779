use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use idir_cache::{MemberStore, ADDED_DATA_FILE};
use idir_data::{Insert, Member, MemberStatus};

use crate::context::{Context, CACHE_CAPACITY};
use crate::formatting::PrintFormatted;

/// The public registration form. New members start in the `new`
/// status and are activated by the board once their dues are settled.
#[derive(Args, Debug)]
pub struct RegisterMember {
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
}

impl RegisterMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
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
            status: MemberStatus::New,
            registered_at: chrono::Local::now().naive_local(),
        };

        let member = ctx.db.insert(member).await?;

        let mut store =
            MemberStore::open(ctx.state_dir.join(ADDED_DATA_FILE), CACHE_CAPACITY)?;
        let mut items = store.items().to_vec();
        items.push(member.clone());
        store.set(items)?;

        println!("Registration received.");
        member.print_formatted(ctx.lang);
        Ok(())
    }
}
