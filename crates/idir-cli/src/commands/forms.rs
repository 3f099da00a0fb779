use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use inquire::Confirm;

use idir_data::{Delete, FormDoc, FormFilter, Insert, Query, Retrieve};
use idir_storage::MediaKind;

use crate::context::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Forms {
    /// List downloadable forms
    #[clap(name = "list")]
    List(ListForms),
    /// Upload a form document
    #[clap(name = "add")]
    Add(AddForm),
    /// Delete a form and its file
    #[clap(name = "delete")]
    Delete(DeleteForm),
}

impl Forms {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Forms::List(cmd) => cmd.run(ctx).await,
            Forms::Add(cmd) => cmd.run(ctx).await,
            Forms::Delete(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListForms {
    #[clap(short, long)]
    pub name: Option<String>,
}

impl ListForms {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let forms: Vec<FormDoc> = ctx
            .db
            .query(&FormFilter {
                id: None,
                name: self.name,
            })
            .await?;
        println!("{} forms.", forms.len());
        forms.print_formatted(ctx.lang);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddForm {
    #[clap(long)]
    pub name: String,
    #[clap(long, default_value = "")]
    pub name_am: String,
    #[clap(long, default_value = "")]
    pub description: String,
    /// Path to the document to upload
    #[clap(long)]
    pub file: PathBuf,
}

impl AddForm {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let message = format!("Upload form \"{}\"?", self.name);
        let confirm = Confirm::new(&message).with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let data = tokio::fs::read(&self.file).await?;
        let filename = self
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("invalid file path"))?;
        let file_url = ctx.media.store(MediaKind::Forms, filename, &data).await?;

        let form = ctx
            .db
            .insert(FormDoc {
                name: self.name,
                name_am: self.name_am,
                description: self.description,
                file_url,
                created_at: chrono::Local::now().naive_local(),
                ..FormDoc::default()
            })
            .await?;
        println!("Form {} added.", form.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteForm {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteForm {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let form: FormDoc = ctx.db.retrieve(self.id).await?;
        println!("{}: {}", form.id, form.name);

        let confirm = Confirm::new("Delete form and its file?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        ctx.media.delete(&form.file_url).await?;
        ctx.db.delete(form).await?;
        println!("Form deleted.");
        Ok(())
    }
}
