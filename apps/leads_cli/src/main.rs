use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use client_core::{
    config::load_settings, HttpLeadRepository, InMemoryLeadRepository, LeadForm, LeadRepository,
    LeadsController, LeadsEvent, LeadsSnapshot,
};
use shared::{
    domain::{LeadId, OrganisationId},
    protocol::generated_at_format,
};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "leads", about = "List, create, edit and delete sales leads")]
struct Cli {
    /// Base URL of the leads API, e.g. https://crm.example.com/api
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    token: Option<String>,
    /// Work against an in-process sample collection instead of the API.
    #[arg(long, global = true)]
    demo: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Create(LeadFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: LeadFields,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
struct LeadFields {
    #[arg(long)]
    organisation_id: Option<i64>,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    profile_url: Option<String>,
    #[arg(long)]
    followers: Option<u64>,
    #[arg(long)]
    connections: Option<u64>,
    #[arg(long)]
    education: Option<String>,
    #[arg(long)]
    personal_message: Option<String>,
    #[arg(long)]
    message_length: Option<u64>,
    #[arg(long, value_parser = parse_generated_at)]
    generated_at: Option<NaiveDateTime>,
    #[arg(long)]
    total_leads: Option<u64>,
}

impl LeadFields {
    fn apply_to(self, form: &mut LeadForm) {
        if let Some(v) = self.organisation_id {
            form.organisation_id = OrganisationId(v);
        }
        if let Some(v) = self.full_name {
            form.full_name = v;
        }
        if let Some(v) = self.position {
            form.position = v;
        }
        if let Some(v) = self.company {
            form.company = v;
        }
        if let Some(v) = self.location {
            form.location = v;
        }
        if let Some(v) = self.profile_url {
            form.profile_url = v;
        }
        if let Some(v) = self.followers {
            form.followers = v;
        }
        if let Some(v) = self.connections {
            form.connections = v;
        }
        if let Some(v) = self.education {
            form.education = v;
        }
        if let Some(v) = self.personal_message {
            form.personal_message = v;
        }
        if let Some(v) = self.message_length {
            form.message_length = v;
        }
        if let Some(v) = self.generated_at {
            form.generated_at = v;
        }
        if let Some(v) = self.total_leads {
            form.total_leads = v;
        }
    }
}

fn parse_generated_at(raw: &str) -> Result<NaiveDateTime, String> {
    generated_at_format::parse(raw)
        .ok_or_else(|| format!("expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }
    if let Some(token) = cli.token {
        settings.api_token = Some(token);
    }

    let repository: Arc<dyn LeadRepository> = if cli.demo {
        info!("using in-process sample leads");
        Arc::new(InMemoryLeadRepository::with_sample_leads())
    } else {
        Arc::new(HttpLeadRepository::from_settings(&settings)?)
    };
    let controller = LeadsController::new_with_organisation(
        repository,
        OrganisationId(settings.organisation_id.unwrap_or(0)),
    );

    let watcher = spawn_state_logger(&controller);
    run(&controller, cli.command).await?;
    watcher.abort();

    let snapshot = controller.snapshot().await;
    print!("{}", render::render_table(&snapshot.leads));
    if let Some(message) = snapshot.status.error_message() {
        println!("error: {message}");
        std::process::exit(1);
    }
    Ok(())
}

fn spawn_state_logger(controller: &LeadsController) -> JoinHandle<()> {
    let mut events = controller.subscribe_events();
    tokio::spawn(async move {
        while let Some(snapshot) = next_state(&mut events).await {
            debug!(
                status = ?snapshot.status,
                leads = snapshot.leads.len(),
                modal_open = snapshot.edit_modal.is_open(),
                pending_delete = ?snapshot.confirm_dialog.pending_delete(),
                "leads state changed"
            );
        }
    })
}

/// Next published state, skipping over anything dropped while lagging.
async fn next_state(events: &mut broadcast::Receiver<LeadsEvent>) -> Option<LeadsSnapshot> {
    loop {
        match events.recv().await {
            Ok(LeadsEvent::StateChanged(snapshot)) => return Some(snapshot),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "state logger lagged behind");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

async fn run(controller: &LeadsController, command: Command) -> Result<()> {
    controller.mount().await;

    match command {
        Command::List => {}
        Command::Create(fields) => {
            controller.open_create().await;
            controller.edit_form(|form| fields.apply_to(form)).await;
            controller.submit().await;
        }
        Command::Update { id, fields } => {
            let snapshot = controller.snapshot().await;
            let lead = snapshot.leads.into_iter().find(|lead| lead.id == LeadId(id));
            let Some(lead) = lead else {
                if snapshot.status.error_message().is_some() {
                    return Ok(());
                }
                bail!("lead {id} is not in the current list");
            };
            controller.open_edit(lead).await;
            controller.edit_form(|form| fields.apply_to(form)).await;
            controller.submit().await;
        }
        Command::Delete { id, yes } => {
            let id = LeadId(id);
            controller.remove(id).await;
            let label = controller
                .snapshot()
                .await
                .leads
                .iter()
                .find(|lead| lead.id == id)
                .map(|lead| lead.full_name.clone())
                .unwrap_or_else(|| format!("#{id}"));
            if yes || ask_confirmation(&label)? {
                controller.confirm().await;
            } else {
                controller.cancel().await;
                info!(lead_id = %id, "delete cancelled");
            }
        }
    }
    Ok(())
}

fn ask_confirmation(label: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "Delete lead {label}? [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
