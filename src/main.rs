use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use meetink::config::ClientConfig;
use meetink::format::{compact_time, relative_time};
use meetink::identity::AnonymousIdentity;
use meetink::models::{Category, CategoryFilter, Confession, Gender};
use meetink::notify::{Toast, ToastKind, ToastQueue};
use meetink::{
    CommentComposer, ConfessionComposer, ConfessionFeed, ConfessionsApi, ControllerContext, EarlyAccessForm,
    GraphqlClient, LikeController, Outcome, QueryCache, Seed,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Anonymous campus confessions from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List confessions, newest data from the server
    List {
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
    },
    /// Show one confession with its comments
    Show { id: String },
    /// Post an anonymous confession
    Confess {
        text: String,
        #[arg(long, default_value = "General")]
        category: Category,
        #[arg(long, default_value = "male")]
        gender: Gender,
    },
    /// Comment on a confession
    Comment {
        id: String,
        text: String,
        #[arg(long, default_value = "male")]
        gender: Gender,
    },
    /// Like a confession
    Like { id: String },
    /// Join the early access waitlist
    Waitlist { name: String, email: String },
    /// Check the backend
    Health,
    /// Print the identity a seed maps to
    Whoami {
        #[arg(allow_negative_numbers = true)]
        seed: i64,
        #[arg(long, default_value = "male")]
        gender: Gender,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env automatically only in debug builds.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = ClientConfig::from_env();
    let toasts = ToastQueue::new();
    let api = ConfessionsApi::new(Arc::new(GraphqlClient::with_config(&cfg)));
    let ctx = ControllerContext::new(api.clone(), QueryCache::new(), Arc::new(toasts.clone()));

    let result = run(cli.command, &api, &ctx).await;
    for toast in toasts.drain() {
        print_toast(&toast);
    }
    result
}

async fn run(command: Command, api: &ConfessionsApi, ctx: &ControllerContext) -> Result<()> {
    match command {
        Command::List { category } => {
            let feed = ConfessionFeed::new(api.clone(), ctx.cache.clone());
            let confessions = feed.load(category).await?;
            info!(count = confessions.len(), filter = category.as_str(), "loaded confessions");
            for c in &confessions {
                print_confession(c);
            }
        }
        Command::Show { id } => {
            let confession = api.confession(&id).await?.ok_or_else(|| anyhow!("confession {id} not found"))?;
            print_confession(&confession);
            let now = Utc::now();
            for cm in &confession.comments {
                let who = cm.identity();
                println!("    {} ({}): {}", who.name, compact_time(cm.created_at, now), cm.content);
            }
        }
        Command::Confess { text, category, gender } => {
            let composer = ConfessionComposer::new(ctx.clone());
            composer.set_content(text);
            composer.set_category(category);
            composer.set_gender(gender);
            if let Outcome::Confirmed(c) = report(composer.submit().await)? {
                print_confession(&c);
            }
        }
        Command::Comment { id, text, gender } => {
            let composer = CommentComposer::new(id, Vec::new(), ctx.clone());
            composer.set_draft(text);
            composer.set_gender(gender);
            if let Outcome::Confirmed(c) = report(composer.submit().await)? {
                println!("{} commented: {}", c.anonymous_name, c.content);
            }
        }
        Command::Like { id } => {
            let current = api.confession(&id).await?.ok_or_else(|| anyhow!("confession {id} not found"))?;
            let button = LikeController::new(id, current.likes, ctx.clone());
            if let Outcome::Confirmed(likes) = report(button.like().await)? {
                println!("♥ {likes}");
            }
        }
        Command::Waitlist { name, email } => {
            let form = EarlyAccessForm::new(ctx.clone());
            form.set_name(name);
            form.set_email(email);
            report(form.submit().await)?;
        }
        Command::Health => {
            let h = api.health().await?;
            println!("{} at {}", h.status, h.time);
        }
        Command::Whoami { seed, gender } => {
            let identity = AnonymousIdentity::from_seed(Seed::from_wire(seed));
            println!("{}", identity.name);
            println!("{}", identity.avatar_url(gender));
        }
    }
    Ok(())
}

/// Turns local validation failures and rollbacks into a failing exit.
fn report<T>(outcome: Outcome<T>) -> Result<Outcome<T>> {
    match outcome {
        Outcome::Invalid(v) => Err(v.into()),
        Outcome::RolledBack(msg) => Err(anyhow!(msg)),
        other => Ok(other),
    }
}

fn print_confession(c: &Confession) {
    let who = c.identity();
    let tag = c.category().map(|cat| format!("{} {cat} ", cat.emoji())).unwrap_or_default();
    println!("[{}] {tag}{} · {} · ♥ {} · 💬 {}", c.id, who.name, relative_time(c.created_at, Utc::now()), c.likes, c.comments_count());
    println!("  {}", c.content);
}

fn print_toast(toast: &Toast) {
    match toast.kind {
        ToastKind::Success => eprintln!("✓ {}: {}", toast.title, toast.description),
        ToastKind::Error => eprintln!("✗ {}: {}", toast.title, toast.description),
    }
}
