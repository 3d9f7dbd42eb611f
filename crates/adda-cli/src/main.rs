//! Adda engagement CLI
//!
//! Run with:
//! ```bash
//! ADDA_API_BASE_URL=https://api.adda.app/api ADDA_ACCESS_TOKEN=... cargo run -p adda-cli -- check post:42
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use std::sync::Arc;
use std::time::Duration;

use adda_client::HttpEngagementClient;
use adda_common::{
    try_init_tracing, try_init_tracing_with_config, AppError, AppResult, ClientConfig,
    ErrorResponse, TracingConfig,
};
use adda_core::{Comment, DomainError, EntityRef, ReactionCounts, ReactionKind};
use adda_engagement::{
    CommentThread, EngagementContext, ReactionControl, ReactionSummary, SaveOutcome, SaveToggle,
    StaticIdentity, SummaryView, ToggleOutcome,
};
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "adda", version, about = "React, comment and save on Adda posts and memes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show your reaction and the counts
    Check { entity: EntityRef },
    /// Set your reaction (like, love, laugh, angry, sad, fire)
    React { entity: EntityRef, kind: ReactionKind },
    /// Remove your reaction
    Unreact { entity: EntityRef },
    /// Toggle a like through the legacy like endpoint
    Like { entity: EntityRef },
    /// List who reacted
    Reactors { entity: EntityRef },
    /// List comments
    Comments { entity: EntityRef },
    /// Post a comment
    Comment { entity: EntityRef, body: String },
    /// Save to your collection
    Save { entity: EntityRef },
    /// Remove from your collection
    Unsave { entity: EntityRef },
    /// Poll the counts and print every change
    Watch {
        entity: EntityRef,
        /// Stop after this many seconds (runs until Ctrl-C otherwise)
        #[arg(long)]
        seconds: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(e) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {e}");
            }
            fail(&AppError::from(e));
        }
    };

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(cli.command, config).await {
        fail(&e);
    }
}

fn fail(err: &AppError) -> ! {
    error!(code = err.error_code(), error = %err, "Command failed");
    match serde_json::to_string(&ErrorResponse::from(err)) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{err}"),
    }
    std::process::exit(err.exit_code());
}

async fn run(command: Command, config: ClientConfig) -> AppResult<()> {
    info!(env = ?config.app.env, base_url = %config.api.base_url, "Configuration loaded");

    let identity = Arc::new(StaticIdentity::from_token(config.api.access_token.clone()));
    let client = HttpEngagementClient::new(&config.api, identity.clone())?;
    let ctx = EngagementContext::builder()
        .api(Arc::new(client))
        .identity(identity)
        .settings(config.engagement.clone())
        .build()?;

    match command {
        Command::Check { entity } => {
            let check = ctx.store().load(&entity).await?;
            println!("{entity}");
            println!("  your reaction: {}", describe(check.user_reaction));
            print_counts(&check.counts);
        }
        Command::React { entity, kind } => {
            let control = ReactionControl::mount(&ctx, entity).await;
            if control.view().active == Some(kind) {
                println!("Already reacted with {} {}", kind.emoji(), kind);
            } else {
                expect_applied(control.select(kind).await?)?;
                print_counts(&control.view().counts);
            }
        }
        Command::Unreact { entity } => {
            let control = ReactionControl::mount(&ctx, entity).await;
            if control.view().active.is_none() {
                println!("No reaction to remove");
            } else {
                expect_applied(control.press().await?)?;
                print_counts(&control.view().counts);
            }
        }
        Command::Like { entity } => {
            require_sign_in(&ctx)?;
            ctx.store().load(&entity).await?;
            expect_applied(ctx.store().toggle_legacy_like(&entity).await?)?;
            println!("  your reaction: {}", describe(ctx.store().current_reaction(&entity)));
            print_counts(&ctx.store().counts(&entity));
        }
        Command::Reactors { entity } => {
            let control = ReactionControl::mount(&ctx, entity).await;
            let reactors = control.open_reactors().await?;
            if reactors.is_empty() {
                println!("No reactions yet");
            }
            for reactor in reactors {
                println!(
                    "{} {}  {}",
                    reactor.reaction_kind.emoji(),
                    reactor.name,
                    reactor.reacted_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Comments { entity } => {
            let thread = CommentThread::new(&ctx, entity);
            for comment in thread.load().await? {
                print_comment(&comment);
            }
        }
        Command::Comment { entity, body } => {
            let thread = CommentThread::new(&ctx, entity);
            let created = thread.submit(&body).await?;
            print_comment(&created);
        }
        Command::Save { entity } => set_saved(&ctx, entity, true).await?,
        Command::Unsave { entity } => set_saved(&ctx, entity, false).await?,
        Command::Watch { entity, seconds } => {
            if seconds == Some(0) {
                return Err(AppError::invalid_input("--seconds must be greater than zero"));
            }
            watch(&ctx, entity, seconds).await?;
        }
    }

    Ok(())
}

async fn set_saved(ctx: &EngagementContext, entity: EntityRef, saved: bool) -> AppResult<()> {
    // the current flag is unknown here, so start from the opposite state
    let toggle = SaveToggle::new(ctx, entity, !saved);
    match toggle.toggle().await? {
        SaveOutcome::Saved => println!("Saved"),
        SaveOutcome::Unsaved => println!("Removed from saved"),
        SaveOutcome::SignInRequired => return Err(DomainError::AuthRequired.into()),
        SaveOutcome::Superseded => {}
    }
    Ok(())
}

async fn watch(ctx: &EngagementContext, entity: EntityRef, seconds: Option<u64>) -> AppResult<()> {
    let summary = ReactionSummary::mount(ctx, entity);
    let deadline = seconds.map(|s| tokio::time::Instant::now() + Duration::from_secs(s));
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let mut last: Option<Option<SummaryView>> = None;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(AppError::internal)?;
                break;
            }
            _ = ticker.tick() => {
                let view = summary.render();
                if last.as_ref() != Some(&view) {
                    println!("{}", render_line(view.as_ref()));
                    last = Some(view);
                }
                if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
                    break;
                }
            }
        }
    }

    summary.unmount();
    Ok(())
}

fn require_sign_in(ctx: &EngagementContext) -> AppResult<()> {
    if ctx.is_signed_in() {
        Ok(())
    } else {
        Err(DomainError::AuthRequired.into())
    }
}

fn expect_applied(outcome: ToggleOutcome) -> AppResult<()> {
    match outcome {
        ToggleOutcome::SignInRequired => Err(DomainError::AuthRequired.into()),
        ToggleOutcome::Applied { .. } | ToggleOutcome::Superseded => Ok(()),
    }
}

fn describe(reaction: Option<ReactionKind>) -> String {
    reaction.map_or_else(|| "none".to_string(), |kind| format!("{} {kind}", kind.emoji()))
}

fn print_counts(counts: &ReactionCounts) {
    for (kind, count) in counts.iter().filter(|(_, count)| *count > 0) {
        println!("  {} {:<6} {count}", kind.emoji(), kind.as_str());
    }
    println!("  total: {}", counts.total());
}

fn print_comment(comment: &Comment) {
    println!(
        "[{}] {}: {}",
        comment.created_at.format("%Y-%m-%d %H:%M"),
        comment.author.name,
        comment.body
    );
}

fn render_line(view: Option<&SummaryView>) -> String {
    match view {
        None => "(no reactions)".to_string(),
        Some(view) => {
            let badges: Vec<String> = view
                .badges
                .iter()
                .map(|badge| format!("{} {}", badge.emoji, badge.count))
                .collect();
            format!("{}  total {}", badges.join("  "), view.total)
        }
    }
}
