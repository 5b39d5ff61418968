// ABOUTME: Document editing agent - opens a text or markdown file and lets a
// ABOUTME: model read, search, and edit it through the margin tool set.

mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use margin::prelude::*;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use session::Session;

#[derive(Debug, Parser)]
#[command(name = "doc-agent", about = "Edit a document with an AI agent")]
struct Args {
    /// File to edit
    file: PathBuf,

    /// Run a single prompt and exit instead of starting an interactive session
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model provider: openai, anthropic, or gemini
    #[arg(long, env = "MARGIN_PROVIDER", default_value = "anthropic")]
    provider: ProviderId,

    /// Model name (defaults to the provider's standard model)
    #[arg(long, env = "MARGIN_MODEL")]
    model: Option<String>,

    /// Maximum model calls per prompt
    #[arg(long, default_value_t = 8)]
    max_iterations: usize,

    /// Save the edited document when finished
    #[arg(short, long)]
    write: bool,

    /// Check the API key and exit
    #[arg(long)]
    check_key: bool,
}

fn print_status(label: &str) {
    println!("  [{}]", label);
}

/// Cancel the token on Ctrl-C until the returned handle is aborted.
fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

async fn run_prompt(
    session: &mut Session,
    client: &std::sync::Arc<dyn LlmClient>,
    config: &ProviderConfig,
    args: &Args,
    prompt: &str,
) -> Result<()> {
    let token = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(token.clone());
    let result = session
        .ask(
            client.clone(),
            &config.model,
            prompt,
            args.max_iterations,
            token,
            print_status,
        )
        .await;
    watcher.abort();

    match result {
        Ok(outcome) => {
            println!("\n{}\n", outcome.text);
            if outcome.hit_iteration_limit() {
                tracing::warn!(iterations = outcome.iterations, "prompt stopped early");
            }
        }
        Err(e) => match e.downcast_ref::<AgentError>() {
            Some(AgentError::Aborted) => println!("\n[aborted]\n"),
            _ => return Err(e),
        },
    }
    Ok(())
}

async fn interactive(
    session: &mut Session,
    client: &std::sync::Arc<dyn LlmClient>,
    config: &ProviderConfig,
    args: &Args,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("Doc Agent - {} ({})", args.file.display(), config.model);
    println!("Commands: :show, :undo, :save, quit\n");

    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(_) => break,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        let _ = rl.add_history_entry(line);

        match line {
            ":show" => println!("{}\n", session.text()),
            ":undo" => {
                if session.undo() {
                    println!("[reverted last edit]\n");
                } else {
                    println!("[nothing to undo]\n");
                }
            }
            ":save" => {
                session.save()?;
                println!("[saved]\n");
            }
            prompt => {
                if let Err(e) = run_prompt(session, client, config, args, prompt).await {
                    eprintln!("Error: {:#}\n", e);
                }
            }
        }
    }

    if session.is_dirty() {
        println!("Unsaved changes discarded. Use :save or --write to keep them.");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let mut config = ProviderConfig::from_env_for(args.provider)?;
    if let Some(model) = &args.model {
        config = config.model(model);
    }
    let client = create_provider(&config);

    if args.check_key {
        let valid = client.validate_key().await?;
        println!(
            "{} key {}",
            config.provider,
            if valid { "accepted" } else { "rejected" }
        );
        return Ok(());
    }

    let mut session = Session::open(&args.file)?;

    match &args.prompt {
        Some(prompt) => run_prompt(&mut session, &client, &config, &args, prompt).await?,
        None => interactive(&mut session, &client, &config, &args).await?,
    }

    if args.write && session.is_dirty() {
        session.save()?;
        println!("Saved {}", args.file.display());
    }
    Ok(())
}
