pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod logging;
pub mod message;
pub mod render;
pub mod repl;
pub mod state;

use anyhow::{Context, Result, bail};
use clap::Parser;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use cli::Args;
use config::Config;
use message::Message;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let args = Args::parse();
    let cfg = Config::from_env();
    info!(
        base_url = %cfg.base_url,
        max_tokens = cfg.max_tokens,
        "loaded runtime configuration"
    );

    if cfg.api_key.is_none() {
        println!("Error: GROQ_API_KEY is not set in your environment.");
        println!("Please set your Groq API key using:");
        println!("export GROQ_API_KEY='your-api-key-here'");
        bail!("GROQ_API_KEY is not set");
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")?;

    let model = resolve_model(&client, &cfg, &args).await?;
    debug!(model = %model, "resolved active model");

    if args.info {
        catalog::print_model_info(&client, &cfg, &model).await;
        return Ok(());
    }

    if args.list {
        catalog::print_model_list(&client, &cfg).await;
        return Ok(());
    }

    if args.interactive {
        return repl::run(&client, &cfg, &model).await;
    }

    if let Some(prompt) = args.prompt {
        run_prompt(&client, &cfg, &model, &prompt, args.json).await;
    }

    Ok(())
}

/// Decide which model to talk to: an explicit `--model`/`--change`
/// runs the chooser, otherwise the persisted selection is reused; with
/// no selection on disk the chooser runs anyway.
async fn resolve_model(client: &Client, cfg: &Config, args: &Args) -> Result<String> {
    let selected = if args.model {
        Some(catalog::select_model(client, cfg).await?)
    } else if args.change {
        println!("Changing the model...");
        Some(catalog::select_model(client, cfg).await?)
    } else {
        state::load_selected_model()
    };

    match selected {
        Some(model) => Ok(model),
        None => catalog::select_model(client, cfg).await,
    }
}

/// One-shot prompt: stream the completion, join the fragments, render
/// the whole text once. An API failure is reported and nothing else is
/// printed.
async fn run_prompt(client: &Client, cfg: &Config, model: &str, prompt: &str, force_json: bool) {
    let mentions_json = prompt.to_lowercase().contains("json");
    let json_mode = force_json || mentions_json;

    let mut prompt = prompt.to_string();
    if json_mode && !mentions_json {
        prompt.push_str(" Please provide the response in JSON format.");
    }

    let messages = vec![Message::user(prompt)];
    let options = api::ChatOptions {
        json_mode,
        max_tokens: Some(cfg.max_tokens),
    };

    match api::chat_stream(client, cfg, model, &messages, &options).await {
        Ok(completion) => println!("{}", render::render_markdown(completion.trim())),
        Err(err) => eprintln!("Error in Groq API call: {err:#}"),
    }
}
