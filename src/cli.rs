use clap::{ArgGroup, Parser};

/// Command-line interface for the Groq shell.
///
/// At least one action flag is required; `--json` only modifies how a
/// prompt is answered and is not an action on its own.
#[derive(Debug, Parser)]
#[command(
    name = "groqsh",
    version,
    about = "Groq AI shell interface",
    group(
        ArgGroup::new("action")
            .required(true)
            .multiple(true)
            .args(["prompt", "model", "change", "info", "list", "interactive"])
    )
)]
pub struct Args {
    /// Prompt to send to the model
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Force JSON output
    #[arg(short, long)]
    pub json: bool,

    /// Select a model interactively
    #[arg(short, long)]
    pub model: bool,

    /// Change the selected model
    #[arg(short, long)]
    pub change: bool,

    /// Show info for the selected model
    #[arg(short, long)]
    pub info: bool,

    /// List available models
    #[arg(short, long)]
    pub list: bool,

    /// Enter interactive mode
    #[arg(short = 'I', long)]
    pub interactive: bool,
}
