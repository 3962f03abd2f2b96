use anyhow::{Context, Result, bail};
use reqwest::Client;
use std::io::{self, Write};
use tracing::info;

use crate::api;
use crate::config::Config;
use crate::state;

#[derive(Debug, PartialEq, Eq)]
enum ChoiceError {
    NotANumber,
    OutOfRange,
}

fn parse_choice(raw: &str, count: usize) -> Result<usize, ChoiceError> {
    let number: usize = raw.trim().parse().map_err(|_| ChoiceError::NotANumber)?;
    if (1..=count).contains(&number) {
        Ok(number - 1)
    } else {
        Err(ChoiceError::OutOfRange)
    }
}

/// Show the numbered catalog and prompt until the user picks a valid
/// entry. The choice is persisted so later invocations reuse it.
pub async fn select_model(client: &Client, cfg: &Config) -> Result<String> {
    let models = api::list_models(client, cfg).await?;
    if models.is_empty() {
        bail!("No models available to select from.");
    }

    println!("Available Groq models:");
    for (index, model) in models.iter().enumerate() {
        println!("{}. {}", index + 1, model.id);
    }

    loop {
        print!("Select a model number: ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read stdin")?;
        if read == 0 {
            bail!("No model selected.");
        }

        match parse_choice(&input, models.len()) {
            Ok(index) => {
                let model_id = models[index].id.clone();
                state::save_selected_model(&model_id)?;
                info!(model = %model_id, "model selected");
                return Ok(model_id);
            }
            Err(ChoiceError::NotANumber) => println!("Invalid input. Please enter a number."),
            Err(ChoiceError::OutOfRange) => println!("Invalid choice. Please try again."),
        }
    }
}

/// Print the catalog one id per line. An API failure is reported and
/// produces an empty listing rather than aborting.
pub async fn print_model_list(client: &Client, cfg: &Config) {
    match api::list_models(client, cfg).await {
        Ok(models) => {
            println!("Available Groq models:");
            for model in models {
                println!("- {}", model.id);
            }
        }
        Err(err) => println!("Error listing models: {err:#}"),
    }
}

/// Pretty-print the metadata document for the selected model.
pub async fn print_model_info(client: &Client, cfg: &Config, model_id: &str) {
    match api::retrieve_model(client, cfg, model_id).await {
        Ok(info) => {
            println!("Model Info for {}:", model_id);
            match serde_json::to_string_pretty(&info) {
                Ok(rendered) => println!("{rendered}"),
                Err(_) => println!("{info}"),
            }
        }
        Err(err) => println!("Error retrieving model info: {err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{ChoiceError, parse_choice};

    #[test]
    fn accepts_choices_within_range() {
        assert_eq!(parse_choice("1", 3), Ok(0));
        assert_eq!(parse_choice(" 3 ", 3), Ok(2));
    }

    #[test]
    fn rejects_out_of_range_choices() {
        assert_eq!(parse_choice("0", 3), Err(ChoiceError::OutOfRange));
        assert_eq!(parse_choice("4", 3), Err(ChoiceError::OutOfRange));
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert_eq!(parse_choice("two", 3), Err(ChoiceError::NotANumber));
        assert_eq!(parse_choice("", 3), Err(ChoiceError::NotANumber));
    }
}
