use crate::app::App;
use alexi_interaction::supported_models;
use anyhow::Result;
use colored::Colorize;

pub async fn run(app: &App) -> Result<()> {
    let client = app.completion_client()?;
    let models = client.list_models().await?;

    for model in models {
        let marker = if model == client.model() { "*" } else { " " };
        match supported_models::describe(&model) {
            Some(description) => println!("{} {} {}", marker, model.bold(), description.bright_black()),
            None => println!("{} {}", marker, model),
        }
    }
    Ok(())
}
