use crate::app::App;
use alexi_core::persona::{CreatePersonaRequest, Persona, PersonaCategory, UpdatePersonaRequest};
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum PersonaAction {
    /// List all personas
    List,
    /// Show one persona in full
    Show { id: String },
    /// Create a custom persona
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Update fields of a persona
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a custom persona
    Delete { id: String },
    /// Make a persona the default
    SetDefault { id: String },
    /// Copy a persona into a new custom one
    Duplicate { id: String },
    /// Import personas from a share link
    Import { link: String },
    /// Import personas from an export file
    ImportFile { path: PathBuf },
    /// Export custom personas as JSON
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Upload the collection and print an import link
    Share,
}

pub async fn run(app: &App, action: PersonaAction) -> Result<()> {
    let personas = &app.personas;

    match action {
        PersonaAction::List => {
            let collection = personas.snapshot().await;
            for persona in &collection.personas {
                print_summary(persona);
            }
        }
        PersonaAction::Show { id } => {
            let persona = personas
                .get(&id)
                .await
                .with_context(|| format!("Persona '{}' not found", id))?;
            print_summary(&persona);
            if let Some(description) = &persona.description {
                println!("  {}", description.bright_black());
            }
            println!("  category: {}", persona.category);
            println!();
            println!("{}", persona.prompt);
        }
        PersonaAction::Create {
            name,
            prompt,
            description,
            category,
            color,
            icon,
        } => {
            let request = CreatePersonaRequest {
                name,
                prompt,
                description,
                category: category.as_deref().map(PersonaCategory::parse_lenient),
                color,
                icon,
            };
            let persona = personas.create(request).await?;
            println!("{} {}", "Created".green(), persona.id);
        }
        PersonaAction::Update {
            id,
            name,
            prompt,
            description,
            category,
            color,
            icon,
        } => {
            let request = UpdatePersonaRequest {
                name,
                prompt,
                description,
                category: category.as_deref().map(PersonaCategory::parse_lenient),
                color,
                icon,
            };
            let persona = personas.update(&id, request).await?;
            println!("{} {}", "Updated".green(), persona.name);
        }
        PersonaAction::Delete { id } => {
            personas.delete(&id).await?;
            println!("{} {}", "Deleted".green(), id);
        }
        PersonaAction::SetDefault { id } => {
            let persona = personas.set_default(&id).await?;
            println!("{} {}", "Default persona is now".green(), persona.name);
        }
        PersonaAction::Duplicate { id } => {
            let copy = personas.duplicate(&id).await?;
            println!("{} {} ({})", "Created".green(), copy.name, copy.id);
        }
        PersonaAction::Import { link } => {
            let report = personas.import_from_link(&app.link_resolver(), &link).await?;
            print_import(report.imported.len(), report.skipped);
        }
        PersonaAction::ImportFile { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let report = personas.import_bundle(&json).await?;
            print_import(report.imported.len(), report.skipped);
        }
        PersonaAction::Export { output } => {
            let bundle = personas.export_bundle().await;
            let json = serde_json::to_string_pretty(&bundle)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!(
                        "{} {} personas to {:?}",
                        "Exported".green(),
                        bundle.personas.len(),
                        path
                    );
                }
                None => println!("{}", json),
            }
        }
        PersonaAction::Share => match personas.share_link(&app.link_resolver()).await {
            Some(link) => println!("{}", link),
            None => anyhow::bail!("Could not create a share link"),
        },
    }

    Ok(())
}

fn print_summary(persona: &Persona) {
    let icon = persona.icon.as_deref().unwrap_or(" ");
    let mut line = format!("{} {} {}", icon, persona.name.bold(), persona.id.bright_black());
    if persona.is_default {
        line.push_str(&format!(" {}", "[default]".yellow()));
    }
    if persona.is_custom {
        line.push_str(&format!(" {}", "[custom]".cyan()));
    }
    println!("{}", line);
}

fn print_import(imported: usize, skipped: usize) {
    println!("{} {} personas", "Imported".green(), imported);
    if skipped > 0 {
        println!("{}", format!("Skipped {} invalid entries", skipped).yellow());
    }
}
