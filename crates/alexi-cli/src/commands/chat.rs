use crate::app::App;
use alexi_application::ChatService;
use alexi_interaction::{RequestObserver, RequestProgress};
use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub async fn run(app: &App, persona: Option<String>) -> Result<()> {
    let service = ChatService::new(Arc::clone(&app.personas), app.completion_client()?);
    let active = service.start(persona.as_deref()).await?;

    println!("{}", format!("=== Alexi: {} ===", active.name).bright_magenta().bold());
    println!(
        "{}",
        "Commands: /new, /persona <id>, /quit. Ctrl-C cancels a pending reply.".bright_black()
    );
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">>".green());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/new" => {
                service.new_conversation().await;
                println!("{}", "Started a new conversation".bright_black());
            }
            _ if input.starts_with("/persona") => {
                let id = input.trim_start_matches("/persona").trim();
                match service.switch_persona(id).await {
                    Ok(persona) => println!("{}", format!("Now talking to {}", persona.name).bright_black()),
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            _ => send_with_progress(&service, input).await,
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

/// Sends one message, printing retry progress and honouring Ctrl-C.
async fn send_with_progress(service: &ChatService, text: &str) {
    let token = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let observer = RequestObserver::new()
        .with_progress(tx)
        .with_cancellation(token.clone());

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                RequestProgress::RetryScheduled { .. } => {
                    eprintln!("{}", event.to_string().yellow());
                }
                RequestProgress::AttemptStarted { attempt, .. } if attempt > 1 => {
                    eprintln!("{}", event.to_string().bright_black());
                }
                _ => {}
            }
        }
    });

    let result = {
        let send = service.send(text, &observer);
        tokio::pin!(send);
        tokio::select! {
            result = &mut send => result,
            _ = tokio::signal::ctrl_c() => {
                token.cancel();
                send.await
            }
        }
    };
    drop(observer);
    let _ = printer.await;

    match result {
        Ok(outcome) => {
            let name = service
                .active_persona()
                .await
                .map(|p| p.name)
                .unwrap_or_default();
            println!("{}", format!("[{}]", name).bright_magenta());
            for line in outcome.text.lines() {
                println!("{}", line.bright_blue());
            }
            println!();
        }
        Err(e) if e.is_cancelled() => println!("{}", "Cancelled".yellow()),
        Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
    }
}
