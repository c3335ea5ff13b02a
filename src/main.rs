use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use snack_chef::composer::QUICK_ACTIONS;
use snack_chef::visual::ChatVisual;
use snack_chef::{Config, DialogueOrchestrator, IngredientSet, RecipeCatalog};

const DEFAULT_BUDGET: f64 = 50.0;

const HELP: &str = "Comandos: /add <ingrediente>, /remove <ingrediente>, /budget <valor>, \
/quick <1|2>, /status, /quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the chat on stdout stays readable
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = Config::load();
    let catalog = Arc::new(RecipeCatalog::load_or_builtin(config.catalog.path.as_deref()));

    let mut ingredients = IngredientSet::new();
    let mut budget = DEFAULT_BUDGET;
    let orchestrator = DialogueOrchestrator::new(&config, catalog, &ingredients)?;
    let mut events = orchestrator.subscribe();

    for turn in orchestrator.session().turns() {
        println!("{}", ChatVisual::render_turn(turn));
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let message = match parse_command(line) {
            Some(Command::Quit) => break,
            Some(Command::Help) => {
                println!("{HELP}");
                continue;
            }
            Some(Command::Status) => {
                println!(
                    "{}",
                    ChatVisual::render_status(orchestrator.step(), &ingredients, budget)
                );
                continue;
            }
            Some(Command::Add(item)) => {
                if !ingredients.insert(item) {
                    println!("{}", ChatVisual::render_error("Ingrediente vazio ou repetido."));
                }
                continue;
            }
            Some(Command::Remove(item)) => {
                ingredients.remove(item);
                continue;
            }
            Some(Command::Budget(raw)) => {
                match raw.replace(',', ".").parse::<f64>() {
                    Ok(value) => budget = value,
                    Err(_) => println!("{}", ChatVisual::render_error("Valor inválido.")),
                }
                continue;
            }
            Some(Command::Quick(idx)) => match QUICK_ACTIONS.get(idx) {
                Some((_, prompt)) => prompt.to_string(),
                None => {
                    println!("{}", ChatVisual::render_error("Atalho inexistente."));
                    continue;
                }
            },
            None if line.is_empty() => continue,
            None => line.to_string(),
        };

        println!("{}", ChatVisual::render_turn(&snack_chef::ConversationTurn::user(&message)));
        match orchestrator
            .handle_message(&message, &ingredients, budget)
            .await
        {
            Ok(turn) => println!("{}", ChatVisual::render_turn(&turn)),
            Err(e) => {
                tracing::warn!("Message failed: {}", e);
                println!("{}", ChatVisual::render_error(&e.user_message()));
            }
        }
        while let Ok(event) = events.try_recv() {
            println!("{}", ChatVisual::render_event(&event));
        }
    }

    orchestrator.shutdown();
    eprintln!("Até a próxima!");
    Ok(())
}

enum Command<'a> {
    Quit,
    Help,
    Status,
    Add(&'a str),
    Remove(&'a str),
    Budget(&'a str),
    Quick(usize),
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let rest = line.strip_prefix('/')?;
    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    let arg = arg.trim();
    match name {
        "quit" | "sair" => Some(Command::Quit),
        "help" | "ajuda" => Some(Command::Help),
        "status" => Some(Command::Status),
        "add" => Some(Command::Add(arg)),
        "remove" => Some(Command::Remove(arg)),
        "budget" => Some(Command::Budget(arg)),
        "quick" => arg
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .map(Command::Quick),
        _ => None,
    }
}
