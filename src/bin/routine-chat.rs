//! Interactive routine builder.
//!
//! Browse the catalog, shortlist products, and ask the advisor for a routine
//! that uses them. Follow-up questions continue the same conversation.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a running relay
//! routine-chat --relay-url http://127.0.0.1:8787/ --catalog products.json
//!
//! # Relay in-process (needs OPENAI_API_KEY)
//! routine-chat --catalog https://example.com/products.json --web-search
//! ```

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use routine_builder::catalog::format_category;
use routine_builder::chat::{
    ChatArgs, ChatCommand, ChatConfig, PlainTextRenderer, Renderer, help_text, parse_command,
};
use routine_builder::manager::{
    Outcome, STATUS_CATALOG_UNAVAILABLE, STATUS_GENERATING, STATUS_THINKING,
};
use routine_builder::relay::RelayConfig;
use routine_builder::session::DisplayMessage;
use routine_builder::{
    Catalog, CatalogFilter, ChatRelay, FileStore, OpenAi, Relay, RelayClient, Session,
    SessionManager, TracingLogger, Unconfigured,
};

type Manager = SessionManager<Box<dyn ChatRelay>, FileStore>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("routine-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    let catalog = match load_catalog(&config).await {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::warn!(error = %err, "catalog unavailable");
            renderer.print_error(STATUS_CATALOG_UNAVAILABLE);
            Catalog::default()
        }
    };

    let relay = connect_relay(&config)?;
    let store = FileStore::new(config.store_path.clone());
    let session = Session::with_system_prompt(catalog, config.system_prompt.clone());
    let mut manager = SessionManager::with_session(session, relay, store);
    manager.set_web_search(config.web_search);

    let mut filter = CatalogFilter::default();
    let mut rl = DefaultEditor::new()?;
    let mut shown = 0;

    println!("Routine Builder ({} products)", manager.session().catalog().products().len());
    println!("Type /help for commands, /quit to exit\n");
    print_messages(&mut renderer, manager.session().chat_view(), &mut shown);

    loop {
        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                let Some(cmd) = parse_command(line) else {
                    if manager.session().routine_active() {
                        renderer.print_status(STATUS_THINKING);
                    }
                    let outcome = manager.send_follow_up(line).await;
                    print_messages(&mut renderer, manager.session().chat_view(), &mut shown);
                    report(&mut renderer, &outcome);
                    continue;
                };

                match cmd {
                    ChatCommand::Quit => {
                        println!("Goodbye!");
                        break;
                    }
                    ChatCommand::Help => {
                        for line in help_text().lines() {
                            println!("    {}", line);
                        }
                    }
                    ChatCommand::Products => {
                        let cards: Vec<_> = manager.filter_catalog(&filter).collect();
                        renderer.print_products(&cards);
                    }
                    ChatCommand::Categories => {
                        for category in manager.session().catalog().categories() {
                            renderer.print_info(&format!(
                                "  {category:<16} {}",
                                format_category(&category)
                            ));
                        }
                    }
                    ChatCommand::Category(category) => {
                        filter = filter.with_category(category.as_deref());
                        let cards: Vec<_> = manager.filter_catalog(&filter).collect();
                        renderer.print_products(&cards);
                    }
                    ChatCommand::Search(term) => {
                        filter = filter.with_search(term.as_deref());
                        let cards: Vec<_> = manager.filter_catalog(&filter).collect();
                        renderer.print_products(&cards);
                    }
                    ChatCommand::Toggle(id) => {
                        let outcome = manager.toggle_selection(id);
                        if outcome.is_success() {
                            let verb = if manager.session().selection().contains(id) {
                                "Added"
                            } else {
                                "Removed"
                            };
                            renderer.print_info(&format!("{verb} #{id}."));
                        }
                        report(&mut renderer, &outcome);
                    }
                    ChatCommand::Remove(id) => {
                        let outcome = manager.remove_selection(id);
                        report(&mut renderer, &outcome);
                        print_selected(&mut renderer, &manager);
                    }
                    ChatCommand::ClearSelection => {
                        let outcome = manager.clear_selection();
                        report(&mut renderer, &outcome);
                        renderer.print_info("Shortlist cleared.");
                    }
                    ChatCommand::Selected => print_selected(&mut renderer, &manager),
                    ChatCommand::Routine => {
                        if !manager.session().selection().is_empty() {
                            renderer.print_status(STATUS_GENERATING);
                        }
                        let outcome = manager.generate_routine().await;
                        if outcome.render {
                            shown = 1;
                        }
                        print_messages(&mut renderer, manager.session().chat_view(), &mut shown);
                        report(&mut renderer, &outcome);
                    }
                    ChatCommand::WebSearch(enabled) => {
                        manager.set_web_search(enabled);
                        let state = if enabled { "on" } else { "off" };
                        renderer.print_info(&format!("Web search {state}."));
                    }
                    ChatCommand::History => {
                        let mut from = 0;
                        print_messages(&mut renderer, manager.session().chat_view(), &mut from);
                    }
                    ChatCommand::Invalid(message) => renderer.print_error(&message),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}

async fn load_catalog(config: &ChatConfig) -> routine_builder::Result<Catalog> {
    let provider = config.catalog.provider()?;
    Catalog::load(provider.as_ref()).await
}

fn connect_relay(config: &ChatConfig) -> routine_builder::Result<Box<dyn ChatRelay>> {
    if let Some(url) = &config.relay_url {
        return Ok(Box::new(RelayClient::new(url)?));
    }
    match OpenAi::new(None) {
        Ok(upstream) => {
            let relay = Relay::new(upstream, RelayConfig::new())
                .with_logger(std::sync::Arc::new(TracingLogger));
            Ok(Box::new(relay))
        }
        Err(err) => {
            tracing::debug!(error = %err, "no relay configured");
            Ok(Box::new(Unconfigured))
        }
    }
}

fn print_messages(renderer: &mut dyn Renderer, view: &[DisplayMessage], shown: &mut usize) {
    for message in view.iter().skip(*shown) {
        renderer.print_message(message);
    }
    *shown = view.len();
}

fn print_selected(renderer: &mut dyn Renderer, manager: &Manager) {
    let chips: Vec<_> = manager.session().selected_chips().collect();
    renderer.print_selected(&chips);
}

fn report(renderer: &mut dyn Renderer, outcome: &Outcome) {
    match (&outcome.error, outcome.status.text()) {
        (Some(_), Some(status)) => renderer.print_error(status),
        (None, Some(status)) => renderer.print_status(status),
        _ => {}
    }
}
