//! agenticone - terminal front end for the AgenticOne chat engine.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chat_core::config::DEFAULT_MODEL;
use chat_core::{AgentId, ChatConfig, RagSources};
use chat_orchestrator::{ChatEngine, ChatEvent, SubmitOutcome};
use gemini_client::{GeminiClient, GeminiConfig};
use session_manager::{AuthService, FileSessionStore, SessionError, SessionMeta, SessionStore};
use upload_manager::{IncomingFile, UploadPipeline, UploadTimings};

#[derive(Parser, Debug)]
#[command(name = "agenticone", about = "Chat with the AgenticOne agent personas")]
struct Args {
    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY")]
    api_key: String,

    /// API base URL override.
    #[arg(long, env = "GEMINI_API_BASE")]
    api_base: Option<String>,

    /// Generation model.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Directory for persisted session state.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Display name for the guest identity.
    #[arg(long, default_value = "Guest")]
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(true))
        .init();

    let args = Args::parse();

    let data_dir = args.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agenticone")
    });
    let store: Arc<FileSessionStore> = Arc::new(FileSessionStore::new(&data_dir));

    let config = ChatConfig {
        model: args.model.clone(),
        ..ChatConfig::default()
    };
    let mut gemini_config = GeminiConfig::new(args.api_key.clone(), args.model.clone());
    if let Some(api_base) = &args.api_base {
        gemini_config = gemini_config.with_api_base(api_base.clone());
    }
    let client = Arc::new(GeminiClient::new(gemini_config));

    let (event_tx, event_rx) = mpsc::channel(64);
    let engine = Arc::new(ChatEngine::new(
        config,
        client,
        UploadPipeline::new(UploadTimings::default()),
        event_tx,
    ));

    spawn_event_printer(event_rx);

    // Identity wiring: the service notifies listeners synchronously; a
    // forwarder task hands changes to the async engine.
    let auth = AuthService::new(None);
    let (auth_tx, mut auth_rx) = mpsc::unbounded_channel();
    let _subscription = auth.subscribe(move |user| {
        let _ = auth_tx.send(user.cloned());
    });
    let engine_for_auth = Arc::clone(&engine);
    let store_for_auth = Arc::clone(&store);
    tokio::spawn(async move {
        while let Some(user) = auth_rx.recv().await {
            let signed_in = user.is_some();
            engine_for_auth.handle_auth_change(user).await;
            if signed_in {
                engine_for_auth.hydrate_from_store(&*store_for_auth).await;
            }
        }
    });

    let user = auth.sign_in_guest(&args.name);
    println!("Signed in as {} ({})", user.display_name, user.email);

    let mut meta = match store.load_meta(&user.email).await {
        Ok(meta) => meta,
        Err(SessionError::NotFound) => SessionMeta::default(),
        Err(err) => {
            tracing::warn!(error = %err, "session metadata load failed");
            SessionMeta::default()
        }
    };

    println!("Talking to: {}. Type /help for commands.", meta.selected_agent.profile().display_name);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(meta.selected_agent);
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.splitn(2, ' ');
            let name = parts.next().unwrap_or_default();
            let argument = parts.next().unwrap_or_default().trim();
            match name {
                "quit" | "exit" => break,
                "help" => print_help(),
                "agents" => print_agents(meta.selected_agent),
                "agent" => select_agent(&mut meta, argument),
                "sources" => toggle_source(&mut meta.rag_sources, argument),
                "attach" => attach_file(&engine, argument).await,
                "files" => print_files(&engine).await,
                "remove" => remove_file(&engine, argument).await,
                "history" => print_history(&engine).await,
                "usage" => print_usage(&engine).await,
                "signout" => {
                    auth.sign_out();
                    println!("Signed out; conversations and attachments cleared.");
                }
                other => println!("Unknown command: /{other}"),
            }
            continue;
        }

        let outcome = engine
            .submit(
                meta.selected_agent,
                &line,
                meta.rag_sources,
                CancellationToken::new(),
            )
            .await;
        if let SubmitOutcome::Busy = outcome {
            println!("A response is still in progress.");
        }
    }

    // Best-effort persistence on the way out.
    engine.persist_to_store(&*store).await;
    meta.updated_at = chrono::Utc::now();
    if let Err(err) = store.save_meta(&user.email, &meta).await {
        tracing::warn!(error = %err, "session metadata save failed");
    }

    Ok(())
}

fn spawn_event_printer(mut events: mpsc::Receiver<ChatEvent>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ChatEvent::Submitted { .. } => {
                    print!("assistant: ");
                    let _ = std::io::stdout().flush();
                }
                ChatEvent::Token { content } => {
                    print!("{content}");
                    let _ = std::io::stdout().flush();
                }
                ChatEvent::Complete { usage } => {
                    println!();
                    println!(
                        "[{} tokens in, {} tokens out]",
                        usage.input_tokens, usage.output_tokens
                    );
                }
                ChatEvent::Error { message } => {
                    println!();
                    println!("[turn failed: {message}]");
                }
            }
        }
    });
}

fn prompt(agent: AgentId) {
    print!("{}> ", agent.role_key());
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!("/agents            list personas");
    println!("/agent <role>      switch persona");
    println!("/sources [name]    show or toggle knowledge sources");
    println!("/attach <path>     attach a file");
    println!("/files             list attachments");
    println!("/remove <index>    remove an attachment");
    println!("/history           recent queries");
    println!("/usage             token usage");
    println!("/signout           clear the session");
    println!("/quit              exit");
}

fn print_agents(selected: AgentId) {
    for agent in AgentId::ALL {
        let profile = agent.profile();
        let marker = if agent == selected { "*" } else { " " };
        println!(
            "{marker} {:<20} {} - {}",
            agent.role_key(),
            profile.display_name,
            profile.description
        );
    }
}

fn select_agent(meta: &mut SessionMeta, argument: &str) {
    match AgentId::from_role_key(argument) {
        Some(agent) => {
            meta.selected_agent = agent;
            println!("Now talking to {}.", agent.profile().display_name);
        }
        None => println!("Unknown agent: {argument} (see /agents)"),
    }
}

fn toggle_source(sources: &mut RagSources, argument: &str) {
    match argument {
        "" => {
            let labels = sources.enabled_labels();
            if labels.is_empty() {
                println!("No knowledge sources enabled.");
            } else {
                println!("Enabled: {}", labels.join(", "));
            }
        }
        "standards" => sources.standards = !sources.standards,
        "internal" => sources.internal = !sources.internal,
        "sensors" => sources.sensors = !sources.sensors,
        "workorders" => sources.workorders = !sources.workorders,
        other => println!("Unknown source: {other}"),
    }
}

async fn attach_file(engine: &ChatEngine, argument: &str) {
    if argument.is_empty() {
        println!("Usage: /attach <path>");
        return;
    }
    let path = Path::new(argument);
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            println!("Cannot read {argument}: {err}");
            return;
        }
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| argument.to_string());
    let file = IncomingFile {
        mime_type: guess_mime(path).to_string(),
        name,
        bytes,
    };
    match engine.uploads().add_files(vec![file]).await {
        Ok(report) => {
            for skipped in &report.skipped {
                println!("Skipped {}: {}", skipped.name, skipped.reason);
            }
            if !report.accepted.is_empty() {
                println!("Attached; it will be included once ready.");
            }
        }
        Err(err) => println!("{err}"),
    }
}

async fn print_files(engine: &ChatEngine) {
    let entries = engine.uploads().snapshot().await;
    if entries.is_empty() {
        println!("No attachments.");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "{index}: {} ({}) {:?} {}%",
            entry.file.name,
            entry.file.mime_type,
            entry.status(),
            entry.progress()
        );
    }
}

async fn remove_file(engine: &ChatEngine, argument: &str) {
    match argument.parse::<usize>() {
        Ok(index) => match engine.uploads().remove_file(index).await {
            Ok(entry) => println!("Removed {}.", entry.file.name),
            Err(err) => println!("{err}"),
        },
        Err(_) => println!("Usage: /remove <index>"),
    }
}

async fn print_history(engine: &ChatEngine) {
    let entries = engine.history_entries().await;
    if entries.is_empty() {
        println!("No queries yet.");
        return;
    }
    for entry in entries {
        println!(
            "{} [{}] {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.agent_name,
            entry.query
        );
    }
}

async fn print_usage(engine: &ChatEngine) {
    let ledger = engine.ledger().await;
    println!(
        "{} / {} tokens used ({}%)",
        ledger.used(),
        ledger.limit(),
        ledger.percent_used()
    );
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "csv" => "text/csv",
        "txt" | "md" | "log" => "text/plain",
        _ => "application/octet-stream",
    }
}
