//! `notekeeper` - CLI for notekeeper
//!
//! This binary provides one-shot note commands, an interactive editing
//! session and a local notes server.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;

use notekeeper::backend::{self, NoteBackend};
use notekeeper::cli::{
    AddCommand, Cli, Command, ConfigCommand, DeleteCommand, EditCommand, ServeCommand,
};
use notekeeper::config::BackendKind;
use notekeeper::{
    init_logging, AutoAnswer, Config, DeleteOutcome, NoteEditor, NoteId, Renderer, Shell,
    TerminalPrompt, Viewer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration; only the config commands run without a valid one
    let loaded = Config::load_from(cli.config.clone());
    let kind = loaded
        .as_ref()
        .map(|config| cli.backend_kind(config))
        .unwrap_or_default();

    // Execute the command
    match cli.command {
        Command::List(list_cmd) => handle_list(&loaded?, kind, list_cmd.json).await,
        Command::Show(show_cmd) => handle_show(&loaded?, kind, &show_cmd.id).await,
        Command::Add(add_cmd) => handle_add(&loaded?, kind, add_cmd).await,
        Command::Edit(edit_cmd) => handle_edit(&loaded?, kind, edit_cmd).await,
        Command::Delete(delete_cmd) => handle_delete(&loaded?, kind, delete_cmd).await,
        Command::Shell => handle_shell(&loaded?, kind).await,
        Command::Serve(serve_cmd) => handle_serve(&loaded?, serve_cmd).await,
        Command::Config(config_cmd) => handle_config(loaded, config_cmd),
    }
}

/// Turn an action failure into the message a user should see.
fn alert(err: &notekeeper::Error) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

async fn open_editor(
    config: &Config,
    kind: BackendKind,
) -> anyhow::Result<NoteEditor<Box<dyn NoteBackend>>> {
    let backend = backend::from_config(config, kind)?;
    let editor = NoteEditor::open(backend).await;
    if let notekeeper::editor::LoadStatus::Degraded { reason } = editor.state().load_status() {
        eprintln!("! Could not load notes: {reason}");
    }
    Ok(editor)
}

async fn handle_list(config: &Config, kind: BackendKind, json: bool) -> anyhow::Result<()> {
    let viewer = Viewer::new(backend::from_config(config, kind)?);
    if json {
        let notes = viewer.load().await;
        println!("{}", serde_json::to_string_pretty(&notes)?);
    } else {
        print!("{}", viewer.render(&Renderer::new(&config.display)).await);
    }
    Ok(())
}

async fn handle_show(config: &Config, kind: BackendKind, id: &NoteId) -> anyhow::Result<()> {
    let backend = backend::from_config(config, kind)?;
    let notes = backend.list().await.map_err(|e| alert(&e))?;
    let note = notes
        .iter()
        .find(|n| &n.id == id)
        .ok_or_else(|| alert(&notekeeper::Error::not_found(id)))?;
    print!("{}", Renderer::new(&config.display).note(note));
    Ok(())
}

async fn handle_add(config: &Config, kind: BackendKind, cmd: AddCommand) -> anyhow::Result<()> {
    let mut editor = open_editor(config, kind).await?;
    editor.new_note();
    editor.set_title(cmd.title);
    editor.set_content(cmd.content);
    editor.save().await.map_err(|e| alert(&e))?;
    println!("Note created.");
    Ok(())
}

async fn handle_edit(config: &Config, kind: BackendKind, cmd: EditCommand) -> anyhow::Result<()> {
    let mut editor = open_editor(config, kind).await?;
    editor.select(&cmd.id).map_err(|e| alert(&e))?;
    if let Some(title) = cmd.title {
        editor.set_title(title);
    }
    if let Some(content) = cmd.content {
        editor.set_content(content);
    }
    editor.save().await.map_err(|e| alert(&e))?;
    println!("Note {} updated.", cmd.id);
    Ok(())
}

async fn handle_delete(
    config: &Config,
    kind: BackendKind,
    cmd: DeleteCommand,
) -> anyhow::Result<()> {
    let mut editor = open_editor(config, kind).await?;
    editor.select(&cmd.id).map_err(|e| alert(&e))?;

    let outcome = if cmd.yes {
        editor.delete(&mut AutoAnswer(true)).await
    } else {
        let mut prompt =
            TerminalPrompt::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
        editor.delete(&mut prompt).await
    };

    match outcome.map_err(|e| alert(&e))? {
        DeleteOutcome::Deleted(id) => println!("Note {id} deleted."),
        DeleteOutcome::Cancelled => println!("Delete cancelled."),
    }
    Ok(())
}

async fn handle_shell(config: &Config, kind: BackendKind) -> anyhow::Result<()> {
    let editor = open_editor(config, kind).await?;
    let terminal = TerminalPrompt::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    let mut shell = Shell::new(editor, terminal, Renderer::new(&config.display));
    shell.run().await?;
    Ok(())
}

async fn handle_serve(config: &Config, cmd: ServeCommand) -> anyhow::Result<()> {
    let bind = cmd.bind.unwrap_or_else(|| config.server.bind.clone());
    let db = match cmd.db.or_else(|| config.server.db_path.clone()) {
        Some(path) => notekeeper_server::Database::open(&path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?,
        None => notekeeper_server::Database::in_memory(),
    };

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    println!("Serving notes on http://{}/notes", listener.local_addr()?);
    println!("Press Ctrl-C to stop.");

    notekeeper_server::serve_until(listener, db, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    })
    .await?;
    Ok(())
}

fn handle_config(loaded: notekeeper::Result<Config>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = &loaded?;
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Backend]");
                println!("  Kind:               {}", config.backend.kind);
                println!();
                println!("[Local]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Storage key:        {}", config.local.storage_key);
                println!("  Max value bytes:    {}", config.local.max_value_bytes);
                println!();
                println!("[Remote]");
                println!("  Base URL:           {}", config.remote.base_url);
                println!("  Refetch delay (ms): {}", config.remote.refetch_delay_ms);
                println!();
                println!("[Display]");
                println!("  Preview chars:      {}", config.display.preview_chars);
                println!("  Date format:        {}", config.display.date_format);
                println!();
                println!("[Server]");
                println!("  Bind:               {}", config.server.bind);
                match &config.server.db_path {
                    Some(path) => println!("  Database file:      {}", path.display()),
                    None => println!("  Database file:      (in memory)"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
