//! Small CLI harness wiring a two-level dispatch tree so the core can
//! be exercised from a terminal instead of from tests alone.

use std::any::{Any, TypeId};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dispatch_core::{
    config::DispatchConfig, filter_fn, listener_fn, logging, Event, EventFilter, HandlerKey,
    ListenerOutcome, Node,
};

#[derive(Parser, Debug)]
#[command(about = "Drives a sample event dispatch tree for manual inspection")]
struct Args {
    /// Optional YAML config file (see DispatchConfig)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player id to route the chat message to
    #[arg(long, default_value = "player-1")]
    player: String,

    /// Message body
    #[arg(long, default_value = "hello")]
    message: String,
}

#[derive(Debug)]
struct ChatMessage {
    player_id: String,
    body: String,
}

impl Event for ChatMessage {
    fn class(&self) -> TypeId {
        TypeId::of::<ChatMessage>()
    }
    fn class_name(&self) -> &'static str {
        "ChatMessage"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn chat_filter() -> Arc<dyn EventFilter> {
    filter_fn(TypeId::of::<ChatMessage>(), "ChatMessage", |event| {
        event
            .as_any()
            .downcast_ref::<ChatMessage>()
            .map(|e| HandlerKey::from(e.player_id.clone()))
            .unwrap_or(HandlerKey::None)
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => DispatchConfig::from_yaml_file(path)?,
        None => DispatchConfig::default(),
    };
    logging::init(config.level_filter());

    let root = Node::new(config.root_name.clone(), chat_filter());
    root.add_listener::<ChatMessage>(listener_fn(|msg: &ChatMessage| {
        println!("[broadcast] {}: {}", msg.player_id, msg.body);
        ListenerOutcome::Success
    }))
    .unwrap();

    let per_player = Node::new(format!("handler:{}", args.player), chat_filter());
    per_player
        .add_listener::<ChatMessage>(listener_fn(|msg: &ChatMessage| {
            println!("[whisper->{}] {}", msg.player_id, msg.body);
            ListenerOutcome::Success
        }))
        .unwrap();
    root.map(&per_player, HandlerKey::from(args.player.clone()))?;

    let handle = root.get_handle::<ChatMessage>()?;
    root.call(
        &ChatMessage {
            player_id: args.player,
            body: args.message,
        },
        &handle,
    )?;

    Ok(())
}
