//! sabotaged - The sabotage game session service
//!
//! This is the main entry point for the sabotaged service.
//! It wires together all the components:
//! - Configuration loading (file, environment, command line)
//! - Core engine
//! - WebSocket server
//! - Timer delivery back into the event loop

use anyhow::{Context, Result};
use clap::Parser;
use sabotage_api::{Event, EventPayload, Faction, API_VERSION};
use sabotage_config::{build_settings, load_raw, RawConfig, Settings};
use sabotage_core::{CoreEngine, CoreEvent, Timer};
use sabotage_net::{NetServer, ServerMessage};
use sabotage_util::ClientId;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// sabotaged - Session server for a social deduction party game
#[derive(Parser, Debug)]
#[command(name = "sabotaged")]
#[command(about = "Session server for a social deduction party game", long_about = None)]
struct Args {
    /// Configuration file path (or set SABOTAGE_CONFIG env var)
    #[arg(short, long, env = "SABOTAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Listening port (default: 3001)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Only accept connections from this origin (or set FRONTEND_URL env var)
    #[arg(long, env = "FRONTEND_URL")]
    allowed_origin: Option<String>,

    /// Milliseconds after game start before meetings can be called
    #[arg(long, env = "MEETING_INITIAL_DELAY")]
    meeting_initial_delay: Option<u64>,

    /// Milliseconds a meeting stays open for voting
    #[arg(long, env = "MEETING_DURATION")]
    meeting_duration: Option<u64>,

    /// Milliseconds after a meeting before the next one can be called
    #[arg(long, env = "MEETING_COOLDOWN")]
    meeting_cooldown: Option<u64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Layer command line and environment values over the file
    fn apply_overrides(&self, raw: &mut RawConfig) {
        if let Some(port) = self.port {
            raw.server.port = Some(port);
        }
        // An empty FRONTEND_URL means "unset"
        if let Some(origin) = self.allowed_origin.as_deref()
            && !origin.is_empty()
        {
            raw.server.allowed_origin = Some(origin.to_string());
        }
        if let Some(ms) = self.meeting_initial_delay {
            raw.game.meeting_initial_delay_ms = Some(ms);
        }
        if let Some(ms) = self.meeting_duration {
            raw.game.meeting_duration_ms = Some(ms);
        }
        if let Some(ms) = self.meeting_cooldown {
            raw.game.meeting_cooldown_ms = Some(ms);
        }
    }
}

/// Load the optional config file, apply overrides, and validate
fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut raw = match &args.config {
        Some(path) => load_raw(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => RawConfig::default(),
    };

    args.apply_overrides(&mut raw);

    build_settings(raw).context("Invalid configuration")
}

/// Where a core event has to go
#[derive(Debug, PartialEq)]
enum Route {
    Direct(ClientId, EventPayload),
    Broadcast(EventPayload),
    Schedule { timer: Timer, after: Duration },
}

fn route(event: CoreEvent) -> Route {
    match event {
        CoreEvent::PlayerJoined { client_id, player } => {
            Route::Direct(client_id, EventPayload::PlayerJoined { player })
        }
        CoreEvent::JoinRejected { client_id, reason } => {
            Route::Direct(client_id, EventPayload::Error { message: reason })
        }
        CoreEvent::RosterChanged { players } => {
            Route::Broadcast(EventPayload::PlayersUpdate { players })
        }
        CoreEvent::GameStarted { snapshot } => {
            Route::Broadcast(EventPayload::GameStarted { state: snapshot })
        }
        CoreEvent::ChoreCompleted {
            player_id,
            chore_id,
        } => Route::Broadcast(EventPayload::TaskCompleted {
            player_id,
            task_id: chore_id,
        }),
        CoreEvent::MeetingCalled { called_by, .. } => {
            Route::Broadcast(EventPayload::MeetingCalled {
                player_id: called_by,
            })
        }
        CoreEvent::PlayerEjected {
            player_id,
            was_impostor,
        } => Route::Broadcast(EventPayload::PlayerEjected {
            player_id,
            was_impostor,
        }),
        CoreEvent::MeetingEnded { .. } => Route::Broadcast(EventPayload::MeetingEnded),
        CoreEvent::GameOver {
            winner: Faction::Crewmates,
            reason,
        } => Route::Broadcast(EventPayload::CrewmatesWin { reason }),
        CoreEvent::GameOver {
            winner: Faction::Impostors,
            reason,
        } => Route::Broadcast(EventPayload::ImpostorsWin { reason }),
        CoreEvent::ScheduleTimer { timer, after } => Route::Schedule { timer, after },
    }
}

/// Main service state
struct Service {
    engine: CoreEngine,
    net: Arc<NetServer>,
}

impl Service {
    async fn new(settings: Settings) -> Result<Self> {
        let bind_addr = settings.server.bind_addr();

        let mut net = NetServer::new(bind_addr, settings.server.allowed_origin.clone());
        net.start()
            .await
            .with_context(|| format!("Failed to listen on {}", bind_addr))?;

        let engine = CoreEngine::with_entropy(settings.game);

        Ok(Self {
            engine,
            net: Arc::new(net),
        })
    }

    async fn run(self) -> Result<()> {
        let Service { mut engine, net } = self;

        let mut messages = net
            .take_message_receiver()
            .await
            .context("Message receiver already taken")?;
        let (timer_tx, mut timer_rx) = mpsc::unbounded_channel::<Timer>();

        // Spawn accept task
        let accept = net.clone();
        tokio::spawn(async move {
            if let Err(e) = accept.run().await {
                error!(error = %e, "Network server error");
            }
        });

        // Set up signal handlers
        let mut sigterm = signal(SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal(SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;

        info!("Service running");

        // Main event loop: the only place the engine is touched
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }

                Some(timer) = timer_rx.recv() => {
                    debug!(timer = ?timer, "Timer fired");
                    let events = engine.fire_timer(timer);
                    Self::deliver(&net, &timer_tx, events).await;
                }

                Some(msg) = messages.recv() => {
                    let events = Self::handle_message(&mut engine, msg);
                    Self::deliver(&net, &timer_tx, events).await;
                }
            }
        }

        info!(
            players = engine.roster().len(),
            clients = net.client_count().await,
            "Shutdown complete"
        );
        Ok(())
    }

    fn handle_message(engine: &mut CoreEngine, msg: ServerMessage) -> Vec<CoreEvent> {
        match msg {
            ServerMessage::ClientConnected { client_id, peer } => {
                debug!(client_id = %client_id, peer = %peer, "Connection ready");
                Vec::new()
            }
            ServerMessage::Request { client_id, request } => {
                if request.api_version != API_VERSION {
                    warn!(
                        client_id = %client_id,
                        api_version = request.api_version,
                        expected = API_VERSION,
                        "Request with unsupported API version dropped"
                    );
                    return Vec::new();
                }

                debug!(
                    client_id = %client_id,
                    command = request.command.name(),
                    "Request received"
                );
                engine.apply(&client_id, request.command)
            }
            ServerMessage::ClientDisconnected { client_id } => engine.disconnect(&client_id),
        }
    }

    async fn deliver(
        net: &NetServer,
        timer_tx: &mpsc::UnboundedSender<Timer>,
        events: Vec<CoreEvent>,
    ) {
        for event in events {
            match route(event) {
                Route::Direct(client_id, payload) => {
                    if let Err(e) = net.send_to(&client_id, Event::new(payload)).await {
                        debug!(client_id = %client_id, error = %e, "Failed to deliver event");
                    }
                }
                Route::Broadcast(payload) => net.broadcast_event(Event::new(payload)),
                Route::Schedule { timer, after } => Self::schedule(timer_tx.clone(), timer, after),
            }
        }
    }

    /// Deliver `timer` back to the event loop after `after`
    fn schedule(timer_tx: mpsc::UnboundedSender<Timer>, timer: Timer, after: Duration) {
        debug!(timer = ?timer, after = ?after, "Timer scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // The loop is gone during shutdown
            let _ = timer_tx.send(timer);
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "sabotaged starting"
    );

    let settings = resolve_settings(&args)?;
    info!(
        port = settings.server.port,
        allowed_origin = settings.server.allowed_origin.as_deref().unwrap_or("(any)"),
        max_players = settings.game.max_players,
        meeting_initial_delay_ms = settings.game.meeting_initial_delay.as_millis() as u64,
        meeting_duration_ms = settings.game.meeting_duration.as_millis() as u64,
        meeting_cooldown_ms = settings.game.meeting_cooldown.as_millis() as u64,
        "Configuration loaded"
    );

    // Create and run the service
    let service = Service::new(settings).await?;
    service.run().await
}
