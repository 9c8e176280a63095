use veil::error::PanelError;
use veil::logger::initialize as LoggerInitialize;

use control_core::advisor::spawn_advisor;
use control_core::channel::{Channel, transport};
use control_core::connection::ConnectionController;
use control_core::connectivity::{ConnectivityMonitor, HostSignal};
use control_core::location::LocationProbe;
use control_core::notify::{AdvisoryEvent, NotificationMediator};
use control_core::settings::SettingValueStore;

use common::ErrorLocation;

use std::env;
use std::fs::create_dir_all;
use std::panic::Location;

use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use url::Url;

/// Environment override for the background process's WebSocket address.
const BRIDGE_URL_VAR: &str = "VEIL_BRIDGE_URL";

/// Default WebSocket address of the background process.
const DEFAULT_BRIDGE_URL: &str = "ws://127.0.0.1:18087";

#[tokio::main]
async fn main() -> Result<(), PanelError> {
    // Get app data directory for logs
    let log_dir = dirs::data_local_dir()
        .ok_or_else(|| PanelError::Panel {
            message: String::from("Failed to resolve local data directory"),
            location: ErrorLocation::from(Location::caller()),
        })?
        .join("veil")
        .join("logs");

    // Ensure log directory exists
    create_dir_all(&log_dir).map_err(|e| PanelError::Panel {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("Veil panel starting");
    info!("Log directory: {}", log_dir.display());

    let bridge_url = env::var(BRIDGE_URL_VAR).unwrap_or_else(|_| String::from(DEFAULT_BRIDGE_URL));
    let bridge_url = Url::parse(&bridge_url).map_err(|e| PanelError::Panel {
        message: format!("Invalid bridge URL '{bridge_url}': {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!("Connecting to background process at {bridge_url}");

    let (channel, outbound_rx) = Channel::new();
    transport::connect(&bridge_url, channel.clone(), outbound_rx)
        .await
        .map_err(|e| PanelError::Core {
            message: format!("Failed to connect to background process: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let monitor = ConnectivityMonitor::new();
    let controller = ConnectionController::spawn(channel.clone(), monitor.subscribe());
    let settings = SettingValueStore::spawn(channel);
    let probe = LocationProbe::new(controller.subscribe()).map_err(|e| PanelError::Core {
        message: format!("Failed to build location probe: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;
    let mediator = NotificationMediator::new();

    spawn_advisor(
        controller.subscribe(),
        monitor.subscribe(),
        probe,
        mediator.clone(),
        settings,
    );

    spawn_state_printer(&controller);
    spawn_advisory_printer(&mediator);

    run_repl(controller, monitor, mediator).await;

    info!("Veil panel shutting down");
    Ok(())
}

/// Echo connection state transitions to the terminal.
fn spawn_state_printer(controller: &ConnectionController) {
    let mut state_rx = controller.subscribe();
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = *state_rx.borrow_and_update();
            println!("connection: {state}");
        }
    });
}

/// Echo advisory lifecycle events to the terminal.
fn spawn_advisory_printer(mediator: &NotificationMediator) {
    let mut events = mediator.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AdvisoryEvent::Shown(advisory) => {
                    println!("advisory [{}]: {}", advisory.id, advisory.text);
                }
                AdvisoryEvent::Dismissed(id) => println!("advisory [{id}]: dismissed"),
            }
        }
    });
}

/// Minimal interactive loop standing in for the panel UI.
async fn run_repl(
    controller: ConnectionController,
    monitor: ConnectivityMonitor,
    mediator: NotificationMediator,
) {
    let mut lines = BufReader::new(stdin()).lines();

    println!("commands: toggle | status | online | offline | quit");

    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "toggle" => {
                if let Err(e) = controller.toggle().await {
                    error!("Toggle failed: {e}");
                }
            }
            "status" => {
                println!("connection: {}", controller.state());
                println!("online: {}", monitor.online());
                for advisory in mediator.active().await {
                    println!("advisory [{}]: {}", advisory.id, advisory.text);
                }
            }
            "online" => monitor.handle_signal(HostSignal::Online),
            "offline" => monitor.handle_signal(HostSignal::Offline),
            "quit" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }
}
