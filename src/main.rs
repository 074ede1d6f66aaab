use std::sync::Arc;

use anyhow::{bail, Context, Result};
use stockwatch::host::{Browser, SimulatedBrowser};
use stockwatch::kernel::event::{ProbeReport, ProbeStatus, PurchaseOutcome};
use stockwatch::outputs::StatePublisher;
use stockwatch::settings::Settings;
use stockwatch::{Collaborators, MonitorConfig, MonitorHandle, Reactor};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Console stand-in for the popup and the probe boundary.
#[derive(Debug, Clone, PartialEq)]
enum ConsoleCommand {
    Start(MonitorConfig),
    Stop,
    State,
    Probe(ProbeReport),
    Navigate(String),
    Close,
    Quit,
}

fn parse_status(raw: &str) -> Result<ProbeStatus> {
    Ok(match raw {
        "available" => ProbeStatus::Available,
        "out_of_stock" | "oos" => ProbeStatus::OutOfStock,
        "not_found" | "missing" => ProbeStatus::NotFound,
        other => bail!("unknown status {:?}", other),
    })
}

fn parse_outcome(raw: &str) -> Result<PurchaseOutcome> {
    Ok(match raw {
        "clicked" | "attempted_succeeded" => PurchaseOutcome::AttemptedSucceeded,
        "click_failed" | "attempted_failed" => PurchaseOutcome::AttemptedFailed,
        "none" | "not_attempted" => PurchaseOutcome::NotAttempted,
        other => bail!("unknown purchase outcome {:?}", other),
    })
}

fn parse_line(line: &str) -> Result<ConsoleCommand> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        bail!("empty command");
    };

    match verb {
        "start" => {
            let url = parts.next().context("usage: start <url> [interval] [quantity]")?;
            let interval = match parts.next() {
                Some(raw) => raw.parse::<f64>().with_context(|| format!("bad interval {:?}", raw))?,
                None => stockwatch::kernel::config::INTERVAL_DEFAULT_SECS,
            };
            let quantity = match parts.next() {
                Some(raw) => raw.parse::<u32>().with_context(|| format!("bad quantity {:?}", raw))?,
                None => stockwatch::kernel::config::QUANTITY_DEFAULT,
            };
            Ok(ConsoleCommand::Start(MonitorConfig::new(url, interval, quantity).clamped()))
        }
        "stop" => Ok(ConsoleCommand::Stop),
        "state" => Ok(ConsoleCommand::State),
        "probe" => {
            let status = parse_status(parts.next().context("usage: probe <status> [outcome]")?)?;
            let purchase = parts.next().map(parse_outcome).transpose()?;
            Ok(ConsoleCommand::Probe(ProbeReport { status, purchase }))
        }
        "nav" => {
            let url = parts.next().context("usage: nav <url>")?;
            Ok(ConsoleCommand::Navigate(url.to_string()))
        }
        "close" => Ok(ConsoleCommand::Close),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => bail!("unknown command {:?}", other),
    }
}

async fn execute(
    command: ConsoleCommand,
    handle: &MonitorHandle,
    browser: &SimulatedBrowser,
) -> Result<()> {
    match command {
        ConsoleCommand::Start(config) => {
            let state = handle.start(config).await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        ConsoleCommand::Stop => {
            let state = handle.stop().await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        ConsoleCommand::State => {
            let snapshot = handle.get_state().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        ConsoleCommand::Probe(report) => {
            let snapshot = handle.get_state().await?;
            let resource = snapshot.state.owned_resource_id.context("no tab is being monitored")?;
            handle.report_probe(resource, report).await?;
        }
        ConsoleCommand::Navigate(url) => {
            let snapshot = handle.get_state().await?;
            let resource = snapshot.state.owned_resource_id.context("no tab is being monitored")?;
            browser.navigate(resource, &url).await?;
        }
        ConsoleCommand::Close => {
            let snapshot = handle.get_state().await?;
            let resource = snapshot.state.owned_resource_id.context("no tab is being monitored")?;
            browser.close_tab(resource);
        }
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    tracing::info!("stockwatch booting...");

    let settings = Settings::from_env();
    let (tx, rx) = mpsc::channel(settings.channel_capacity);

    let browser = Arc::new(SimulatedBrowser::with_load_events(tx.clone()));
    let publisher = StatePublisher::default();
    let mut updates = publisher.subscribe();

    let reactor = Reactor::new(
        rx,
        tx.clone(),
        Collaborators {
            browser: browser.clone(),
            store: settings.build_store(),
            notifier: settings.build_notifier(),
            publisher,
        },
    );

    let shutdown = CancellationToken::new();
    let reactor_task = tokio::spawn(reactor.run(shutdown.clone()));
    let handle = MonitorHandle::new(tx);

    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(state) => match serde_json::to_string(&state) {
                    Ok(json) => println!("[STATE_UPDATE] {}", json),
                    Err(e) => tracing::warn!("could not render state: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("skipped {} state updates", n)
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!(
        "Commands: start <url> [interval] [qty] | stop | state | probe <status> [outcome] \
         | nav <url> | close | quit"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(command, &handle, &browser).await {
                            eprintln!("error: {:#}", e);
                        }
                    }
                    Err(e) => eprintln!("error: {:#}", e),
                }
            }
        }
    }

    shutdown.cancel();
    reactor_task.await.context("reactor task panicked")?;
    tracing::info!("stockwatch stopped");
    Ok(())
}
