use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use kbdesk_core::{update, AppState, Msg};
use kbdesk_engine::StateDir;
use kbdesk_logging::{kbdesk_error, kbdesk_info, kbdesk_warn, LogDestination};
use log::LevelFilter;

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::transcript::export_transcript;
use super::ui;
use super::ui::input::Command;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Everything the dispatch loop reacts to.
enum Inbound {
    Core(Msg),
    Local(Command),
    Quit,
}

impl From<Msg> for Inbound {
    fn from(msg: Msg) -> Self {
        Inbound::Core(msg)
    }
}

pub fn run_app() -> anyhow::Result<()> {
    let loaded = AppConfig::load();
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    }
    .with_env_overrides();

    let destination = if config.log_to_file {
        LogDestination::default()
    } else {
        LogDestination::Terminal
    };
    kbdesk_logging::initialize(destination, LevelFilter::Info);
    if let Err(err) = &loaded {
        kbdesk_warn!("Falling back to default configuration: {:#}", err);
    }
    kbdesk_info!("kbdesk starting against {}", config.base_url);

    let store = StateDir::new(&config.state_dir);
    let session = store
        .load_or_create_session()
        .with_context(|| format!("preparing state in {}", config.state_dir.display()))?;

    let (msg_tx, msg_rx) = mpsc::channel::<Inbound>();
    let runner = EffectRunner::new(config.client_settings(), msg_tx.clone())
        .context("starting the engine")?;

    spawn_input_reader(msg_tx.clone());
    spawn_ticker(msg_tx);

    let mut app = App {
        state: AppState::new(session.session_id).with_poll_settings(config.poll_settings()),
        runner,
        store,
    };
    println!("{}", ui::input::HELP_TEXT);
    app.dispatch(Msg::Mounted);

    for inbound in msg_rx.iter() {
        match inbound {
            Inbound::Core(Msg::Tick) => app.render_if_dirty(),
            Inbound::Core(msg) => app.dispatch(msg),
            Inbound::Local(command) => app.handle_local(command),
            Inbound::Quit => break,
        }
    }

    app.shutdown();
    kbdesk_info!("kbdesk stopped");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    store: StateDir,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    /// Ends the client session: polling stops and the stored session id is
    /// dropped, so the next start opens a new conversation.
    fn shutdown(mut self) {
        self.dispatch(Msg::Unmounted);
        if let Err(err) = self.store.clear_session() {
            kbdesk_warn!("Could not clear chat session state: {}", err);
        }
    }

    fn render_if_dirty(&mut self) {
        if self.state.consume_dirty() {
            self.render();
        }
    }

    fn render(&self) {
        let lines = ui::render::render(&self.state.view());
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "\n{}", "-".repeat(72));
        for line in lines {
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
    }

    fn handle_local(&mut self, command: Command) {
        match command {
            Command::Core(msg) => self.dispatch(msg),
            Command::Show => self.render(),
            Command::Help => println!("{}", ui::input::HELP_TEXT),
            Command::Transcript => {
                let chat = self.state.view().chat;
                match export_transcript(&self.store, &chat.session_id, &chat.turns) {
                    Ok(path) => println!("Transcript written to {}", path.display()),
                    Err(err) => {
                        kbdesk_error!("Transcript export failed: {}", err);
                        println!("Transcript export failed: {err}");
                    }
                }
            }
            Command::Quit => {}
        }
    }
}

fn spawn_input_reader(tx: mpsc::Sender<Inbound>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let inbound = match ui::input::parse_command(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => Inbound::Quit,
                Ok(Some(command)) => Inbound::Local(command),
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };
            if tx.send(inbound).is_err() {
                return;
            }
        }
        let _ = tx.send(Inbound::Quit);
    });
}

// Rendering is coalesced onto ticks so bursts of replies print once.
fn spawn_ticker(tx: mpsc::Sender<Inbound>) {
    thread::spawn(move || {
        while tx.send(Inbound::Core(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });
}
