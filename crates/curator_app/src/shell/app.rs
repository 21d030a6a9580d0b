use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use curator_core::{update, AppState, Msg, SettingsSection};
use curator_engine::{EngineHandle, FileStore, KeyValueStore, MemoryStore};
use curator_logging::{curator_info, curator_trace, curator_warn, set_dispatch_seq};

use super::commands::{self, Command, HELP};
use super::config::PanelConfig;
use super::effects::{event_to_msg, EffectRunner};
use super::persistence;
use super::render;

/// How long the loop waits for input before draining engine events.
const TICK: Duration = Duration::from_millis(75);

enum Input {
    Line(String),
    Closed,
}

pub fn run_app(config: PanelConfig) -> anyhow::Result<()> {
    curator_info!("Starting curator against {}", config.server_url);
    let engine = EngineHandle::new(config.engine_settings()).context("starting engine")?;
    let store: Box<dyn KeyValueStore> = match FileStore::open(&config.state_dir) {
        Ok(store) => Box::new(store),
        Err(err) => {
            curator_warn!(
                "State dir {:?} unusable ({}); preferences will not persist",
                config.state_dir,
                err
            );
            Box::new(MemoryStore::new())
        }
    };

    let (input_tx, input_rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Closed);
    });

    let mut shell = Shell::new(EffectRunner::new(engine, store), config.import_batch_limit);
    let preferences = persistence::load_preferences(shell.runner.store());
    shell.dispatch(Msg::AppStarted { preferences });
    shell.print_line(HELP);

    loop {
        match input_rx.recv_timeout(TICK) {
            Ok(Input::Line(line)) => {
                if !shell.handle_line(&line) {
                    break;
                }
            }
            Ok(Input::Closed) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }
        shell.pump_engine();
        shell.dispatch(Msg::Tick);
        shell.render_if_needed();
    }

    shell.dispatch(Msg::Shutdown);
    shell.runner.into_engine().shutdown();
    curator_info!("Curator stopped");
    Ok(())
}

struct Shell {
    state: AppState,
    runner: EffectRunner,
    seq: u64,
    default_limit: u32,
}

impl Shell {
    fn new(runner: EffectRunner, default_limit: u32) -> Self {
        Self {
            state: AppState::new(),
            runner,
            seq: 0,
            default_limit,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        self.seq += 1;
        set_dispatch_seq(self.seq);
        curator_trace!("Dispatch {:?}", msg);

        let saved = match &msg {
            Msg::SectionSaveFinished {
                section,
                result: Ok(()),
            } => Some(*section),
            _ => None,
        };
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        if let Some(section) = saved {
            if !self.state.is_section_dirty(section) {
                self.runner.clear_draft(section);
            }
        }
        for line in self.runner.run(effects) {
            self.print_line(&line);
        }
    }

    /// Returns false when the operator asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        let command = match commands::parse(line) {
            Ok(command) => command,
            Err(message) => {
                self.print_line(&message);
                return true;
            }
        };
        match command {
            Command::Send(msg) => self.dispatch(msg),
            Command::Edit {
                section,
                key,
                value,
            } => {
                self.runner.edit(section, key, value);
                self.dispatch(Msg::SectionEdited(section));
            }
            Command::Save(section) => self.save_or_discard(section, Msg::SaveClicked),
            Command::Discard(section) => self.save_or_discard(section, Msg::DiscardClicked),
            Command::Import { folder, limit } => {
                let preferences = self.state.preferences();
                let folder = folder
                    .or_else(|| preferences.import_folder.clone())
                    .unwrap_or_default();
                let limit = limit
                    .or(preferences.import_limit)
                    .unwrap_or(self.default_limit);
                self.dispatch(Msg::ImportRequested { folder, limit });
            }
            Command::Show => {
                let text = render::render(&self.state.view());
                self.print_line(text.trim_end());
            }
            Command::Help => self.print_line(HELP),
            Command::Quit => return false,
        }
        true
    }

    /// Targets the named section, or the one on screen.
    fn save_or_discard(
        &mut self,
        section: Option<SettingsSection>,
        to_msg: fn(SettingsSection) -> Msg,
    ) {
        match section.or_else(|| self.state.location().editable_section()) {
            Some(section) => self.dispatch(to_msg(section)),
            None => self.print_line("Nothing editable on this page"),
        }
    }

    fn pump_engine(&mut self) {
        while let Some(event) = self.runner.try_recv() {
            if let Some(msg) = event_to_msg(event) {
                self.dispatch(msg);
            }
        }
    }

    fn render_if_needed(&mut self) {
        if self.state.consume_render() {
            let text = render::render(&self.state.view());
            self.print_line(text.trim_end());
        }
    }

    fn print_line(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{text}");
        let _ = stdout.flush();
    }
}
