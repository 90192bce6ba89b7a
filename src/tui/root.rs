use super::{
    command::{Command, FlowKind},
    flow::{Flow, Settings, ViewCtx},
    flows,
    message::{Key, Message},
    runner::Runner,
    viewport::Viewport,
};
use crate::log::Log;


const SCOPE: &str = "runtime";
const PLACEHOLDER: &str = "Nothing to show. Press m for the menu or q to quit.";

/// Owns the active flow, the viewport and the runner, and processes one
/// message at a time.
pub struct Runtime {
    flow: Option<Box<dyn Flow>>,
    kind: FlowKind,
    generation: u64,
    viewport: Viewport,
    runner: Runner,
    settings: Settings,
    log: Log,
    focus_input: bool,
    blink: bool,
    tick: usize,
    quit: bool,
}

impl Runtime {
    pub fn new(runner: Runner, settings: Settings, log: Log) -> Self {
        Self {
            flow: None,
            kind: FlowKind::Menu,
            generation: 0,
            viewport: Viewport::new(),
            runner,
            settings,
            log,
            focus_input: false,
            blink: true,
            tick: 0,
            quit: false,
        }
    }

    /// Activates the menu and returns its start-up command.
    pub fn init(&mut self) -> Command {
        self.switch(FlowKind::Menu)
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Routes a message through the global keys and the viewport to the
    /// active flow.
    pub fn dispatch(&mut self, msg: Message) -> Command {
        match msg {
            Message::Key(Key::Ctrl('c')) => Command::Quit,
            Message::Key(key) => self.on_key(key),
            Message::Resize { width, height } => {
                let (width, height) = self.viewport.resize(width, height);
                self.forward(Message::Resize { width, height })
            }
            Message::Tick => {
                self.tick = self.tick.wrapping_add(1);
                self.blink = !self.blink;
                self.forward(Message::Tick)
            }
            Message::AsyncProgress { op, stage, text } => {
                if op.flow != self.generation || !self.runner.record_progress(op, stage, &text) {
                    return Command::None;
                }
                self.forward(Message::AsyncProgress { op, stage, text })
            }
            Message::AsyncResult { op, outcome } => {
                self.runner.finish(op, &outcome);
                if op.flow != self.generation {
                    self.log
                        .info(SCOPE, format!("dropping result of stale operation {op}"));
                    return Command::None;
                }
                self.forward(Message::AsyncResult { op, outcome })
            }
        }
    }

    fn on_key(&mut self, key: Key) -> Command {
        if self.viewport.help_shown() {
            if matches!(key, Key::Char('?') | Key::Esc | Key::Char('q')) {
                self.viewport.close_help();
            }
            return Command::None;
        }
        if self.viewport.scroll_key(key) {
            return Command::None;
        }
        let captures = self.flow.as_ref().is_some_and(|f| f.captures_text());
        if !captures {
            match key {
                Key::Char('q') => return Command::Quit,
                Key::Char('?') => {
                    self.viewport.toggle_help();
                    return Command::None;
                }
                Key::Char('m') if self.kind != FlowKind::Menu || self.flow.is_none() => {
                    return Command::ReturnToMenu;
                }
                _ => {}
            }
        }
        self.forward(Message::Key(key))
    }

    fn forward(&mut self, msg: Message) -> Command {
        let Some(flow) = self.flow.as_mut() else {
            return Command::None;
        };
        let cmd = flow.update(msg);
        self.viewport.follow(flow.selection());
        cmd
    }

    /// Performs a command, including the commands it leads to.
    pub fn execute(&mut self, cmd: Command) {
        match cmd {
            Command::None => {}
            Command::Batch(cmds) => {
                for cmd in cmds {
                    self.execute(cmd);
                }
            }
            Command::RunAsync {
                op,
                slot,
                operation,
                timeout,
            } => self.runner.start(op, slot, operation, timeout),
            Command::Cancel(op) => {
                self.runner.cancel(op);
            }
            Command::Quit => {
                self.runner.cancel_all();
                self.quit = true;
            }
            Command::FocusInput => {
                self.focus_input = true;
                self.blink = true;
            }
            Command::Switch(kind) => {
                let init = self.switch(kind);
                self.execute(init);
            }
            Command::ReturnToMenu => {
                let init = self.switch(FlowKind::Menu);
                self.execute(init);
            }
        }
    }

    /// Dispatches `msg` and executes the resulting command.
    pub fn update(&mut self, msg: Message) {
        let cmd = self.dispatch(msg);
        self.execute(cmd);
    }

    /// Replaces the active flow. Operations of the old flow are cancelled and
    /// its late messages are recognised by their generation.
    fn switch(&mut self, kind: FlowKind) -> Command {
        let live = self.runner.live_count();
        self.runner.cancel_all();
        self.generation += 1;
        self.log.info(
            SCOPE,
            format!(
                "switching to {kind:?} (generation {}, {live} operations cancelled)",
                self.generation
            ),
        );
        self.viewport.reset();
        self.focus_input = false;
        self.kind = kind;
        let mut flow = flows::build(kind, self.generation, self.settings);
        let init = flow.init();
        self.flow = Some(flow);
        init
    }

    /// Renders the current frame as text.
    pub fn render(&mut self) -> String {
        let ctx = ViewCtx {
            width: self.viewport.width(),
            height: self.viewport.visible_height(),
            cursor: self.focus_input && self.blink,
            tick: self.tick,
        };
        match self.flow.as_ref() {
            Some(flow) => {
                let body = flow.view(&ctx);
                let title = flow.title();
                self.viewport.frame(&title, &body, flow.help())
            }
            None => self.viewport.frame("Link Management", PLACEHOLDER, &[]),
        }
    }
}
