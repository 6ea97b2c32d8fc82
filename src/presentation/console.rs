// Interactive terminal state: node cursor, prompt line, and the right-hand panel
use crate::application::simulation_service::SimulationFrame;
use crate::domain::node::Node;
use crate::presentation::commands::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    /// Typing a command at the `:` prompt.
    Prompt,
}

#[derive(Debug, Clone, Default)]
pub enum Panel {
    #[default]
    Dashboard,
    Help(String),
    Simulation(SimulationFrame),
}

#[derive(Debug, Default)]
pub struct Console {
    mode: Mode,
    input: String,
    cursor: usize,
    message: Option<String>,
    panel: Panel,
}

impl Console {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// Highlighted row, kept inside the current list.
    pub fn cursor(&self, nodes: &[Node]) -> Option<usize> {
        if nodes.is_empty() {
            None
        } else {
            Some(self.cursor.min(nodes.len() - 1))
        }
    }

    pub fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    pub fn show_help(&mut self, help: String) {
        self.panel = Panel::Help(help);
    }

    pub fn show_simulation(&mut self, frame: SimulationFrame) {
        self.panel = Panel::Simulation(frame);
    }

    /// Maps a key press to a command, if it completes one.
    pub fn handle_key(&mut self, key: KeyEvent, nodes: &[Node]) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }
        match self.mode {
            Mode::Browse => self.browse_key(key, nodes),
            Mode::Prompt => self.prompt_key(key),
        }
    }

    fn browse_key(&mut self, key: KeyEvent, nodes: &[Node]) -> Option<Command> {
        let highlighted = self.cursor(nodes).map(|i| nodes[i].id.clone());
        match key.code {
            KeyCode::Char('q') => return Some(Command::Quit),
            KeyCode::Esc => {
                self.panel = Panel::Dashboard;
                self.message = None;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(i) = self.cursor(nodes) {
                    self.cursor = (i + 1).min(nodes.len() - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor(nodes).unwrap_or(0).saturating_sub(1);
            }
            KeyCode::Enter => {
                self.panel = Panel::Dashboard;
                return highlighted.map(|id| Command::Select { id });
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                return highlighted.map(|id| Command::Remove { id });
            }
            KeyCode::Char('r') => return Some(Command::Refresh),
            KeyCode::Char('s') => return Some(Command::Simulate),
            KeyCode::Char('?') => return Some(Command::Help),
            KeyCode::Char(':') => self.open_prompt(""),
            KeyCode::Char('n') => self.open_prompt("add "),
            _ => {}
        }
        None
    }

    fn prompt_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.input.clear();
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                let line = std::mem::take(&mut self.input);
                match Command::from_line(&line) {
                    Ok(command) => return command,
                    Err(e) => self.message = Some(e),
                }
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        None
    }

    fn open_prompt(&mut self, prefill: &str) {
        self.mode = Mode::Prompt;
        self.input = prefill.to_string();
        self.message = None;
    }
}
