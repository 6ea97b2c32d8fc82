// Commands typed at the dashboard prompt
use clap::{CommandFactory, Parser, Subcommand};

/// One prompt line; the first word names the command.
#[derive(Parser, Debug)]
#[command(multicall = true, disable_help_subcommand = true)]
struct PromptLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Count the registered nodes
    #[command(visible_alias = "ls")]
    Nodes,
    /// Show a node's telemetry: select <id>
    #[command(visible_alias = "sel")]
    Select { id: String },
    /// Add a node: add <lat> <lng> <name>
    Add {
        #[arg(allow_negative_numbers = true)]
        lat: String,
        #[arg(allow_negative_numbers = true)]
        lng: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Remove a node: remove <id>
    #[command(visible_alias = "rm")]
    Remove { id: String },
    /// Fetch telemetry now
    #[command(visible_alias = "r")]
    Refresh,
    /// Run the water network simulation
    #[command(visible_alias = "sim")]
    Simulate,
    /// Show commands and key bindings
    #[command(visible_alias = "?")]
    Help,
    /// Exit the dashboard
    #[command(visible_aliases = ["exit", "q"])]
    Quit,
}

impl Command {
    /// Blank lines parse to `None`. Errors carry clap's one-line summary.
    pub fn from_line(line: &str) -> Result<Option<Self>, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(None);
        }
        PromptLine::try_parse_from(words)
            .map(|prompt| Some(prompt.command))
            .map_err(|e| {
                let rendered = e.render().to_string();
                rendered.lines().next().unwrap_or_default().to_string()
            })
    }
}

const KEY_BINDINGS: &str = "\
Keys:
  j/k, ↑/↓   move in the node list
  Enter      select the highlighted node
  d, Del     remove the highlighted node
  n          add a node
  r          refresh
  s          simulate
  :          type a command
  Esc        back to the dashboard
  q          quit";

/// Prompt commands as listed by clap, followed by the key bindings.
pub fn help() -> String {
    let prompt = PromptLine::command();
    let mut lines: Vec<String> = vec!["Commands:".to_string()];
    lines.extend(prompt.get_subcommands().map(|sub| {
        let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
        format!("  {:<10} {}", sub.get_name(), about)
    }));
    lines.push(String::new());
    lines.push(KEY_BINDINGS.to_string());
    lines.join("\n")
}
