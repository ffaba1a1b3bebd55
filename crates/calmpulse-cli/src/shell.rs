use std::io::{IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

use calmpulse_core::{AdvisoryError, BurnoutClient, CoreError, TrackerHandle};

use crate::commands::{self, ShellCommand, ShellLine};

enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end over a running tracker.
pub struct Shell {
    handle: TrackerHandle,
    advisory: Result<BurnoutClient, AdvisoryError>,
    pending_checks: Vec<JoinHandle<()>>,
}

impl Shell {
    pub fn new(handle: TrackerHandle, advisory: Result<BurnoutClient, AdvisoryError>) -> Self {
        Self {
            handle,
            advisory,
            pending_checks: Vec::new(),
        }
    }

    /// Read commands from stdin until `quit` or end of input, then shut the
    /// tracker down.
    pub async fn run(mut self) -> Result<(), CoreError> {
        let interactive = std::io::stdin().is_terminal();
        if interactive {
            println!("Calm Pulse. Type `help` for commands.");
        }
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            if interactive {
                print!("calmpulse> ");
                let _ = std::io::stdout().flush();
            }
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let command = match ShellLine::parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    let _ = e.print();
                    continue;
                }
            };
            match self.execute(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => println!("error: {e}"),
            }
            self.pending_checks.retain(|task| !task.is_finished());
        }

        for task in self.pending_checks.drain(..) {
            let _ = task.await;
        }
        debug!("shell exiting");
        self.handle.shutdown().await
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<Flow, Box<dyn std::error::Error>> {
        let handle = &self.handle;
        match command {
            ShellCommand::Start => commands::tracking::start(handle).await?,
            ShellCommand::Stop => commands::tracking::stop(handle).await?,
            ShellCommand::Pause => commands::tracking::pause(handle).await?,
            ShellCommand::Resume => commands::tracking::resume(handle).await?,
            ShellCommand::Break => commands::tracking::start_break(handle).await?,
            ShellCommand::Skip => commands::tracking::skip_break(handle).await?,
            ShellCommand::Status { json } => commands::tracking::status(handle, json).await?,
            ShellCommand::Stats { json } => commands::stats::run(handle, json).await?,
            ShellCommand::Settings => commands::settings::list(handle).await?,
            ShellCommand::Set { field, value } => {
                commands::settings::set(handle, &field, &value).await?
            }
            ShellCommand::Pomodoro { field, value } => {
                commands::settings::pomodoro(handle, field.zip(value)).await?
            }
            ShellCommand::Check {
                mood,
                sleep,
                offline,
            } => {
                let client = self.advisory.as_ref().ok();
                if let Some(task) =
                    commands::advisory::check(handle, client, mood, sleep, offline).await?
                {
                    self.pending_checks.push(task);
                }
            }
            ShellCommand::Tips => commands::advisory::tips(),
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}
