//! Operator controls: console commands on stdin and Ctrl-C

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use mirror_core::SyncControl;
use tracing::{debug, info, warn};

use crate::error::Result;

/// A command typed on the console while the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Cut the current wait short and sync now
    SyncNow,
    /// Finish gracefully
    Stop,
}

/// Parse one console line. Case and surrounding whitespace are ignored.
pub fn parse_command(line: &str) -> Option<ControlCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "sync" => Some(ControlCommand::SyncNow),
        "q" | "quit" | "exit" => Some(ControlCommand::Stop),
        _ => None,
    }
}

/// Forward console commands from `reader` to `control` until a stop command
/// or end of input.
///
/// End of input only ends listening; the engine keeps running.
pub fn listen(reader: impl BufRead, control: &SyncControl) {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        match parse_command(&line) {
            Some(ControlCommand::SyncNow) => {
                debug!("Console command: sync now");
                control.request_immediate_sync();
            }
            Some(ControlCommand::Stop) => {
                info!("Stop requested");
                control.request_stop();
                return;
            }
            None if line.trim().is_empty() => {}
            None => warn!("Unknown command '{}'. Use 's' to sync now or 'q' to quit", line.trim()),
        }
    }
    debug!("Console input closed; control listener finished");
}

/// Install the Ctrl-C handler and start the stdin listener thread.
pub fn install(control: Arc<SyncControl>) -> Result<()> {
    let signal_control = Arc::clone(&control);
    ctrlc::set_handler(move || {
        info!("Interrupt received, stopping");
        signal_control.request_stop();
    })?;

    thread::Builder::new()
        .name("control-listener".to_string())
        .spawn(move || listen(io::stdin().lock(), &control))?;
    Ok(())
}
