use tracing::{error, info, warn};

use tracing_journal_hook::init::{init_tracing_with_config, LayerConfig};
use tracing_journal_hook::journald::JournaldSink;
use tracing_journal_hook::{CallSite, JournalHook, LogEvent, Severity};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Events fired directly through the hook can carry a function name and
    // the severities tracing does not have.
    let hook = JournalHook::new(JournaldSink::new()?);
    if !hook.sink().enabled() {
        eprintln!("journald socket not available, nothing will be recorded");
    }
    hook.fire(
        &LogEvent::new(Severity::Fatal, "configuration unreadable")
            .with_field("config-path", "/etc/app.toml")
            .with_caller(CallSite {
                file: file!().to_string(),
                line: line!(),
                function: "forward::main".to_string(),
            }),
    )?;

    init_tracing_with_config(LayerConfig {
        enable_stdout: true,
        ..LayerConfig::default()
    })?;

    info!("starting service");
    warn!(queue_depth = 812, "queue is backing up");
    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    Ok(())
}
