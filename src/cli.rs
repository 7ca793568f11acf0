//! CLI interface for qrdispatch.
//!
//! The CLI stands in for the view layer: it feeds scanned lines into a scan
//! session, launches the decisions it gets back, and keeps scanning.
//!
//! - `qrdispatch route <payload>`: route one payload and print the outcome.
//! - `qrdispatch scan`: read payloads from stdin, one per line, until EOF.
//! - `qrdispatch families`: show the routing table in effect.

mod format;

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::launch::Launcher;
use crate::model::{ScanOutcome, ViewEvent};
use crate::router::Router;
use crate::scanner::{LineScanner, Scanner};
use crate::session::ScanSession;

use format::format_family;

/// qrdispatch: send scanned QR payloads to the right app.
#[derive(Debug, Parser)]
#[command(name = "qrdispatch", after_long_help = USAGE_HELP)]
pub struct Cli {
    /// Config file to use instead of `~/.qrdispatch/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log routing and session decisions to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const USAGE_HELP: &str = r#"Examples:
  qrdispatch route "line://ti/p/@example" --installed jp.naver.line.android
  qrdispatch route "https://twitter.com/someuser" --installed com.x.android
  zbarcam --raw | qrdispatch scan
  qrdispatch families"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Route a single payload and print the outcome as JSON.
    Route {
        /// The decoded QR payload.
        payload: String,

        /// Treat this package as installed. Can be repeated.
        /// Overrides the configured registry.
        #[arg(long)]
        installed: Vec<String>,
    },

    /// Run a continuous scan session over stdin.
    ///
    /// Each line is one decoded barcode; an empty line is a barcode with no
    /// data. Messages go to stderr, decisions to the configured launcher.
    Scan {
        /// Stop after the first successful launch.
        #[arg(long)]
        once: bool,

        /// Treat this package as installed. Can be repeated.
        /// Overrides the configured registry.
        #[arg(long)]
        installed: Vec<String>,
    },

    /// List the routing table in effect.
    Families,
}

/// Run the CLI, returning an error message on failure.
pub fn run(cli: Cli) -> Result<(), String> {
    let config = Config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Route { payload, installed } => cmd_route(&config, &payload, &installed),
        Command::Scan { once, installed } => {
            let launcher = config.launcher();
            cmd_scan(&config, &installed, once, launcher)
        }
        Command::Families => cmd_families(&config),
    }
}

/// `None` when no `--installed` flags were given, so the config decides.
fn installed_override(installed: &[String]) -> Option<&[String]> {
    (!installed.is_empty()).then_some(installed)
}

fn cmd_route(config: &Config, payload: &str, installed: &[String]) -> Result<(), String> {
    let router = Router::new(
        config.routing_table(),
        config.checker(installed_override(installed)),
    );

    let outcome = router.route(payload);

    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|e| format!("failed to serialize routing outcome: {e}"))?;
    println!("{json}");

    Ok(())
}

fn cmd_scan(
    config: &Config,
    installed: &[String],
    once: bool,
    mut launcher: Box<dyn Launcher>,
) -> Result<(), String> {
    let router = Router::new(
        config.routing_table(),
        config.checker(installed_override(installed)),
    );
    let (scanner, outcomes) = LineScanner::spawn(BufReader::new(io::stdin()));
    let mut session = ScanSession::new(router, scanner);

    let launched = drive(&mut session, &outcomes, launcher.as_mut(), once);

    tracing::info!(launched, "scan session ended");
    Ok(())
}

/// Pump scanner outcomes through the session until the scanner closes.
///
/// Every notification is printed and followed by a new scan request. A
/// decision that fails to launch is reported back to the session, which
/// turns it into a notification. Returns the number of successful launches.
fn drive<S: Scanner>(
    session: &mut ScanSession<S>,
    outcomes: &Receiver<ScanOutcome>,
    launcher: &mut dyn Launcher,
    once: bool,
) -> usize {
    let (sender, events) = mpsc::channel();
    session.subscribe(move |event| {
        // The receiver outlives the session loop below.
        let _ = sender.send(event);
    });

    let mut launched = 0;
    session.request_scan();

    for outcome in outcomes {
        session.deliver(outcome);
        tracing::debug!(state = ?session.state(), "outcome delivered");

        while let Ok(event) = events.try_recv() {
            match event {
                ViewEvent::Notify { message } => {
                    eprintln!("{message}");
                    session.request_scan();
                }
                ViewEvent::Navigate { decision } => match launcher.launch(&decision) {
                    Ok(()) => {
                        launched += 1;
                        if once {
                            session.unsubscribe();
                            return launched;
                        }
                        session.request_scan();
                    }
                    // Queues a Notify; this drain loop picks it up and rescans.
                    Err(e) => session.on_navigation_failed(&decision, &e),
                },
            }
        }
    }

    session.unsubscribe();
    launched
}

fn cmd_families(config: &Config) -> Result<(), String> {
    let table = config.routing_table();

    if table.families().is_empty() {
        println!("No families");
        return Ok(());
    }

    for family in table.families() {
        println!("{}", format_family(family));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::launch::LaunchError;
    use crate::model::{DispatchDecision, RoutingTable};
    use crate::registry::{InstalledChecker, StaticRegistry};

    /// Records launches; refuses locators starting with `geo:`.
    #[derive(Default)]
    struct RecordingLauncher {
        launched: Vec<DispatchDecision>,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&mut self, decision: &DispatchDecision) -> Result<(), LaunchError> {
            if decision.locator.starts_with("geo:") {
                return Err(LaunchError::NoHandler {
                    locator: decision.locator.clone(),
                    detail: "no activity found".into(),
                });
            }
            self.launched.push(decision.clone());
            Ok(())
        }
    }

    fn line_session(input: &str) -> (ScanSession<LineScanner>, Receiver<ScanOutcome>) {
        let router = Router::new(
            RoutingTable::default(),
            InstalledChecker::new(StaticRegistry::new(["com.x.android"])),
        );
        let (scanner, outcomes) = LineScanner::spawn(Cursor::new(input.to_string()));
        (ScanSession::new(router, scanner), outcomes)
    }

    #[test]
    fn drive_keeps_scanning_through_notifications() {
        let (mut session, outcomes) = line_session(
            "not a uri\n\nhttps://twitter.com/someuser\ngeo:0,0?q=cafe\nhttp://www.google.com\n",
        );
        let mut launcher = RecordingLauncher::default();

        let launched = drive(&mut session, &outcomes, &mut launcher, false);

        assert_eq!(launched, 2);
        assert_eq!(
            launcher.launched,
            [
                DispatchDecision::targeted("https://twitter.com/someuser", "com.x.android"),
                DispatchDecision::generic("http://www.google.com"),
            ]
        );
        assert!(session.state().is_scanning);
    }

    #[test]
    fn drive_once_stops_after_first_launch() {
        let (mut session, outcomes) = line_session("\nhttps://x.com/a\nhttps://x.com/b\n");
        let mut launcher = RecordingLauncher::default();

        let launched = drive(&mut session, &outcomes, &mut launcher, true);

        assert_eq!(launched, 1);
        assert_eq!(launcher.launched[0].locator, "https://x.com/a");
        assert!(!session.state().is_scanning);
    }

    #[test]
    fn drive_ends_on_empty_input() {
        let (mut session, outcomes) = line_session("");
        let mut launcher = RecordingLauncher::default();

        assert_eq!(drive(&mut session, &outcomes, &mut launcher, false), 0);
        assert!(launcher.launched.is_empty());
    }

    #[test]
    fn parses_route_with_installed_packages() {
        let cli = Cli::try_parse_from([
            "qrdispatch",
            "route",
            "https://twitter.com/someuser",
            "--installed",
            "com.x.android",
            "--installed",
            "com.twitter.android",
        ])
        .unwrap();

        match cli.command {
            Command::Route { payload, installed } => {
                assert_eq!(payload, "https://twitter.com/someuser");
                assert_eq!(installed, ["com.x.android", "com.twitter.android"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_scan_with_global_flags() {
        let cli = Cli::try_parse_from([
            "qrdispatch",
            "scan",
            "--once",
            "--config",
            "/tmp/qrdispatch.toml",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/qrdispatch.toml")));
        assert!(matches!(cli.command, Command::Scan { once: true, .. }));
    }

    #[test]
    fn route_requires_a_payload() {
        assert!(Cli::try_parse_from(["qrdispatch", "route"]).is_err());
    }

    #[test]
    fn no_installed_flags_defer_to_config() {
        assert!(installed_override(&[]).is_none());

        let installed = vec!["com.x.android".to_string()];
        assert_eq!(installed_override(&installed), Some(installed.as_slice()));
    }
}
