//! Shared fixtures for integration tests.
//!
//! Builds a bot on top of a temporary file stock and a manual clock, so
//! tests control both the pool contents and the passage of time.

#![allow(dead_code)]

use accgen::config::Config;
use accgen::credential::Detector;
use accgen::handlers::Registry;
use accgen::network::protocol::{CommandEvent, Event, Member, MessageEvent, Outcome};
use accgen::quota::{Clock, ManualClock};
use accgen::state::BotState;
use accgen::stock::{FileStock, Stock};
use chrono::{TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const PREMIUM: &str = "Premium";
pub const RESTOCK: &str = "Restock";

/// Minimal configuration with short limits that are easy to exhaust.
pub const TEST_CONFIG: &str = r#"
[limits.premium]
cooldown_secs = 5
daily_limit = 4

[limits.standard]
cooldown_secs = 60
daily_limit = 2

[listen]
address = "127.0.0.1:0"
"#;

pub struct TestBot {
    pub state: Arc<BotState>,
    pub registry: Registry,
    pub clock: Arc<ManualClock>,
    pub stock_path: PathBuf,
    _dir: TempDir,
}

impl TestBot {
    pub fn new(stock_lines: &[&str]) -> Self {
        let config: Config = toml::from_str(TEST_CONFIG).expect("test config parses");
        Self::with_config(config, stock_lines)
    }

    pub fn with_config(mut config: Config, stock_lines: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let stock_path = dir.path().join("accounts.txt");
        std::fs::write(&stock_path, stock_lines.join("\n")).expect("seed stock");
        config.stock.path = stock_path.display().to_string();

        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let stock = Stock::new(Arc::new(FileStock::new(&stock_path)));
        let detector = Detector::new().expect("patterns compile");
        let state = BotState::new(&config, stock, detector, clock.clone() as Arc<dyn Clock>);

        Self {
            state: Arc::new(state),
            registry: Registry::new(),
            clock,
            stock_path,
            _dir: dir,
        }
    }

    /// Run one event and return the outcome, if any.
    pub async fn send(&self, event: Event) -> Option<Outcome> {
        self.registry
            .dispatch(&self.state, &event)
            .await
            .map(|reply| reply.outcome)
    }

    pub async fn command(&self, user: &Member, name: &str, text: Option<&str>) -> Outcome {
        self.send(command(user, name, text))
            .await
            .expect("commands always get a reply")
    }

    pub fn stock_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.stock_path)
            .unwrap_or_default()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub fn member(id: &str, roles: &[&str]) -> Member {
    Member {
        id: id.to_string(),
        display_name: format!("user-{id}"),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

pub fn command(user: &Member, name: &str, text: Option<&str>) -> Event {
    Event::Command(CommandEvent {
        id: format!("cmd-{name}"),
        channel: "gen".to_string(),
        user: user.clone(),
        name: name.to_string(),
        text: text.map(str::to_string),
    })
}

pub fn message(user: &Member, content: &str) -> Event {
    Event::Message(MessageEvent {
        id: "msg-1".to_string(),
        channel: "chat".to_string(),
        user: user.clone(),
        content: content.to_string(),
        from_self: false,
    })
}
