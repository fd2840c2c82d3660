use tokio::sync::mpsc;

use speedprobe_core::api::{HostBridge, HostConfig};

/// A query change the core asked the host to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryChange {
    pub query: String,
    pub requery: bool,
}

/// Stands in for the launcher: forced re-queries are queued for the watch loop,
/// messages go to stderr.
pub struct TerminalHost {
    keyword: String,
    dark_theme: bool,
    changes: mpsc::UnboundedSender<QueryChange>,
}

impl TerminalHost {
    pub fn new(cfg: &HostConfig) -> (Self, mpsc::UnboundedReceiver<QueryChange>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let host = Self {
            keyword: cfg.action_keyword.clone(),
            dark_theme: cfg.dark_theme,
            changes: tx,
        };
        (host, rx)
    }
}

impl HostBridge for TerminalHost {
    fn action_keyword(&self) -> String {
        self.keyword.clone()
    }

    fn change_query(&self, query: &str, requery: bool) {
        let change = QueryChange {
            query: query.to_string(),
            requery,
        };
        if self.changes.send(change).is_err() {
            tracing::trace!(target: "speedprobe.refresh", "watch loop gone, dropping query change");
        }
    }

    fn show_msg(&self, title: &str) {
        eprintln!("{title}");
    }

    fn open_url(&self, url: &str) -> anyhow::Result<()> {
        println!("Open in your browser: {url}");
        Ok(())
    }

    fn is_dark_theme(&self) -> bool {
        self.dark_theme
    }
}

/// The plugin only ever sees what follows its action keyword.
pub fn strip_keyword<'a>(keyword: &str, query: &'a str) -> &'a str {
    let rest = match query.strip_prefix(keyword) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => query,
    };
    rest.trim_start()
}
