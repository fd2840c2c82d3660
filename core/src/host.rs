//! Boundary to the launcher hosting the plugin.
//!
//! The host owns rendering and query dispatch; the core only asks it to re-run
//! the current query, flash a message, or open a URL.

pub trait HostBridge: Send + Sync {
    /// Keyword the host routes to this plugin (e.g. `st`).
    fn action_keyword(&self) -> String;

    /// Replaces the host's query text; `requery` forces a re-query even if unchanged.
    fn change_query(&self, query: &str, requery: bool);

    fn show_msg(&self, title: &str);

    fn open_url(&self, url: &str) -> anyhow::Result<()>;

    /// Only used to pick an icon.
    fn is_dark_theme(&self) -> bool {
        false
    }
}
