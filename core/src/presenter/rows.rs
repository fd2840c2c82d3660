use serde::Serialize;

/// Zero-argument action bound to a row; executed by [`SpeedTestPlugin::execute`].
///
/// [`SpeedTestPlugin::execute`]: crate::plugin::SpeedTestPlugin::execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowAction {
    /// Drop the cached outcome and start a new run.
    Retest,
    /// Start a run without touching the cache.
    Start,
    OpenUrl { url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub title: String,
    pub subtitle: String,
    /// Filled in by the plugin from the host theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<RowAction>,
}

impl DisplayRow {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            icon_path: None,
            action: None,
        }
    }

    pub fn with_action(mut self, action: RowAction) -> Self {
        self.action = Some(action);
        self
    }
}
