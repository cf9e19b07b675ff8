/// Top-level screen the app is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Library,
    Viewer,
    Editor,
}

impl AppState {
    /// Pan and zoom are only live while studying a card.
    pub const fn allows_zoom(self) -> bool {
        matches!(self, Self::Viewer)
    }
}
