/// Events flowing from child controllers back to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A city was confirmed, from autocomplete or from the favorites list.
    CitySelected(String),
}
