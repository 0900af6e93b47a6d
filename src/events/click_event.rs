//! Clicks classified by the [click detector](crate::modules::click_detector)

/// Kind of a click
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub enum Click {
    /// Key released shortly after it was pressed
    Short,
    /// Key held for a long time before release
    Long,
    /// Second short click following shortly after the previous one
    Double,
}

/// Key was clicked
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub struct ClickEvent {
    /// Identifier of the clicked key
    pub key_id: u16,
    /// Kind of the click
    pub click: Click,
}
