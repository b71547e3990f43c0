/// UI layer: the top bar, the filter side panel, and the central tab views.

pub mod panels;
pub mod plot;
pub mod views;
