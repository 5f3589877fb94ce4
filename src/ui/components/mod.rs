mod connection_lost;
mod help;
mod slider;
mod status;
mod toggle;

/// Namespace for the small stateless widgets the panel is assembled from.
pub struct UiComponent;
