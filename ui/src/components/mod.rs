pub mod loading_overlay;
pub mod spinner;

pub use loading_overlay::LoadingOverlay;
pub use spinner::Spinner;
