//! Core of the e-learning authoring and playback tool: session gate, course
//! catalog, single-draft editor and the slideshow engine with its autoplay
//! controller. Nothing here renders; front ends observe state.

pub mod autoplay;
pub mod catalog;
pub mod editor;
pub mod media;
pub mod session;
pub mod slideshow;
pub mod transfer;

pub use autoplay::{SlideshowController, SlideshowEvent, DEFAULT_AUTOPLAY_INTERVAL};
pub use catalog::CourseCatalog;
pub use editor::{Draft, EditingModel};
pub use media::{ingest_image, MediaFile};
pub use session::{authorize, AccessGate, SessionGate, SessionState};
pub use slideshow::{
    ImageSource, Key, KeyOutcome, PlaybackState, SlideView, SlideshowEngine, TickOutcome,
};
