pub mod ids;
pub mod model;
pub mod playlist;
pub mod state;

pub use ids::TrackId;
pub use model::Track;
pub use playlist::PlaylistContext;
pub use state::{PlaybackSnapshot, PlaybackState, RepeatMode};
