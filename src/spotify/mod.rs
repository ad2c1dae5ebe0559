pub mod api;
pub mod auth;
pub mod models;
pub mod player;

pub use api::SpotifyClient;
pub use auth::{Credentials, TokenManager};
pub use models::PlaybackSnapshot;
pub use player::SpotifyPlayer;
