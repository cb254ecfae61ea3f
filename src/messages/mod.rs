pub mod actions;
pub mod game;

pub use actions::ActionRequest;
pub use game::{GameEvent, NotificationPlugin, View, publish_game_events};
