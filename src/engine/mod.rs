pub mod bot;
pub mod database;
pub mod economy;
pub mod error;
pub mod game_data;
pub mod mechanics;
pub mod parser;
pub mod profile;
pub mod replies;
pub mod store;
