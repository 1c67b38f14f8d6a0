mod config;
mod domain;
mod game;
mod input;
mod logging;
mod menu;
pub mod protocol;
mod remote;
mod session;
pub mod ui;

pub use config::*;
pub use domain::*;
pub use game::*;
pub use input::*;
pub use logging::init_logging;
pub use menu::*;
pub use protocol::*;
pub use remote::*;
pub use session::*;
