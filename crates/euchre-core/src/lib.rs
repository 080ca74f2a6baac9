#![deny(warnings)]
pub mod error;
pub mod game;
pub mod model;

pub use error::EuchreError;
pub use game::action::Action;
pub use game::engine::EuchreGame;
pub use game::observation::PlayerState;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "euchre-core"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "euchre-core");
        assert!(!AppInfo::version().is_empty());
    }
}
