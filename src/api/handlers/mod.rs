pub mod auth;

pub mod health;
pub use self::health::health;

pub mod me;
pub use self::me::me;

pub mod root;
pub use self::root::root;
