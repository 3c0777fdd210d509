pub mod health;
pub use self::health::health;

pub mod permission;
pub use self::permission::permission;

pub mod session;
pub use self::session::session;
