pub mod application_handlers;
pub mod board_handlers;
pub mod emotion_handlers;
pub mod profile_handlers;
pub mod proxy_handlers;
pub mod recommendation_handlers;
pub mod system_handlers;

pub use application_handlers::*;
pub use board_handlers::*;
pub use emotion_handlers::*;
pub use profile_handlers::*;
pub use proxy_handlers::*;
pub use recommendation_handlers::*;
pub use system_handlers::*;
