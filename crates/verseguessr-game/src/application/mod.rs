//! Application layer: async orchestration over the verse service.

pub mod guess_handlers;
pub mod load_handlers;
pub mod session_handlers;
