pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod training;
pub mod ws;

pub use routes::create_router;
pub use ws::WsSink;
