/*
 * Responsibility
 * - v1 の公開ポイント (routes() / PREFIX の re-export など)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;

pub const PREFIX: &str = "/api/v1";
