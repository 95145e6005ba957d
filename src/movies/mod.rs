// Movie catalog: read-only lookups behind the authorization gate

pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;

pub use memory::InMemoryMovieRepository;
pub use models::{Director, Genre, Movie};
pub use repository::{MovieRepository, PgMovieRepository};
