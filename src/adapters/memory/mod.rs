pub mod circulation_store;
pub mod seed;

pub use circulation_store::CirculationStore as InMemoryCirculationStore;
pub use seed::CatalogSeed;
