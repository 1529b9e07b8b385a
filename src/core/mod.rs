// Domain layer: error taxonomy, persisted models, collaborator traits

pub mod errors;
pub mod models;
pub mod traits;
