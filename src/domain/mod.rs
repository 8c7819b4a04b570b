// Domain layer: models and ports. No knowledge of the concrete backends.

pub mod model;
pub mod ports;
