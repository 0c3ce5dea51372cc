// Domain layer: API entities and the ports the workflows are written against.

pub mod model;
pub mod ports;
