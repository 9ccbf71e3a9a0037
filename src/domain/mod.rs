// Domain layer: driver value model and the conversion ports the value types implement.

pub mod model;
pub mod ports;
