//! Light-curve models

mod batman;
pub use batman::{BatmanParameters, BatmanTransit};

mod linear;
pub use linear::LinearModel;

mod model;
pub use model::{Model, TransitModelTrait};

mod occultation;

mod trapezoid;
pub use trapezoid::{TrapezoidParameters, TrapezoidTransit};
