mod bounds;
pub use bounds::Bounds;

mod free;
pub use free::{FreeParameter, FreeParameters};

mod parameters;
pub use parameters::{Parameter, ParameterEntry, Parameters};
