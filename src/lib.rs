#![doc = include_str!("../README.md")]

#[cfg(test)]
mod tests;

mod array_stats;

mod config;
pub use config::FitConfig;

mod data;
pub use data::{
    BKJD_OFFSET, BTJD_OFFSET, LightCurve, TimeFormat, bjd_to_bkjd, bjd_to_btjd, bkjd_to_bjd,
    btjd_to_bjd,
};

mod error;
pub use error::{
    FitError, LightCurveError, ModelError, ParameterError, ParameterValues, PhotometryError,
    SimulationError,
};

pub mod fit;
pub use fit::{
    Chain, FitAlgorithm, FitAlgorithmTrait, FitObserver, FitProblem, FitResult, GuessAndCheckFit,
    LogObserver, McmcFit, NoopObserver, Percentiles, SimplexFit, TraceObserver, Trial,
};

mod goodness;
pub use goodness::{
    ChiSquare, Goodness, GoodnessTrait, MeanResidual, SumOfSquares, Votes, average_votes,
};

pub mod models;
pub use models::{
    BatmanParameters, BatmanTransit, LinearModel, Model, TrapezoidParameters, TrapezoidTransit,
    TransitModelTrait,
};

mod params;
pub use params::{Bounds, FreeParameter, FreeParameters, Parameter, ParameterEntry, Parameters};

pub mod photometry;
pub use photometry::{Aperture, ApertureMeasurement, Apertures};

pub mod simulation;
pub use simulation::{PhotonNoise, simulate_transit_data};

mod sorted_array;

pub mod tools;

pub use ndarray;
