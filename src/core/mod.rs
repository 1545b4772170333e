// Core modules implementing the value model, navigation, coercion, and building.
pub mod accessor;
pub mod builder;
pub mod coerce;
pub mod date;
pub mod error;
pub mod pattern;
pub mod value;
