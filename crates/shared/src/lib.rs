pub mod boundary;
pub mod geo;
pub mod highlight;
pub mod models;
pub mod opinions;
pub mod projection;
pub mod relay;
pub mod selection;
pub mod tabular;
pub mod venues;
