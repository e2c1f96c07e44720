pub mod controllers;
pub mod errors;
pub mod router;
pub mod routes;
pub mod startup;

pub use router::{Dispatch, PathParam, PathRouter, RouteError, RouteParams};
pub use startup::{app, run};
