pub mod autotasks;
pub mod chain;
pub mod engine;
pub mod example;
pub mod model;
pub mod price;
pub mod run;
pub mod schema;
pub mod validate;
