pub mod errors;
pub mod db;
pub mod service;
pub mod about_us;

#[cfg(test)]
mod tests;
