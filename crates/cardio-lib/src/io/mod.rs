pub mod polar;
pub mod record;
pub mod samples;
