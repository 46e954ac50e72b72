pub mod overview;
pub mod report;
pub mod scan;
pub mod test_email;
pub mod validate_config;
