pub mod configuration;
pub mod contact_form;
pub mod domain;
pub mod email_client;
pub mod email_request;
pub mod rate_limit;
pub mod routes;
pub mod sanitizer;
pub mod startup;
pub mod telemetry;
pub mod validation;
