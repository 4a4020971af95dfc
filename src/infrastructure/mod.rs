// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod dynatrace_client;
pub mod dynatrace_model;
pub mod env_secrets;
pub mod local_resources;
