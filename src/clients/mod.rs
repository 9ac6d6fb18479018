//! Clients - HTTP Clients for External APIs
//!
//! This module contains the HTTP client for the management GraphQL API.

pub mod graphql_client;

pub use graphql_client::GraphqlGateway;
