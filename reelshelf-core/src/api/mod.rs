//! API-facing facade shared by the server and its clients.

pub mod routes;
