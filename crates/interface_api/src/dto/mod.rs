//! Request/response bodies

pub mod reclamation;
