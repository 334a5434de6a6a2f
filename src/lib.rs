//! Serverless backend for a per-user TODO list.
//!
//! Each Lambda binary under `src/lambda/` wires one handler from [`handlers`]
//! to the shared [`service::TodoService`], which in turn talks to DynamoDB
//! (records) and S3 (attachment uploads). The [`client`] module is the
//! consumer side: an HTTP client and the list view state machine driving it.

pub mod attachments;
pub mod auth;
pub mod client;
pub mod common;
pub mod config;
pub mod handlers;
pub mod models;
pub mod service;
pub mod storage;
