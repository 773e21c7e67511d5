//! ExamWise: personal exam tracking
//!
//! Exams and their typed item widgets live in a hierarchical document store
//! with live subscriptions. Views keep an optimistic local copy of what they
//! show and reconcile it against every snapshot the store delivers.

pub mod cli;
pub mod config;
pub mod countdown;
pub mod error;
pub mod exam;
pub mod form;
pub mod item;
pub mod logging;
pub mod notice;
pub mod repository;
pub mod session;
pub mod store;
pub mod sync;
pub mod types;
pub mod views;
