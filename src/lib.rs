//! Chat Eval - agreement between an LLM classifier and human labels.
//!
//! Support chat transcripts are classified by an external LLM along three
//! axes (sentiment, topic, whether the customer was answered), reviewed by a
//! human in a labeling session, and scored against the human labels.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
