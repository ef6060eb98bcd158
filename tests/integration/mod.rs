//! Integration tests for the Thinkrelay HTTP surface

mod health;
mod reasoner;
mod streaming;
