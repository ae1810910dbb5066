//! Web cache deception and web cache poisoning detection.
//!
//! A scan runs reconnaissance against a target (robots.txt, homepage links and
//! a bruteforce list), then requests crafted variants of sensitive paths twice
//! and compares the responses to spot cache layers that store them.

pub mod error;
pub mod output;
pub mod parser;
pub mod payloads;
pub mod probe;
pub mod recon;
pub mod rules;
pub mod scanner;
pub mod session;
pub mod strategy;
