//! Behavioural suites for the relay.

mod support;
