//! Feed/take-up motion control for a kinetic paper scroll.
//!
//! A feed spool lets paper out and a take-up spool pulls the slack in. The
//! [`coordinator`] decides what each motor does on every tick, the
//! [`runner`] polls the controllers and executes those decisions, and
//! [`motor_controller`] talks to the stepper controllers over HTTP.

pub mod axis;
pub mod config;
pub mod coordinator;
pub mod geometry;
pub mod motor_controller;
pub mod protocol;
pub mod runner;
pub mod sim;
pub mod socket_server;
pub mod wait;
