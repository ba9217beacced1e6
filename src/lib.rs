//! Shallows is a verification harness for a centered-difference solver of
//! the one-dimensional shallow water equations. A manufactured solution
//! supplies the initial condition, the source terms, and the exact answer
//! at the final time; the solver is run with forward Euler time stepping
//! over a sweep of grid resolutions, and the discrete L2 error of each run
//! is reported.
//!
//! The grid is decomposed into contiguous blocks, one per rank. Ranks are
//! threads in one process which only share data through a message-passing
//! `Communicator`, so the solver is written the same way it would be for
//! ranks on separate hosts.

pub mod config;
pub mod distributed;
pub mod driver;
pub mod error;
pub mod grid;
pub mod hydro;
pub mod index_space;
pub mod message;
pub mod norm;
pub mod output;
pub mod patch;
pub mod runtime;
pub mod setup;
pub mod solvers;
