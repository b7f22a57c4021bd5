//! Core library for the folder-sweep command line application.
//!
//! A sweep reads identifier tokens from the first column of spreadsheet
//! reports, finds candidate folders whose names contain those tokens, and
//! files each match into a month bucket under an archive directory. IO
//! adapters live under [`sweep::io`], data representations inside
//! [`sweep::model`], the matching policy in [`sweep::matcher`], and the run
//! orchestration under [`sweep::engine`].

pub mod sweep;

pub use sweep::{
    Result, SweepError, candidates, destination, engine, error, io, matcher, model, plan,
};
