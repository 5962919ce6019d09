#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![deny(unreachable_pub)]

//! doorman-core

pub mod common;
pub mod identifier;
pub mod password;
pub mod status;
