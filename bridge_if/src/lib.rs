//! # Bridge Interface Library
//!
//! This crate provides the wire-protocol interface between the operator side
//! software and the remote robot's publish/subscribe bridge. It defines the
//! JSON frame types understood by the bridge ([`msg`]) and a minimal client
//! for the persistent duplex channel carrying them ([`client`]).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod client;
pub mod msg;
