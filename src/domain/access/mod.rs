//! Access control
//!
//! Policies are pure predicates over the caller and the requested action.
//! Anything that needs storage (the subscription flag) is resolved by the
//! caller of the policy and passed in through [`AccessTarget`].

mod policy;

pub use policy::{
    AccessPolicy, AccessTarget, Action, AdminOnly, Authenticated, Caller, Capability,
    ReadOnlyOrAdmin, SubscriberOrAdmin,
};
