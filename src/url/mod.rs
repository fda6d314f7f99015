//! URL handling module for FAQ Harvester
//!
//! Discovered links are identified by plain strings rather than parsed URLs:
//! a target's identity is its site-base-prefixed form, so two hrefs that
//! differ only textually are two distinct targets.

mod normalize;

pub use normalize::{absolutize, parse_site_base};
