//! # Variant Address
//!
//! Unique textual addressing of configuration objects across variant
//! registries.
//!
//! ## Address forms
//!
//! ```text
//! geo                       whole registry
//! geo:has_field/is_on       variant inside registry "geo"
//! geo:field_strength        parameter inside registry "geo"
//! geo:detector_type@basic   value group of a parameter
//! geo:detector_type=hpge    enumerated string value of a parameter
//! :has_field/is_on          local variant (scope-relative)
//! ```
//!
//! An address either names its registry (global) or is relative to an
//! implied registry scope (local, canonical form prefixed with `:`). The
//! string rendering is canonical and lossless: `parse` is the exact inverse
//! of `Display`, and canonical strings serve as the comparison keys for all
//! address lookups.

mod address;
mod error;
mod parse;

pub use address::VariantAddress;
pub use error::{AddressError, Result};
pub use parse::ParseMode;
