//! # recordstore codec
//!
//! The closed value model used for record attributes, plus conversions.
//!
//! - [`Value`]: every shape an attribute value can take, with
//!   [`Value::is_storable`] deciding which of them a record accepts
//! - [`Decimal`]: fixed-point decimal scalar
//! - [`FieldMap`]: the name to value map records are populated from
//! - JSON conversion through `serde_json` and CBOR through `ciborium`
//!
//! ## Usage
//!
//! ```
//! use recordstore_codec::{from_cbor, to_cbor, Value};
//!
//! let value = Value::List(vec![Value::from("a"), Value::from("b")]);
//! assert!(value.is_storable());
//!
//! let bytes = to_cbor(&value).unwrap();
//! let decoded: Value = from_cbor(&bytes).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cbor;
mod decimal;
mod error;
mod fields;
mod json;
mod value;

pub use cbor::{from_cbor, to_cbor};
pub use decimal::Decimal;
pub use error::{CodecError, CodecResult};
pub use fields::{field_map_from_json, field_map_from_value, field_map_to_json, FieldMap};
pub use value::{ScalarKind, Value};
