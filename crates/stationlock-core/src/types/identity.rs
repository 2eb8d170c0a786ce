//! Newtype wrappers for the three user identity forms.
//!
//! A login name appears in Session-ID Artifact filenames, the numeric
//! account key is what the external identity system works with, and the
//! encoded identity keys the Counter Ledger. Keeping them as distinct
//! types prevents handing a login name to the ledger by accident.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype text identifier.
macro_rules! define_text_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a value, trimming surrounding whitespace.
            pub fn new(value: impl AsRef<str>) -> Self {
                Self(value.as_ref().trim().to_string())
            }

            /// Return the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return `true` if the value is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Return `true` if the value can be used verbatim as a filename.
            pub fn is_plain_file_name(&self) -> bool {
                super::is_plain_file_name(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_text_id!(
    /// Login name recorded in a Session-ID Artifact filename.
    LoginName
);

define_text_id!(
    /// Numeric account key owned by the external identity system.
    UserKey
);

define_text_id!(
    /// Short code derived from a [`UserKey`]; keys the Counter Ledger.
    EncodedIdentity
);
