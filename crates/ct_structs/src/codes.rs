// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

//! The numbered enumerations of [RFC 6962 §3](https://datatracker.ietf.org/doc/html/rfc6962#section-3).
//! Each converts to and from its wire code and its RFC name.

use crate::CtError;
use std::{fmt, str::FromStr};

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Returns the value for a wire code, or `None` if the code is unassigned.
            pub fn from_code(code: $repr) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Returns the wire code.
            pub fn code(self) -> $repr {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            /// Returns the name used for this value in RFC 6962.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = CtError;

            fn try_from(code: $repr) -> Result<Self, Self::Error> {
                Self::from_code(code).ok_or_else(|| CtError::InvalidEnumValue {
                    name: stringify!($name),
                    value: code.to_string(),
                })
            }
        }

        impl FromStr for $name {
            type Err = CtError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(CtError::InvalidEnumValue {
                        name: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

code_enum! {
    /// `enum { v1(0), (255) } Version;`
    #[derive(Default)]
    Version(u8) {
        #[default]
        V1 = 0 => "v1",
    }
}

code_enum! {
    /// `enum { timestamped_entry(0), (255) } MerkleLeafType;`
    #[derive(Default)]
    MerkleLeafType(u8) {
        #[default]
        TimestampedEntry = 0 => "timestamped_entry",
    }
}

code_enum! {
    /// `enum { x509_entry(0), precert_entry(1), (65535) } LogEntryType;`
    LogEntryType(u16) {
        X509Entry = 0 => "x509_entry",
        PrecertEntry = 1 => "precert_entry",
    }
}

code_enum! {
    /// `enum { certificate_timestamp(0), tree_hash(1), (255) } SignatureType;`
    SignatureType(u8) {
        CertificateTimestamp = 0 => "certificate_timestamp",
        TreeHash = 1 => "tree_hash",
    }
}
