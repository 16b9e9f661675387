//! Two-valued status flags stored as `0/1` columns.

use shopkeep_sql::Value;

/// A `0/1` column value outside its two legal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InvalidStatus {
    /// Form message for the rejected flag.
    pub message: &'static str,
    /// The rejected raw value.
    pub value: i64,
}

macro_rules! status_flag {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(#[$off_meta:meta])* $off:ident = 0,
            $(#[$on_meta:meta])* $on:ident = 1,
        }
        message = $message:literal;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(#[$off_meta])*
            $off,
            $(#[$on_meta])*
            $on,
        }

        impl $name {
            /// Message reported when a form submits anything but `0` or `1`.
            pub const INVALID_MESSAGE: &'static str = $message;

            /// Stored column value.
            #[must_use]
            pub const fn as_i64(self) -> i64 {
                match self {
                    Self::$off => 0,
                    Self::$on => 1,
                }
            }

            /// Whether the flag is set.
            #[must_use]
            pub const fn is_set(self) -> bool {
                matches!(self, Self::$on)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = InvalidStatus;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                match value {
                    0 => Ok(Self::$off),
                    1 => Ok(Self::$on),
                    _ => Err(InvalidStatus {
                        message: $message,
                        value,
                    }),
                }
            }
        }

        impl From<$name> for Value {
            fn from(status: $name) -> Self {
                Self::Int(status.as_i64())
            }
        }
    };
}

status_flag! {
    /// Category visibility in the storefront.
    Visibility {
        /// Not shown.
        Hidden = 0,
        /// Shown.
        Visible = 1,
    }
    message = "Invalid visibility status.";
}

status_flag! {
    /// Whether a user's content is trusted.
    TrustStatus {
        /// Default for new users.
        Untrusted = 0,
        /// Trusted.
        Trusted = 1,
    }
    message = "Invalid trust status.";
}

status_flag! {
    /// Registration approval.
    RegStatus {
        /// Waiting for approval. Counted on the dashboard.
        Pending = 0,
        /// Approved.
        Approved = 1,
    }
    message = "Invalid registration status.";
}

impl Visibility {
    /// The opposite visibility.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Hidden => Self::Visible,
            Self::Visible => Self::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_column_value() {
        for raw in [0, 1] {
            assert_eq!(Visibility::try_from(raw).unwrap().as_i64(), raw);
            assert_eq!(TrustStatus::try_from(raw).unwrap().as_i64(), raw);
            assert_eq!(RegStatus::try_from(raw).unwrap().as_i64(), raw);
        }
    }

    #[test]
    fn test_out_of_range_rejected_with_form_message() {
        let err = Visibility::try_from(2).unwrap_err();
        assert_eq!(err.to_string(), "Invalid visibility status.");
        assert_eq!(err.value, 2);

        assert_eq!(
            TrustStatus::try_from(-1).unwrap_err().to_string(),
            "Invalid trust status."
        );
        assert_eq!(
            RegStatus::try_from(7).unwrap_err().message,
            "Invalid registration status."
        );
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Visibility::Visible.toggled(), Visibility::Hidden);
        assert_eq!(Visibility::Hidden.toggled(), Visibility::Visible);
        assert!(Visibility::Visible.is_set());
        assert!(!RegStatus::Pending.is_set());
    }

    #[test]
    fn test_into_value() {
        assert_eq!(Value::from(RegStatus::Approved), Value::Int(1));
        assert_eq!(Value::from(Visibility::Hidden), Value::Int(0));
    }
}
