//! Client account status and access codes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const CLIENT_STATUS_ACTIVE: &str = "active";
pub const CLIENT_STATUS_INACTIVE: &str = "inactive";

/// All valid client status strings.
pub const VALID_CLIENT_STATUSES: &[&str] = &[CLIENT_STATUS_ACTIVE, CLIENT_STATUS_INACTIVE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
}

impl ClientStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            CLIENT_STATUS_ACTIVE => Ok(Self::Active),
            CLIENT_STATUS_INACTIVE => Ok(Self::Inactive),
            _ => Err(CoreError::Validation(format!(
                "Invalid client status '{s}'. Must be one of: {}",
                VALID_CLIENT_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => CLIENT_STATUS_ACTIVE,
            Self::Inactive => CLIENT_STATUS_INACTIVE,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

/* --------------------------------------------------------------------------
Access codes
-------------------------------------------------------------------------- */

const ACCESS_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ACCESS_CODE_GROUPS: usize = 3;
const ACCESS_CODE_GROUP_LEN: usize = 3;

/// Length of a formatted access code, dashes included.
pub const ACCESS_CODE_LEN: usize =
    ACCESS_CODE_GROUPS * ACCESS_CODE_GROUP_LEN + (ACCESS_CODE_GROUPS - 1);

/// Generate an access code shaped like `7QX-A2M-K9P`.
pub fn generate_access_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(ACCESS_CODE_LEN);
    for group in 0..ACCESS_CODE_GROUPS {
        if group > 0 {
            code.push('-');
        }
        for _ in 0..ACCESS_CODE_GROUP_LEN {
            let idx = rng.random_range(0..ACCESS_CODE_ALPHABET.len());
            code.push(ACCESS_CODE_ALPHABET[idx] as char);
        }
    }
    code
}

/// Validate the `XXX-XXX-XXX` shape over `[A-Z0-9]`.
pub fn validate_access_code(code: &str) -> Result<(), CoreError> {
    let groups: Vec<&str> = code.split('-').collect();
    let well_formed = groups.len() == ACCESS_CODE_GROUPS
        && groups.iter().all(|g| {
            g.len() == ACCESS_CODE_GROUP_LEN
                && g.bytes().all(|b| ACCESS_CODE_ALPHABET.contains(&b))
        });

    if well_formed {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid access code '{code}'. Expected XXX-XXX-XXX using A-Z and 0-9"
        )))
    }
}

/// Password the identity service receives for a new client login.
///
/// Clients sign in with their access code, so the password is derived from
/// it rather than chosen.
pub fn initial_password(access_code: &str) -> String {
    let compact: String = access_code.chars().filter(|c| *c != '-').collect();
    format!("temp_{compact}")
}
