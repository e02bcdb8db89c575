use super::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Metadata key under which the owning user id is stored on a vendor customer.
pub const USER_ID_METADATA_KEY: &str = "user_id";

/// Vendor-assigned customer identifier. Immutable once assigned.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub email: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl CustomerRecord {
    pub fn belongs_to(&self, user_id: &UserId) -> bool {
        self.metadata
            .get(USER_ID_METADATA_KEY)
            .is_some_and(|owner| owner == user_id.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub user_id: UserId,
    pub email: Option<String>,
}

impl NewCustomer {
    pub fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([(
            USER_ID_METADATA_KEY.to_string(),
            self.user_id.as_str().to_string(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn belongs_to_matches_metadata_tag() {
        let user = UserId::parse("u1").unwrap();
        let record = CustomerRecord {
            id: CustomerId("cus_1".into()),
            email: None,
            metadata: NewCustomer {
                user_id: user.clone(),
                email: None,
            }
            .metadata(),
        };
        assert!(record.belongs_to(&user));
        assert!(!record.belongs_to(&UserId::parse("u2").unwrap()));

        let untagged = CustomerRecord {
            metadata: HashMap::new(),
            ..record
        };
        assert!(!untagged.belongs_to(&user));
    }
}
