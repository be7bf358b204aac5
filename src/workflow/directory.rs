use surrealdb::{Surreal, engine::remote::ws::Client};

use crate::consts::tables::USER_TABLE;
use crate::errors::{Error, Result};
use crate::models::user::{Principal, Role};
use crate::utils::record::parse_record_id;

/// Resolve an authenticated principal id to its account. An id that no
/// longer maps to a row is an authorization failure, not a crash.
pub async fn resolve(sdb: &Surreal<Client>, principal_id: &str) -> Result<Principal> {
    let id = parse_record_id(principal_id)?;
    sdb.select(id).await?.ok_or(Error::Unauthorized)
}

/// Resolve and insist on a role. Workflow operations express their
/// authorization as "must resolve to role X".
pub async fn require(sdb: &Surreal<Client>, principal_id: &str, role: Role) -> Result<Principal> {
    let principal = resolve(sdb, principal_id).await?;
    if principal.role() != role {
        return Err(Error::Unauthorized);
    }
    Ok(principal)
}

pub async fn find_by_email(sdb: &Surreal<Client>, email: &str) -> Result<Option<Principal>> {
    let found: Vec<Principal> = sdb
        .query("SELECT * FROM type::table($table) WHERE email = $email;")
        .bind(("table", USER_TABLE))
        .bind(("email", email.to_string()))
        .await?
        .take(0)?;
    Ok(found.into_iter().next())
}

/// Reject registration for an address any account already uses.
pub async fn ensure_email_free(sdb: &Surreal<Client>, email: &str) -> Result<()> {
    if find_by_email(sdb, email).await?.is_some() {
        return Err(Error::EmailExist(email.to_string()));
    }
    Ok(())
}

/// Recipient blood types a donor of `blood_group` can give to.
pub fn compatible_recipients(blood_group: &str) -> &'static [&'static str] {
    match blood_group {
        "O-" => &["O-", "O+", "A-", "A+", "B-", "B+", "AB-", "AB+"],
        "O+" => &["O+", "A+", "B+", "AB+"],
        "A-" => &["A-", "A+", "AB-", "AB+"],
        "A+" => &["A+", "AB+"],
        "B-" => &["B-", "B+", "AB-", "AB+"],
        "B+" => &["B+", "AB+"],
        "AB-" => &["AB-", "AB+"],
        "AB+" => &["AB+"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universal_donor_reaches_everyone() {
        assert_eq!(compatible_recipients("O-").len(), 8);
    }

    #[test]
    fn test_ab_positive_only_helps_ab_positive() {
        assert_eq!(compatible_recipients("AB+"), &["AB+"]);
    }

    #[test]
    fn test_unknown_group_reaches_no_one() {
        assert!(compatible_recipients("AB").is_empty());
    }

    #[test]
    fn test_every_group_can_give_to_itself() {
        for group in crate::utils::validator::BLOOD_GROUPS {
            assert!(compatible_recipients(group).contains(&group));
        }
    }
}
