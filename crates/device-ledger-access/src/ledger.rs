//! The access control ledger.
//!
//! Mutations require the caller to be the configured administrator. Reads
//! are unauthenticated and fall back to [`Permission::none`] for absent
//! entries.

use std::sync::Arc;

use device_ledger_core::{keys, Capability, DeviceId, Namespace, Permission, Principal};
use device_ledger_store::{Store, StoreExt};

use crate::error::{AccessError, Result};
use crate::grant::Grant;

const NS: Namespace = Namespace::AccessControl;

/// Permission grants keyed by `(device, user)`.
pub struct AccessControlLedger<S: Store> {
    store: Arc<S>,
    admin: Principal,
}

impl<S: Store> AccessControlLedger<S> {
    /// Create a ledger over `store`, governed by `admin`.
    pub fn new(store: Arc<S>, admin: Principal) -> Self {
        Self { store, admin }
    }

    fn authorize(&self, caller: &Principal) -> Result<()> {
        if caller != &self.admin {
            tracing::debug!(caller = %caller, "access control mutation rejected");
            return Err(AccessError::NotAuthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the full permission triple of `(device, user)`.
    pub fn grant_permission(
        &self,
        caller: &Principal,
        device: &DeviceId,
        user: &Principal,
        permission: Permission,
    ) -> Result<()> {
        self.authorize(caller)?;

        let grant = Grant::new(device.clone(), user.clone(), permission);
        self.store.put_record(NS, &grant.key(), &grant.permission)?;

        tracing::debug!(
            device = %device,
            user = %user,
            read = permission.can_read,
            write = permission.can_write,
            update = permission.can_update,
            "granted permission"
        );
        Ok(())
    }

    /// Remove the entry for `(device, user)`. Succeeds when nothing is stored.
    pub fn revoke_permission(
        &self,
        caller: &Principal,
        device: &DeviceId,
        user: &Principal,
    ) -> Result<()> {
        self.authorize(caller)?;

        let removed = self.store.delete(NS, &keys::permission(device, user))?;
        tracing::debug!(device = %device, user = %user, removed, "revoked permission");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// The triple for `(device, user)`, all-false when absent.
    pub fn check_permission(&self, device: &DeviceId, user: &Principal) -> Result<Permission> {
        let stored: Option<Permission> = self
            .store
            .get_record(NS, &keys::permission(device, user))?;
        Ok(stored.unwrap_or_default())
    }

    /// Whether `user` holds `capability` on `device`.
    pub fn has_capability(
        &self,
        device: &DeviceId,
        user: &Principal,
        capability: Capability,
    ) -> Result<bool> {
        Ok(self.check_permission(device, user)?.allows(capability))
    }

    pub fn can_read(&self, device: &DeviceId, user: &Principal) -> Result<bool> {
        self.has_capability(device, user, Capability::Read)
    }

    pub fn can_write(&self, device: &DeviceId, user: &Principal) -> Result<bool> {
        self.has_capability(device, user, Capability::Write)
    }

    pub fn can_update(&self, device: &DeviceId, user: &Principal) -> Result<bool> {
        self.has_capability(device, user, Capability::Update)
    }

    /// Every stored grant on `device`, ordered by user key.
    pub fn permissions_for_device(&self, device: &DeviceId) -> Result<Vec<Grant>> {
        let entries: Vec<(String, Permission)> = self
            .store
            .scan_records(NS, &keys::permission_prefix(device))?;

        entries
            .into_iter()
            .map(|(key, permission)| {
                Grant::from_entry(device, &key, permission).map_err(AccessError::from)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_ledger_store::MemoryStore;

    fn setup() -> (AccessControlLedger<MemoryStore>, Principal) {
        let admin = Principal::from("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
        let ledger = AccessControlLedger::new(Arc::new(MemoryStore::new()), admin.clone());
        (ledger, admin)
    }

    #[test]
    fn test_grant_and_check() {
        let (acl, admin) = setup();
        let device = DeviceId::from("device1");
        let user = Principal::from("user1");

        acl.grant_permission(&admin, &device, &user, Permission::new(true, false, true))
            .unwrap();

        assert_eq!(
            acl.check_permission(&device, &user).unwrap(),
            Permission::new(true, false, true)
        );
        assert!(acl.can_read(&device, &user).unwrap());
        assert!(!acl.can_write(&device, &user).unwrap());
        assert!(acl.can_update(&device, &user).unwrap());
    }

    #[test]
    fn test_grant_replaces_whole_triple() {
        let (acl, admin) = setup();
        let device = DeviceId::from("device1");
        let user = Principal::from("user1");

        acl.grant_permission(&admin, &device, &user, Permission::new(true, true, true))
            .unwrap();
        acl.grant_permission(&admin, &device, &user, Permission::new(false, true, false))
            .unwrap();

        assert_eq!(
            acl.check_permission(&device, &user).unwrap(),
            Permission::new(false, true, false)
        );
    }

    #[test]
    fn test_non_admin_cannot_grant() {
        let (acl, admin) = setup();
        let device = DeviceId::from("device1");
        let user = Principal::from("user1");
        acl.grant_permission(&admin, &device, &user, Permission::new(true, false, false))
            .unwrap();

        let err = acl
            .grant_permission(
                &Principal::from("user2"),
                &device,
                &user,
                Permission::new(true, true, true),
            )
            .unwrap_err();

        assert!(matches!(err, AccessError::NotAuthorized { .. }));
        assert_eq!(
            acl.check_permission(&device, &user).unwrap(),
            Permission::new(true, false, false)
        );
    }

    #[test]
    fn test_revoke_removes_access() {
        let (acl, admin) = setup();
        let device = DeviceId::from("device1");
        let user = Principal::from("user1");

        acl.grant_permission(&admin, &device, &user, Permission::new(true, false, false))
            .unwrap();
        acl.revoke_permission(&admin, &device, &user).unwrap();

        assert_eq!(acl.check_permission(&device, &user).unwrap(), Permission::none());
    }

    #[test]
    fn test_revoke_never_granted_succeeds() {
        let (acl, admin) = setup();
        acl.revoke_permission(&admin, &DeviceId::from("device1"), &Principal::from("user1"))
            .unwrap();
    }

    #[test]
    fn test_non_admin_cannot_revoke() {
        let (acl, _) = setup();
        let err = acl
            .revoke_permission(
                &Principal::from("user2"),
                &DeviceId::from("device1"),
                &Principal::from("user1"),
            )
            .unwrap_err();
        assert_eq!(err.kind(), Some(device_ledger_core::ErrorKind::NotAuthorized));
    }

    #[test]
    fn test_permissions_for_device() {
        let (acl, admin) = setup();
        let device = DeviceId::from("device1");

        let bob = Principal::from("bob");
        let amy = Principal::from("amy");

        acl.grant_permission(&admin, &device, &bob, Permission::new(true, false, false))
            .unwrap();
        acl.grant_permission(&admin, &device, &amy, Permission::new(false, false, true))
            .unwrap();
        acl.grant_permission(
            &admin,
            &DeviceId::from("device10"),
            &Principal::from("amy"),
            Permission::new(true, true, true),
        )
        .unwrap();

        let grants = acl.permissions_for_device(&device).unwrap();
        let users: Vec<&str> = grants.iter().map(|g| g.user.as_str()).collect();
        assert_eq!(users, vec!["amy", "bob"]);
        assert_eq!(grants[0].permission, Permission::new(false, false, true));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn segment() -> impl Strategy<Value = String> {
            "[a-z0-9/%-]{1,12}"
        }

        proptest! {
            #[test]
            fn test_grant_then_check(
                device in segment(),
                user in segment(),
                flags in any::<(bool, bool, bool)>(),
            ) {
                let (acl, admin) = setup();
                let device = DeviceId::from(device);
                let user = Principal::from(user);
                let permission = Permission::new(flags.0, flags.1, flags.2);

                acl.grant_permission(&admin, &device, &user, permission).unwrap();
                prop_assert_eq!(acl.check_permission(&device, &user).unwrap(), permission);

                let grants = acl.permissions_for_device(&device).unwrap();
                prop_assert_eq!(grants, vec![Grant::new(device, user, permission)]);
            }

            #[test]
            fn test_grants_on_distinct_pairs_are_independent(
                a in (segment(), segment()),
                b in (segment(), segment()),
            ) {
                prop_assume!(a != b);
                let (acl, admin) = setup();

                acl.grant_permission(
                    &admin,
                    &DeviceId::from(a.0.clone()),
                    &Principal::from(a.1.clone()),
                    Permission::new(true, true, true),
                )
                .unwrap();

                prop_assert_eq!(
                    acl.check_permission(&DeviceId::from(b.0), &Principal::from(b.1)).unwrap(),
                    Permission::none()
                );
            }
        }
    }
}
