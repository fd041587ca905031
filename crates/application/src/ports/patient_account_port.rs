//! Patient account port
//!
//! Portal login switch of a patient inside one tenant's database.

use async_trait::async_trait;
use domain::{PrincipalId, TenantId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the patient portal access flag
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PatientAccountPort: Send + Sync {
    /// Whether the patient may log in, `None` if the patient is unknown
    async fn is_active(
        &self,
        tenant: TenantId,
        patient: PrincipalId,
    ) -> Result<Option<bool>, ApplicationError>;

    /// Set the portal access flag
    ///
    /// Returns `false` if the patient is unknown.
    async fn set_active(
        &self,
        tenant: TenantId,
        patient: PrincipalId,
        is_active: bool,
    ) -> Result<bool, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn PatientAccountPort>();
    }
}
