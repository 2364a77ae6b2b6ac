use std::collections::HashMap;
use std::str::FromStr;

use innkeep_core::{AppError, AppResult};
use innkeep_domain::{AuthenticatedUser, PermissionContext};
use serde_json::Value;

const ORGANIZATION_KEYS: [&str; 2] = ["organizationId", "organization_id"];
const PROPERTY_KEYS: [&str; 2] = ["propertyId", "property_id"];
const DEPARTMENT_KEYS: [&str; 2] = ["departmentId", "department_id"];
const OWNER_KEYS: [&str; 4] = ["ownerId", "owner_id", "userId", "user_id"];

/// Raw request inputs the gate reads tenant identifiers from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestScope {
    /// Route parameters.
    pub params: HashMap<String, String>,
    /// Decoded JSON body, if any.
    pub body: Option<Value>,
    /// Query string parameters.
    pub query: HashMap<String, String>,
}

impl RequestScope {
    /// Builds the permission context for `user`.
    ///
    /// Each identifier is looked up in route params, then the body, then the
    /// query string. A present but malformed identifier is a validation error.
    pub fn permission_context(&self, user: AuthenticatedUser) -> AppResult<PermissionContext> {
        Ok(PermissionContext {
            organization_id: self.identifier(&ORGANIZATION_KEYS)?,
            property_id: self.identifier(&PROPERTY_KEYS)?,
            department_id: self.identifier(&DEPARTMENT_KEYS)?,
            resource_owner_id: self.identifier(&OWNER_KEYS)?,
            user: Some(user),
        })
    }

    fn identifier<T>(&self, keys: &[&str]) -> AppResult<Option<T>>
    where
        T: FromStr<Err = AppError>,
    {
        let Some((key, raw)) = self.raw_value(keys) else {
            return Ok(None);
        };

        T::from_str(raw.trim())
            .map(Some)
            .map_err(|error| AppError::Validation(format!("invalid '{key}': {error}")))
    }

    fn raw_value<'a>(&'a self, keys: &[&'a str]) -> Option<(&'a str, &'a str)> {
        let from_params = keys
            .iter()
            .find_map(|key| self.params.get(*key).map(|value| (*key, value.as_str())));
        let from_body = || {
            let body = self.body.as_ref()?.as_object()?;
            keys.iter()
                .find_map(|key| body.get(*key)?.as_str().map(|value| (*key, value)))
        };
        let from_query = || {
            keys.iter()
                .find_map(|key| self.query.get(*key).map(|value| (*key, value.as_str())))
        };

        from_params.or_else(from_body).or_else(from_query)
    }
}
