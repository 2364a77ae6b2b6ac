use innkeep_domain::{PermissionKey, PermissionRequirement, Role};

use super::OperationAccess;

/// Strategy translating a legacy role allow-list into permission requirements.
///
/// An empty translation means the bridge has no opinion and the legacy
/// declaration is denied.
pub trait LegacyPermissionBridge: Send + Sync {
    /// Stable strategy name used in logs and denial reasons.
    fn name(&self) -> &'static str;

    /// Generates the requirements equivalent to `roles` for this operation.
    fn translate(&self, access: &OperationAccess, roles: &[Role]) -> Vec<PermissionRequirement>;
}

const CONTAINER_SUFFIXES: [&str; 2] = ["Controller", "Service"];

const ACTION_PREFIXES: [(&str, &str); 11] = [
    ("find", "read"),
    ("get", "read"),
    ("list", "read"),
    ("create", "create"),
    ("add", "create"),
    ("update", "update"),
    ("edit", "update"),
    ("patch", "update"),
    ("remove", "delete"),
    ("delete", "delete"),
    ("approve", "approve"),
];

/// Infers `resource` from the container name and `action` from the
/// operation name. Scope comes from each declared role's legacy breadth.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameInferenceBridge;

impl NameInferenceBridge {
    /// `GuestReservationsController` becomes `guest_reservations`.
    #[must_use]
    pub fn infer_resource(container: &str) -> Option<String> {
        let stem = CONTAINER_SUFFIXES
            .iter()
            .find_map(|suffix| container.strip_suffix(suffix))
            .unwrap_or(container);
        let resource = snake_case(stem);
        (!resource.is_empty()).then_some(resource)
    }

    /// `findAll` becomes `read`; unknown verbs yield `None`.
    #[must_use]
    pub fn infer_action(operation: &str) -> Option<&'static str> {
        ACTION_PREFIXES
            .iter()
            .find(|(prefix, _)| has_verb_prefix(operation, prefix))
            .map(|(_, action)| *action)
    }
}

impl LegacyPermissionBridge for NameInferenceBridge {
    fn name(&self) -> &'static str {
        "name_inference_bridge"
    }

    fn translate(&self, access: &OperationAccess, roles: &[Role]) -> Vec<PermissionRequirement> {
        let (Some(resource), Some(action)) = (
            Self::infer_resource(access.container()),
            Self::infer_action(access.operation()),
        ) else {
            return Vec::new();
        };

        let mut scopes: Vec<_> = roles.iter().map(Role::legacy_scope).collect();
        scopes.sort_by_key(|scope| scope.rank());
        scopes.dedup();

        scopes
            .into_iter()
            .filter_map(|scope| PermissionKey::new(&resource, action, scope).ok())
            .map(PermissionRequirement::new)
            .collect()
    }
}

fn has_verb_prefix(operation: &str, verb: &str) -> bool {
    operation.strip_prefix(verb).is_some_and(|rest| {
        rest.chars()
            .next()
            .is_none_or(|next| next.is_ascii_uppercase() || next == '_')
    })
}

fn snake_case(value: &str) -> String {
    let chars: Vec<char> = value.chars().filter(char::is_ascii_alphanumeric).collect();
    let mut output = String::with_capacity(chars.len() + 4);
    for (index, current) in chars.iter().enumerate() {
        if current.is_ascii_uppercase() && index > 0 {
            let previous = chars[index - 1];
            let next_is_lower = chars
                .get(index + 1)
                .is_some_and(|next| next.is_ascii_lowercase());
            if previous.is_ascii_lowercase()
                || previous.is_ascii_digit()
                || (previous.is_ascii_uppercase() && next_is_lower)
            {
                output.push('_');
            }
        }
        output.push(current.to_ascii_lowercase());
    }

    output
}
