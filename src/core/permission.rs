use serde::{Deserialize, Serialize};

/// How a non-admin user with no permission list is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    /// Empty or absent permission list grants everything. Kept for accounts
    /// seeded before permissions existed.
    #[default]
    Legacy,
    /// Empty or absent permission list grants nothing.
    Deny,
}

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

pub struct Feature {
    pub name: &'static str,
    pub permissions: &'static [&'static str],
}

pub struct Module {
    pub name: &'static str,
    pub features: &'static [Feature],
}

pub const CATALOG: &[Module] = &[
    Module {
        name: "Dashboard",
        features: &[Feature {
            name: "Overview",
            permissions: &["dashboard", "export_report"],
        }],
    },
    Module {
        name: "Sales",
        features: &[
            Feature {
                name: "Products",
                permissions: &[
                    "view_product",
                    "create_product",
                    "edit_product",
                    "delete_product",
                ],
            },
            Feature {
                name: "Offers",
                permissions: &["view_offers", "create_offer", "edit_offer", "delete_offer"],
            },
            Feature {
                name: "BOQ",
                permissions: &["view_boq", "create_boq", "edit_boq", "delete_boq"],
            },
            Feature {
                name: "Requests",
                permissions: &[
                    "view_requests",
                    "create_request",
                    "edit_request",
                    "delete_request",
                ],
            },
        ],
    },
    Module {
        name: "Administration",
        features: &[
            Feature {
                name: "Users",
                permissions: &["view_users", "edit_user", "delete_user", "approve_user"],
            },
            Feature {
                name: "Departments",
                permissions: &[
                    "view_department",
                    "create_department",
                    "edit_department",
                    "delete_department",
                ],
            },
            Feature {
                name: "Designations",
                permissions: &[
                    "view_designation",
                    "create_designation",
                    "edit_designation",
                    "delete_designation",
                ],
            },
            Feature {
                name: "Roles",
                permissions: &["view_role", "create_role", "edit_role", "delete_role"],
            },
        ],
    },
];

/// Every capability in catalog order.
pub fn all_permissions() -> Vec<&'static str> {
    CATALOG
        .iter()
        .flat_map(|module| module.features.iter())
        .flat_map(|feature| feature.permissions.iter().copied())
        .collect()
}

pub fn is_known_permission(permission: &str) -> bool {
    CATALOG
        .iter()
        .flat_map(|module| module.features.iter())
        .any(|feature| feature.permissions.contains(&permission))
}

/// Checks a permission list against the catalog. Returns the list without
/// duplicates (first occurrence wins) or the first unknown capability.
pub fn normalize_permissions(permissions: &[String]) -> Result<Vec<String>, String> {
    let mut result: Vec<String> = vec![];
    for item in permissions {
        let item = item.trim();
        if !is_known_permission(item) {
            return Err(item.to_string());
        }
        if !result.iter().any(|x| x == item) {
            result.push(item.to_string());
        }
    }
    Ok(result)
}

/// Union of several permission lists, sorted by catalog order.
pub fn merge_permissions(lists: &[Vec<String>]) -> Vec<String> {
    all_permissions()
        .into_iter()
        .filter(|permission| lists.iter().any(|list| list.iter().any(|x| x == permission)))
        .map(|permission| permission.to_string())
        .collect()
}

/// Anything that carries a role and an optional permission list.
pub trait PermissionHolder {
    fn role(&self) -> &str;
    fn permissions(&self) -> Option<&[String]>;
}

pub fn has_permission<U: PermissionHolder + ?Sized>(
    user: &U,
    capability: &str,
    policy: PermissionPolicy,
) -> bool {
    if capability.is_empty() {
        return false;
    }
    if user.role() == ROLE_ADMIN {
        return true;
    }
    match user.permissions() {
        Some(list) if !list.is_empty() => list.iter().any(|x| x == capability),
        _ => policy == PermissionPolicy::Legacy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Holder {
        role: String,
        permissions: Option<Vec<String>>,
    }

    impl PermissionHolder for Holder {
        fn role(&self) -> &str {
            &self.role
        }

        fn permissions(&self) -> Option<&[String]> {
            self.permissions.as_deref()
        }
    }

    fn holder(role: &str, permissions: Option<Vec<&str>>) -> Holder {
        Holder {
            role: role.to_string(),
            permissions: permissions.map(|x| x.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn test_admin_bypasses_permission_list() {
        let admin = holder(ROLE_ADMIN, Some(vec!["view_product"]));
        for capability in all_permissions() {
            assert!(has_permission(&admin, capability, PermissionPolicy::Deny));
        }
        assert!(has_permission(&admin, "not_in_catalog", PermissionPolicy::Deny));
    }

    #[test]
    fn test_empty_permissions_follow_policy() {
        let empty = holder(ROLE_USER, Some(vec![]));
        let absent = holder(ROLE_USER, None);
        assert!(has_permission(&empty, "delete_boq", PermissionPolicy::Legacy));
        assert!(has_permission(&absent, "delete_boq", PermissionPolicy::Legacy));
        assert!(!has_permission(&empty, "delete_boq", PermissionPolicy::Deny));
        assert!(!has_permission(&absent, "delete_boq", PermissionPolicy::Deny));
    }

    #[test]
    fn test_explicit_permissions_membership() {
        let user = holder(ROLE_USER, Some(vec!["view_product", "create_offer"]));
        assert!(has_permission(&user, "view_product", PermissionPolicy::Legacy));
        assert!(!has_permission(&user, "delete_product", PermissionPolicy::Legacy));
        assert!(!has_permission(&user, "", PermissionPolicy::Legacy));
    }

    #[test]
    fn test_normalize_permissions() {
        let input = vec![
            "view_product".to_string(),
            " create_offer ".to_string(),
            "view_product".to_string(),
        ];
        assert_eq!(
            normalize_permissions(&input),
            Ok(vec!["view_product".to_string(), "create_offer".to_string()])
        );
        let unknown = vec!["view_product".to_string(), "fly".to_string()];
        assert_eq!(normalize_permissions(&unknown), Err("fly".to_string()));
    }

    #[test]
    fn test_merge_permissions_in_catalog_order() {
        let merged = merge_permissions(&[
            vec!["create_offer".to_string(), "view_product".to_string()],
            vec!["dashboard".to_string(), "view_product".to_string()],
        ]);
        assert_eq!(merged, vec!["dashboard", "view_product", "create_offer"]);
    }

    #[test]
    fn test_catalog_has_no_duplicates() {
        let all = all_permissions();
        for (idx, item) in all.iter().enumerate() {
            assert!(!all[idx + 1..].contains(item), "{item} listed twice");
        }
    }
}
