//! The closed catalog of permissions recognised by the platform.
//!
//! Roles may only carry permissions from this catalog. The wire form of each
//! permission is its SCREAMING_SNAKE name, e.g. `CATEGORY_MANAGE`.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

/// The resource module a permission belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PermissionModule {
    Website,
    User,
    Role,
    Settings,
    Analytics,
    Audit,
    Report,
    Category,
}

macro_rules! permission_catalog {
    ($($variant:ident => ($name:literal, $module:ident)),+ $(,)?) => {
        /// A permission from the catalog.
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum Permission {
            $($variant),+
        }

        impl Permission {
            /// Every permission in the catalog, in declaration order.
            pub const ALL: &'static [Permission] = &[$(Permission::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Permission::$variant => $name),+
                }
            }

            pub fn module(&self) -> PermissionModule {
                match self {
                    $(Permission::$variant => PermissionModule::$module),+
                }
            }
        }

        impl FromStr for Permission {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Permission::$variant),)+
                    other => Err(ParseError::InvalidPermission(other.to_string())),
                }
            }
        }
    };
}

permission_catalog! {
    WebsiteView => ("WEBSITE_VIEW", Website),
    WebsiteCreate => ("WEBSITE_CREATE", Website),
    WebsiteEdit => ("WEBSITE_EDIT", Website),
    WebsiteDelete => ("WEBSITE_DELETE", Website),
    WebsiteApprove => ("WEBSITE_APPROVE", Website),
    WebsiteFeature => ("WEBSITE_FEATURE", Website),
    UserView => ("USER_VIEW", User),
    UserEdit => ("USER_EDIT", User),
    UserBan => ("USER_BAN", User),
    UserSuspend => ("USER_SUSPEND", User),
    UserDelete => ("USER_DELETE", User),
    RoleView => ("ROLE_VIEW", Role),
    RoleManage => ("ROLE_MANAGE", Role),
    SettingsView => ("SETTINGS_VIEW", Settings),
    SettingsManage => ("SETTINGS_MANAGE", Settings),
    AnalyticsView => ("ANALYTICS_VIEW", Analytics),
    AuditView => ("AUDIT_VIEW", Audit),
    ReportView => ("REPORT_VIEW", Report),
    ReportResolve => ("REPORT_RESOLVE", Report),
    CategoryView => ("CATEGORY_VIEW", Category),
    CategoryManage => ("CATEGORY_MANAGE", Category),
}

impl Permission {
    /// Returns the catalog entries belonging to `module`.
    pub fn in_module(module: PermissionModule) -> impl Iterator<Item = Permission> {
        Self::ALL.iter().copied().filter(move |p| p.module() == module)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a list of wire permission strings into an ordered, de-duplicated set.
///
/// The first occurrence of a repeated permission keeps its position. The first
/// string outside the catalog fails the whole list.
pub fn parse_permissions<S: AsRef<str>>(values: &[S]) -> Result<Vec<Permission>, ParseError> {
    let mut permissions = Vec::with_capacity(values.len());
    for value in values {
        let permission = value.as_ref().parse::<Permission>()?;
        if !permissions.contains(&permission) {
            permissions.push(permission);
        }
    }
    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip_through_serde() {
        for permission in Permission::ALL {
            let json = serde_json::to_string(permission).unwrap();
            assert_eq!(json, format!("\"{}\"", permission.as_str()));
            assert_eq!(permission.as_str().parse::<Permission>().unwrap(), *permission);
        }
    }

    #[test]
    fn test_unknown_permission_is_rejected() {
        assert_eq!(
            "CATEGORY_MANGE".parse::<Permission>(),
            Err(ParseError::InvalidPermission("CATEGORY_MANGE".to_string()))
        );
        assert!("category_manage".parse::<Permission>().is_err());
    }

    #[test]
    fn test_every_module_has_permissions() {
        for module in [
            PermissionModule::Website,
            PermissionModule::User,
            PermissionModule::Role,
            PermissionModule::Settings,
            PermissionModule::Analytics,
            PermissionModule::Audit,
            PermissionModule::Report,
            PermissionModule::Category,
        ] {
            assert!(Permission::in_module(module).count() > 0, "{:?} is empty", module);
        }
        assert_eq!(Permission::in_module(PermissionModule::Role).count(), 2);
    }

    #[test]
    fn test_parse_permissions_dedups_preserving_order() {
        let parsed =
            parse_permissions(&["CATEGORY_MANAGE", "WEBSITE_VIEW", "CATEGORY_MANAGE"]).unwrap();
        assert_eq!(parsed, vec![Permission::CategoryManage, Permission::WebsiteView]);
    }

    #[test]
    fn test_parse_permissions_names_offender() {
        let err = parse_permissions(&["WEBSITE_VIEW", "USER_PROMOTE"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid permission: USER_PROMOTE");
    }
}
