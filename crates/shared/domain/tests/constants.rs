use catalog_domain::audit::AuditAction;
use catalog_domain::auth::{Permissions, Principal, Role};
use catalog_domain::constants::{AUDIT_LOG, ENV_PREFIX, PRODUCT, USER};

#[test]
fn constants_match_table_names() {
    assert_eq!(PRODUCT, "product");
    assert_eq!(USER, "user");
    assert_eq!(AUDIT_LOG, "audit_log");
    assert_eq!(ENV_PREFIX, "CATALOG");
}

#[test]
fn audit_actions_use_screaming_snake_case() {
    for action in AuditAction::ALL {
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, format!("\"{}\"", action.as_str()));
        assert_eq!(AuditAction::parse(action.as_str()), action);
    }
    assert_eq!(AuditAction::parse("something-else"), AuditAction::Custom);
}

#[test]
fn roles_grant_expected_permissions() {
    let admin = Principal::new("admin", Role::Admin);
    let user = Principal::new("user", Role::User);

    assert!(admin.is_admin());
    assert!(admin.can(Permissions::WRITE | Permissions::MANAGE_CACHE));
    assert!(user.can(Permissions::READ));
    assert!(!user.can(Permissions::WRITE));
    assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
    assert!("root".parse::<Role>().is_err());
}
