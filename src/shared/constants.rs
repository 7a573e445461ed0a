/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Super admin role - full access including admin management
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// Admin role - can manage zones and delivery prices
pub const ROLE_ADMIN: &str = "admin";
