// Template context structures for Askama templates.

use crate::auth::session::SessionContext;

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.office_name`, etc.
pub struct PageContext {
    pub username: String,
    pub avatar_initial: String,
    pub office_code: String,
    pub office_name: String,
    pub app_name: String,
    pub current_path: String,
}

impl PageContext {
    pub fn build(user: &SessionContext, app_name: &str, current_path: &str) -> Self {
        let avatar_initial = user.username.chars().next().unwrap_or('?').to_uppercase().to_string();
        Self {
            username: user.username.clone(),
            avatar_initial,
            office_code: user.office_code.clone(),
            office_name: user.office_name.clone(),
            app_name: app_name.to_string(),
            current_path: current_path.to_string(),
        }
    }
}

mod reports;

pub use self::reports::{GnReportsTemplate, ReportTab, SelectOption};
