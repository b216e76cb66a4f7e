//! Module and action names used in permission records and route declarations.
//!
//! A permission record grants a set of [`modules`] and a set of [`actions`].
//! Routes refer to these constants when declaring what they require.

pub mod modules {
    pub const USERS: &str = "users";
    pub const SCHOOLS: &str = "schools";
    pub const STUDENTS: &str = "students";
    pub const PERMISSIONS: &str = "permissions";

    pub const ALL: &[&str] = &[USERS, SCHOOLS, STUDENTS, PERMISSIONS];
}

pub mod actions {
    pub const CREATE: &str = "create";
    pub const READ: &str = "read";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";

    pub const ALL: &[&str] = &[CREATE, READ, UPDATE, DELETE];
}

/// Trims, drops duplicates and sorts a list of module or action names so the
/// stored column behaves as a set.
pub fn normalize_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let names = normalize_names(["read", " create", "read "]);
        assert_eq!(names, vec!["create".to_string(), "read".to_string()]);
    }

    #[test]
    fn test_all_lists_are_unique() {
        assert_eq!(normalize_names(modules::ALL).len(), modules::ALL.len());
        assert_eq!(normalize_names(actions::ALL).len(), actions::ALL.len());
    }
}
