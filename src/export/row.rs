use serde::Serialize;

/// One line of the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub email: String,
    pub role: String,
}

impl ExportRow {
    /// Builds a row only when the role is exportable: not empty and not in `excluded`.
    pub fn exportable(email: &str, role: &str, excluded: &[String]) -> Option<Self> {
        is_exportable_role(role, excluded).then(|| Self {
            email: email.to_owned(),
            role: role.to_owned(),
        })
    }
}

pub fn is_exportable_role(role: &str, excluded: &[String]) -> bool {
    !role.is_empty() && !excluded.iter().any(|x| x == role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excluded() -> Vec<String> {
        vec!["na".to_owned()]
    }

    #[test]
    fn na_and_empty_roles_are_not_exported() {
        assert_eq!(ExportRow::exportable("a@x.com", "na", &excluded()), None);
        assert_eq!(ExportRow::exportable("a@x.com", "", &excluded()), None);
    }

    #[test]
    fn named_role_is_exported() {
        let row = ExportRow::exportable("a@x.com", "Manager", &excluded()).unwrap();
        assert_eq!(row, ExportRow { email: "a@x.com".to_owned(), role: "Manager".to_owned() });
    }

    #[test]
    fn exclusion_is_exact_match() {
        assert!(is_exportable_role("NA", &excluded()));
        assert!(is_exportable_role("Role not found", &excluded()));
    }
}
