use std::fmt;

/// Role of a registered user at the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Tutor,
    Student,
}

impl UserType {
    /// Convert enum → stored string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserType::Tutor => "Tutor",
            UserType::Student => "Student",
        }
    }

    /// Convert stored string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Tutor" => Some(UserType::Tutor),
            "Student" => Some(UserType::Student),
            _ => None,
        }
    }

    /// Lenient parser for CLI input: `tutor`, `T`, `Student`, `s`, ...
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "t" | "tutor" => Some(UserType::Tutor),
            "s" | "student" => Some(UserType::Student),
            _ => None,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_strings_are_exact() {
        assert_eq!(UserType::from_db_str("Tutor"), Some(UserType::Tutor));
        assert_eq!(UserType::from_db_str("tutor"), None);
        assert_eq!(UserType::Student.to_db_str(), "Student");
    }

    #[test]
    fn cli_codes_are_lenient() {
        assert_eq!(UserType::from_code(" S "), Some(UserType::Student));
        assert_eq!(UserType::from_code("TUTOR"), Some(UserType::Tutor));
        assert_eq!(UserType::from_code("wizard"), None);
    }
}
