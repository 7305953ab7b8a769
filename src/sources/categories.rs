//! Static category catalog shared by `/api/categories` and the category
//! listing allow-list. Codes are the upstream `t=` type ids.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub code: &'static str,
    pub name: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category { code: "1", name: "Movies" },
    Category { code: "2", name: "TV Series" },
    Category { code: "3", name: "Variety" },
    Category { code: "4", name: "Anime" },
    Category { code: "6", name: "Action" },
    Category { code: "7", name: "Comedy" },
    Category { code: "8", name: "Romance" },
    Category { code: "9", name: "Science Fiction" },
    Category { code: "10", name: "Horror" },
    Category { code: "11", name: "Drama" },
    Category { code: "12", name: "War" },
    Category { code: "20", name: "Documentary" },
];

pub fn find_category(code: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact() {
        assert_eq!(find_category("4").map(|c| c.name), Some("Anime"));
        assert!(find_category("5").is_none());
        assert!(find_category(" 4").is_none());
    }
}
