/// Units an employee can be filed under, in display order.
pub const DEPARTMENTS: &[&str] = &[
    "Engineering",
    "Design",
    "Marketing",
    "Sales",
    "Human Resources",
    "Finance",
];

/// Map a 1-based index or a case-insensitive name onto a canonical department.
pub fn resolve_department(input: &str) -> Option<&'static str> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(index) = input.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| DEPARTMENTS.get(i)).copied();
    }
    DEPARTMENTS
        .iter()
        .find(|name| name.eq_ignore_ascii_case(input))
        .copied()
}
