//! Inline 18x18 stroke icons for toolbar buttons.

pub fn svg(body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="18" height="18" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">{body}</svg>"#
    )
}

pub fn bold() -> String {
    svg(r#"<path d="M6 4h8a4 4 0 0 1 4 4 4 4 0 0 1-4 4H6z"/><path d="M6 12h9a4 4 0 0 1 4 4 4 4 0 0 1-4 4H6z"/>"#)
}

pub fn italic() -> String {
    svg(r#"<line x1="19" y1="4" x2="10" y2="4"/><line x1="14" y1="20" x2="5" y2="20"/><line x1="15" y1="4" x2="9" y2="20"/>"#)
}

pub fn underline() -> String {
    svg(r#"<path d="M6 4v6a6 6 0 0 0 12 0V4"/><line x1="4" y1="20" x2="20" y2="20"/>"#)
}

pub fn strikethrough() -> String {
    svg(r#"<path d="M16 4H9a3 3 0 0 0-2.83 4"/><path d="M14 12a4 4 0 0 1 0 8H6"/><line x1="4" y1="12" x2="20" y2="12"/>"#)
}

pub fn link() -> String {
    svg(r#"<path d="M10 13a5 5 0 0 0 7.54.54l3-3a5 5 0 0 0-7.07-7.07l-1.72 1.71"/><path d="M14 11a5 5 0 0 0-7.54-.54l-3 3a5 5 0 0 0 7.07 7.07l1.71-1.71"/>"#)
}

pub fn unlink() -> String {
    svg(r#"<path d="m18.84 12.25 1.72-1.71a5 5 0 0 0-7.07-7.07l-1.72 1.71"/><path d="m5.17 11.75-1.71 1.71a5 5 0 0 0 7.07 7.07l1.71-1.71"/><line x1="2" y1="2" x2="22" y2="22"/>"#)
}

pub fn ltr() -> String {
    svg(r#"<path d="M11 4h6"/><path d="M13 4v16"/><path d="M17 4v16"/><path d="M7 12 3 8l4-4"/>"#)
}

pub fn rtl() -> String {
    svg(r#"<path d="M10 4h6"/><path d="M12 4v16"/><path d="M16 4v16"/><path d="M6 8l4 4-4 4"/>"#)
}

pub fn at_sign() -> String {
    svg(r#"<circle cx="12" cy="12" r="4"/><path d="M16 8v5a3 3 0 0 0 6 0v-1a10 10 0 1 0-4 8"/>"#)
}
