use std::collections::HashSet;

use sha2::{Digest, Sha256};

const MAX_TITLE_CHARS: usize = 80;

/// Portable, deterministic filename: `{sanitized_title}--{short_hash(url)}.{ext}`.
///
/// The hash keeps two postings with the same title apart.
pub fn export_filename(title: &str, source_url: &str, extension: &str) -> String {
    format!("{}.{}", stem(title, source_url), extension.trim_start_matches('.'))
}

/// Names for one batch's files. A batch may list the same posting twice, so
/// a name already handed out gets a `-2`, `-3`, ... suffix before the extension.
#[derive(Debug, Default)]
pub struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, title: &str, source_url: &str, extension: &str) -> String {
        let stem = stem(title, source_url);
        let extension = extension.trim_start_matches('.');
        let mut name = format!("{stem}.{extension}");
        let mut repeat = 1u32;
        while !self.used.insert(name.clone()) {
            repeat += 1;
            name = format!("{stem}-{repeat}.{extension}");
        }
        name
    }
}

fn stem(title: &str, source_url: &str) -> String {
    format!("{}--{}", sanitize_title(title), short_hash(source_url))
}

fn sanitize_title(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let trimmed: String = compacted
        .trim_matches(&['_', ' ', '.'][..])
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    let mut name = match trimmed.trim_end_matches(&['_', '.'][..]) {
        "" => "untitled".to_string(),
        rest => rest.to_string(),
    };
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest
        .iter()
        .take(4)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_sanitized_and_hashed() {
        let name = export_filename(
            "Senior Engineer / Platform: Core",
            "https://jobs.example/1",
            "pdf",
        );
        let (stem, rest) = name.split_once("--").unwrap();
        assert_eq!(stem, "Senior_Engineer_Platform_Core");
        assert!(rest.ends_with(".pdf"));
        assert_eq!(rest.len(), "0123abcd.pdf".len());
    }

    #[test]
    fn same_title_different_urls_differ() {
        let a = export_filename("Engineer", "https://jobs.example/1", "txt");
        let b = export_filename("Engineer", "https://jobs.example/2", "txt");
        assert_ne!(a, b);
        assert_eq!(a, export_filename("Engineer", "https://jobs.example/1", ".txt"));
    }

    #[test]
    fn repeated_names_get_numbered_suffixes() {
        let mut names = UniqueNames::new();
        let first = names.claim("Engineer", "https://jobs.example/1", "txt");
        assert_eq!(first, export_filename("Engineer", "https://jobs.example/1", "txt"));

        let second = names.claim("Engineer", "https://jobs.example/1", ".txt");
        let third = names.claim("Engineer", "https://jobs.example/1", "txt");
        let stem = first.trim_end_matches(".txt");
        assert_eq!(second, format!("{stem}-2.txt"));
        assert_eq!(third, format!("{stem}-3.txt"));
        assert_eq!(
            names.claim("Engineer", "https://jobs.example/1", "pdf"),
            format!("{stem}.pdf")
        );
    }

    #[test]
    fn long_multibyte_titles_truncate_on_chars() {
        let title = "Développeuse ".repeat(20);
        let name = export_filename(&title, "u", "txt");
        let stem = name.split("--").next().unwrap();
        assert!(stem.chars().count() <= MAX_TITLE_CHARS);
    }

    #[test]
    fn empty_and_reserved_titles() {
        assert!(export_filename("  ", "u", "txt").starts_with("untitled--"));
        assert!(export_filename("con", "u", "txt").starts_with("con_--"));
    }
}
