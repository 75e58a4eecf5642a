/// An operator query in the forms the matcher compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub original: String,
    pub normalized: String,
    pub tokens: Vec<String>,
    /// Normalized with spaces removed, so "note pad" can meet "Notepad".
    pub fused: String,
}

pub fn normalize(raw: &str) -> SearchTerm {
    let normalized = raw.to_lowercase();
    let tokens = normalized.split(' ').map(str::to_string).collect();
    let fused = normalized.replace(' ', "");
    SearchTerm {
        original: raw.to_string(),
        normalized,
        tokens,
        fused,
    }
}
