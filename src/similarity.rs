use serde::Deserialize;

/// How far apart two strings may be and still count as approximately equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tolerance {
    #[default]
    Strong,
    Normal,
    Weak,
}

impl Tolerance {
    fn threshold(self) -> f64 {
        match self {
            Tolerance::Strong => 0.25,
            Tolerance::Normal => 0.5,
            Tolerance::Weak => 0.75,
        }
    }
}

/// Case-insensitive comparison by longest common substring: the strings
/// are close when that substring covers most of the shorter one.
pub fn approximately_equal(a: &str, b: &str, tolerance: Tolerance) -> bool {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let shorter = a.len().min(b.len());
    if shorter == 0 {
        return false;
    }
    let distance = 1.0 - longest_common_substring(&a, &b) as f64 / shorter as f64;
    distance < tolerance.threshold()
}

pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

fn longest_common_substring(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut best = 0;
    for &ca in a {
        let mut row = vec![0usize; b.len() + 1];
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                row[j + 1] = prev[j] + 1;
                best = best.max(row[j + 1]);
            }
        }
        prev = row;
    }
    best
}
