use rand::Rng;

/// Built-in sentences a test is drawn from
pub const SENTENCES: [&str; 10] = [
    "Practice makes progress, not perfection.",
    "The quick brown fox jumps over the lazy dog.",
    "Typing faster starts with accuracy and consistency.",
    "Great things are done by a series of small things brought together.",
    "Simplicity is the ultimate sophistication.",
    "Discipline is the bridge between goals and accomplishment.",
    "Stay curious and keep learning every day.",
    "Small daily improvements lead to stunning results over time.",
    "Focus on the process, and the results will follow.",
    "Clarity comes from action, not thought alone.",
];

/// Pick one sentence uniformly at random.
///
/// An empty list falls back to the built-in [`SENTENCES`].
pub fn pick_random<R: Rng + ?Sized>(sentences: &[&str], rng: &mut R) -> String {
    let pool: &[&str] = if sentences.is_empty() {
        &SENTENCES
    } else {
        sentences
    };
    pool[rng.gen_range(0..pool.len())].to_string()
}
