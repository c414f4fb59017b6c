//! Built-in loop content.
//!
//! Ids are `kind.id_base() + position`, positions starting at 1.

use escape_core::LoopId;

use crate::catalog::{Loop, LoopContent, LoopKind};

const TRIVIA: &[(&str, &[&str], &str)] = &[
    (
        "What is the capital of France?",
        &["Paris", "Berlin", "London"],
        "Paris",
    ),
    ("How many continents are there?", &["5", "6", "7"], "7"),
    (
        "What planet is known as the Red Planet?",
        &["Mars", "Venus", "Saturn"],
        "Mars",
    ),
    (
        "Which ocean is the largest?",
        &["Atlantic", "Pacific", "Indian"],
        "Pacific",
    ),
    (
        "What gas do plants absorb from the atmosphere?",
        &["Oxygen", "Carbon dioxide", "Nitrogen"],
        "Carbon dioxide",
    ),
];

const MEMES: &[&str] = &[
    "Keep calm and carry on! 😄",
    "Here's a puppy to brighten your day 🐶",
    "Remember: you are awesome! 💪",
    "Take a deep breath and smile 😊",
    "Life is better when you're laughing 😂",
];

const QUICK_WINS: &[&str] = &[
    "You drank a glass of water – hydration win! 💧",
    "You stood up and stretched – good for you! 🧘",
    "You read a page of a book – knowledge gained 📚",
    "You wrote down one thing you're grateful for – gratitude boost 🙏",
    "You smiled at a stranger – positivity shared 😊",
];

fn id_for(kind: LoopKind, position: usize) -> LoopId {
    LoopId(kind.id_base() + position as u32 + 1)
}

/// The catalog served when no other source is configured or reachable.
pub fn builtin_loops() -> Vec<Loop> {
    let trivia = TRIVIA
        .iter()
        .enumerate()
        .map(|(i, (question, options, answer))| Loop {
            id: id_for(LoopKind::Trivia, i),
            kind: LoopKind::Trivia,
            content: LoopContent::Trivia {
                question: question.to_string(),
                options: options.iter().map(|o| o.to_string()).collect(),
                answer: answer.to_string(),
            },
        });

    let text = |kind: LoopKind, lines: &'static [&'static str]| {
        lines.iter().enumerate().map(move |(i, line)| Loop {
            id: id_for(kind, i),
            kind,
            content: LoopContent::Text {
                text: line.to_string(),
            },
        })
    };

    trivia
        .chain(text(LoopKind::Meme, MEMES))
        .chain(text(LoopKind::QuickWin, QUICK_WINS))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::validate_loops;

    #[test]
    fn builtin_catalog_is_consistent() {
        let loops = builtin_loops();
        assert_eq!(loops.len(), TRIVIA.len() + MEMES.len() + QUICK_WINS.len());
        validate_loops(&loops).unwrap();
    }

    #[test]
    fn ids_follow_kind_blocks() {
        let loops = builtin_loops();
        assert_eq!(loops[0].id, LoopId(1001));
        assert!(loops.iter().any(|l| l.id == LoopId(2001) && l.kind == LoopKind::Meme));
        assert!(loops.iter().any(|l| l.id == LoopId(3005) && l.kind == LoopKind::QuickWin));
    }
}
