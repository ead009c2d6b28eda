//! Context assembly for answer generation.

use crate::vector_store::SearchResult;

/// Select which retrieved chunks fit the prompt context budget.
///
/// Chunks are taken in rank order; once a chunk would push the total past
/// `max_chars` it and everything below it are dropped whole, never truncated
/// mid-text. The top-ranked chunk is always included, even when it alone
/// exceeds the budget.
pub fn select_within_budget(results: &[SearchResult], max_chars: usize) -> Vec<&SearchResult> {
    let mut selected = Vec::new();
    let mut used = 0usize;

    for (rank, result) in results.iter().enumerate() {
        let len = result.chunk.content.chars().count();
        if rank > 0 && used + len > max_chars {
            break;
        }
        used += len;
        selected.push(result);
    }

    selected
}

/// Join the selected chunks into the prompt context string.
pub fn join_context(selected: &[&SearchResult]) -> String {
    selected
        .iter()
        .map(|r| r.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
